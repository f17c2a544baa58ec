use std::collections::{BTreeMap, HashMap};

use crate::container::PathType;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The directory holding the archives.
    Root,
    Directory,
    File,
    /// A file that is itself an archive and exposes children.
    Container,
    Zombie,
    Fifo,
    Device,
    Symlink,
}

impl NodeKind {
    pub fn path_type(self) -> PathType {
        match self {
            Self::Root | Self::Directory => PathType::Directory,
            Self::File | Self::Container => PathType::File,
            Self::Zombie => PathType::ZombieFile,
            Self::Fifo | Self::Device => PathType::DeviceOrFifo,
            Self::Symlink => PathType::Alias,
        }
    }

    pub fn has_children(self) -> bool {
        matches!(self, Self::Root | Self::Directory | Self::Container)
    }

    /// Whether the node occupies bytes of its parent container.
    pub fn has_payload(self) -> bool {
        matches!(self, Self::File | Self::Container)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub id: Option<String>,
    pub locator: Option<u64>,
    pub size: Option<u64>,
    pub sha256: Option<String>,
    children: BTreeMap<String, NodeId>,
}

impl Node {
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// Description of a node to insert.
#[derive(Clone, Debug)]
pub struct EntrySpec {
    name: String,
    kind: NodeKind,
    id: Option<String>,
    locator: Option<u64>,
    size: Option<u64>,
    sha256: Option<String>,
}

impl EntrySpec {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            id: None,
            locator: None,
            size: None,
            sha256: None,
        }
    }

    pub fn file(name: impl Into<String>, locator: u64) -> Self {
        Self::new(NodeKind::File, name).locator(locator)
    }

    pub fn container(name: impl Into<String>, locator: u64) -> Self {
        Self::new(NodeKind::Container, name).locator(locator)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Directory, name)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn locator(mut self, locator: u64) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }
}

/// Outcome of walking a path from some node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    Found(NodeId),
    NotFound,
    BadPath,
}

/// Arena-backed catalog of one directory holding archives.
#[derive(Clone, Debug)]
pub struct CatalogTree {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
}

impl Default for CatalogTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                kind: NodeKind::Root,
                parent: None,
                id: None,
                locator: None,
                size: None,
                sha256: None,
                children: BTreeMap::new(),
            }],
            ids: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn insert(&mut self, parent: NodeId, spec: EntrySpec) -> Result<NodeId> {
        if !valid_name(&spec.name) {
            return Err(Error::InvalidName(spec.name));
        }
        let parent_node = self.node(parent);
        if !parent_node.kind.has_children() {
            return Err(Error::NotAContainer(self.path_of(parent)));
        }
        if parent_node.children.contains_key(&spec.name) {
            let mut path = self.path_of(parent);
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&spec.name);
            return Err(Error::DuplicateEntry(path));
        }
        if let Some(id) = &spec.id {
            if self.ids.contains_key(id) {
                return Err(Error::DuplicateId(id.clone()));
            }
        }

        let node_id = NodeId(self.nodes.len());
        if let Some(id) = &spec.id {
            self.ids.insert(id.clone(), node_id);
        }
        self.nodes[parent.0].children.insert(spec.name.clone(), node_id);
        self.nodes.push(Node {
            name: spec.name,
            kind: spec.kind,
            parent: Some(parent),
            id: spec.id,
            locator: spec.locator,
            size: spec.size,
            sha256: spec.sha256,
            children: BTreeMap::new(),
        });
        Ok(node_id)
    }

    /// Insert an archive directly below the root.
    pub fn add_archive(&mut self, name: impl Into<String>) -> Result<NodeId> {
        self.insert(self.root(), EntrySpec::container(name, 0))
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Top-level archive of the given name.
    pub fn archive(&self, name: &str) -> Option<NodeId> {
        self.node(self.root()).children.get(name).copied()
    }

    /// Walk `path` below `from`. Empty and `.` components are ignored.
    pub fn lookup(&self, from: NodeId, path: &str) -> Lookup {
        let mut current = from;
        for component in path.split('/') {
            match component {
                "" | "." => continue,
                ".." => return Lookup::BadPath,
                c if c.contains('\0') => return Lookup::BadPath,
                c => {
                    let node = self.node(current);
                    if !node.kind.has_children() {
                        return Lookup::NotFound;
                    }
                    match node.children.get(c) {
                        Some(child) => current = *child,
                        None => return Lookup::NotFound,
                    }
                }
            }
        }
        Lookup::Found(current)
    }

    /// Path of `id` from the root, without a leading slash.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.kind != NodeKind::Root {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        names.reverse();
        names.join("/")
    }

    /// The top-level archive a node lives in, `None` for the root itself.
    pub fn archive_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let parent = self.node(current).parent?;
            if parent == self.root() {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Byte offset of a node inside its top-level archive: the sum of the
    /// locators of every payload-bearing node below the archive, the node
    /// itself included.
    pub fn absolute_offset(&self, id: NodeId) -> Result<u64> {
        let archive = self.archive_of(id);
        let mut offset = 0u64;
        let mut current = id;
        while Some(current) != archive && current != self.root() {
            let node = self.node(current);
            if node.kind.has_payload() {
                let locator = node
                    .locator
                    .ok_or_else(|| Error::MissingLocator(self.path_of(current)))?;
                offset = offset
                    .checked_add(locator)
                    .ok_or_else(|| Error::LocatorOverflow(self.path_of(id)))?;
            }
            match node.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Ok(offset)
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/') && !name.contains('\0')
}
