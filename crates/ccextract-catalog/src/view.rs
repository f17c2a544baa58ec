use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use crate::container::{Container, EntryMeta, PathType};
use crate::source::{ByteSource, DirSource, ReadRequest};
use crate::tree::{CatalogTree, Lookup, NodeId};
use crate::{Error, Result};

/// A loaded catalog plus the bytes it describes.
#[derive(Clone)]
pub struct Catalog {
    tree: Arc<CatalogTree>,
    source: Arc<dyn ByteSource>,
}

impl Catalog {
    pub fn new(tree: CatalogTree, source: impl ByteSource + 'static) -> Self {
        Self {
            tree: Arc::new(tree),
            source: Arc::new(source),
        }
    }

    /// Load an XML catalog describing the archives held in `root_dir`.
    pub fn load(xml_path: impl AsRef<Path>, root_dir: impl AsRef<Path>) -> Result<Self> {
        let xml_path = xml_path.as_ref();
        let file = std::fs::File::open(xml_path).map_err(|e| Error::Open {
            path: xml_path.to_path_buf(),
            source: e,
        })?;
        let tree = crate::xml::parse_catalog(BufReader::new(file))?;
        tracing::debug!(catalog = %xml_path.display(), nodes = tree.len(), "loaded catalog");
        Ok(Self::new(tree, DirSource::new(root_dir.as_ref())))
    }

    /// The directory holding the archives; paths start with an archive name.
    pub fn root_view(&self) -> ArchiveView {
        ArchiveView {
            tree: Arc::clone(&self.tree),
            source: Arc::clone(&self.source),
            scope: self.tree.root(),
        }
    }

    /// The named archive opened as a directory.
    pub fn base_view(&self, archive: &str) -> Result<ArchiveView> {
        let scope = self
            .tree
            .archive(archive)
            .ok_or_else(|| Error::ArchiveNotFound(archive.to_string()))?;
        Ok(ArchiveView {
            tree: Arc::clone(&self.tree),
            source: Arc::clone(&self.source),
            scope,
        })
    }
}

/// [`Container`] over a subtree of a [`Catalog`].
#[derive(Clone)]
pub struct ArchiveView {
    tree: Arc<CatalogTree>,
    source: Arc<dyn ByteSource>,
    scope: NodeId,
}

impl ArchiveView {
    fn find(&self, path: &str) -> Result<NodeId> {
        if self.scope != self.tree.root() && path.starts_with('/') {
            return Err(Error::BadPath(path.to_string()));
        }
        match self.tree.lookup(self.scope, path) {
            Lookup::Found(id) => Ok(id),
            Lookup::NotFound => Err(Error::NotFound(path.to_string())),
            Lookup::BadPath => Err(Error::BadPath(path.to_string())),
        }
    }

    fn find_file(&self, path: &str) -> Result<NodeId> {
        let id = self.find(path)?;
        if self.tree.node(id).kind.path_type() != PathType::File {
            return Err(Error::NotAFile(path.to_string()));
        }
        Ok(id)
    }
}

impl Container for ArchiveView {
    fn path_type(&self, path: &str) -> PathType {
        match self.find(path) {
            Ok(id) if id == self.scope => PathType::Directory,
            Ok(id) => self.tree.node(id).kind.path_type(),
            Err(Error::BadPath(_)) => PathType::BadPath,
            Err(_) => PathType::NotFound,
        }
    }

    fn file_locator(&self, path: &str) -> Result<u64> {
        let id = self.find_file(path)?;
        self.tree
            .node(id)
            .locator
            .ok_or_else(|| Error::MissingLocator(path.to_string()))
    }

    fn resolve_alias(&self, id: &str) -> Result<String> {
        let node = self
            .tree
            .by_id(id)
            .ok_or_else(|| Error::AliasNotFound(id.to_string()))?;
        Ok(format!("/{}", self.tree.path_of(node)))
    }

    fn open_read(&self, path: &str, selector: Option<&str>) -> Result<Box<dyn Read + '_>> {
        let id = self.find_file(path)?;
        let archive = self
            .tree
            .archive_of(id)
            .ok_or_else(|| Error::NotAFile(path.to_string()))?;

        let full = self.tree.path_of(id);
        let archive_name = self.tree.node(archive).name.as_str();
        let inner = full
            .strip_prefix(archive_name)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or_default();

        let request = ReadRequest {
            archive: archive_name,
            path: inner,
            offset: self.tree.absolute_offset(id)?,
            len: self.tree.node(id).size,
            selector,
        };
        tracing::trace!(
            archive = request.archive,
            path = request.path,
            offset = request.offset,
            selector = request.selector,
            "opening entry"
        );
        let reader = self.source.open(&request).map_err(|e| Error::Read {
            path: path.to_string(),
            source: e,
        })?;
        Ok(reader)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        let id = self.find(path)?;
        let node = self.tree.node(id);
        if !node.kind.has_children() {
            return Err(Error::NotADirectory(path.to_string()));
        }
        Ok(node.children().map(|(name, _)| name.to_string()).collect())
    }

    fn metadata(&self, path: &str) -> Result<EntryMeta> {
        let node = self.tree.node(self.find(path)?);
        Ok(EntryMeta {
            size: node.size,
            sha256: node.sha256.clone(),
        })
    }
}
