use std::path::PathBuf;

use crate::uri::{split_scheme, split_selector};
use crate::{Error, Result};

/// Where an archive lives: the directory holding it and its name there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveLocation {
    pub root: PathBuf,
    pub name: String,
}

impl ArchiveLocation {
    /// Parse a plain path or a `scheme:path[?query|#fragment]` argument.
    /// The scheme and selector only decorate the path and are dropped.
    pub fn parse(arg: &str) -> Result<Self> {
        let (_, rest) = split_scheme(arg);
        let (body, _) = split_selector(rest);
        let body = body.trim_end_matches('/');

        let (root, name) = match body.rsplit_once('/') {
            None => (PathBuf::from("."), body),
            Some(("", name)) => (PathBuf::from("/"), name),
            Some((dir, name)) => (PathBuf::from(dir), name),
        };

        if name.is_empty() || name == "." || name == ".." {
            return Err(Error::InvalidLocation(arg.to_string()));
        }

        Ok(Self {
            root,
            name: name.to_string(),
        })
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join(&self.name)
    }
}
