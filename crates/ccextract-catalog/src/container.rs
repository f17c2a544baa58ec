//! The contract between the extractor and whatever presents an archive as a
//! directory tree.

use std::io::Read;

use crate::Result;

/// Type of a path as seen through a [`Container`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathType {
    File,
    Directory,
    NotFound,
    /// Recorded in the catalog but missing from the archive.
    ZombieFile,
    /// The path form itself is unusable.
    BadPath,
    Alias,
    DeviceOrFifo,
}

/// What the catalog recorded about an entry's content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryMeta {
    pub size: Option<u64>,
    /// Hex-encoded SHA-256.
    pub sha256: Option<String>,
}

/// A directory view over catalog content.
///
/// Paths are `/`-separated and relative to the view. Implementations are
/// read-only and used from a single thread.
pub trait Container {
    fn path_type(&self, path: &str) -> PathType;

    /// Position of a file relative to its immediate container.
    /// Only meaningful when `path_type(path)` is [`PathType::File`].
    fn file_locator(&self, path: &str) -> Result<u64>;

    /// Dereference an opaque id to a canonical path whose first component
    /// names the archive.
    fn resolve_alias(&self, id: &str) -> Result<String>;

    /// Open a file's content. `selector` is the entry reference's access
    /// suffix (`?...` or `#...`), passed through untouched.
    fn open_read(&self, path: &str, selector: Option<&str>) -> Result<Box<dyn Read + '_>>;

    /// Names of the direct children of a directory.
    fn read_dir(&self, path: &str) -> Result<Vec<String>>;

    fn metadata(&self, _path: &str) -> Result<EntryMeta> {
        Ok(EntryMeta::default())
    }
}

impl<C: Container + ?Sized> Container for &C {
    fn path_type(&self, path: &str) -> PathType {
        (**self).path_type(path)
    }

    fn file_locator(&self, path: &str) -> Result<u64> {
        (**self).file_locator(path)
    }

    fn resolve_alias(&self, id: &str) -> Result<String> {
        (**self).resolve_alias(id)
    }

    fn open_read(&self, path: &str, selector: Option<&str>) -> Result<Box<dyn Read + '_>> {
        (**self).open_read(path, selector)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        (**self).read_dir(path)
    }

    fn metadata(&self, path: &str) -> Result<EntryMeta> {
        (**self).metadata(path)
    }
}
