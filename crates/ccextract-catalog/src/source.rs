//! Where entry bytes come from once the catalog has located them.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

/// A located byte range inside one top-level archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadRequest<'a> {
    /// Name of the archive in the root directory.
    pub archive: &'a str,
    /// Entry path inside the archive, empty for the archive itself.
    pub path: &'a str,
    /// Absolute offset inside the archive file.
    pub offset: u64,
    /// Byte count when the catalog records one.
    pub len: Option<u64>,
    /// Access parameters carried by the entry reference, e.g. `?pwd=...`.
    pub selector: Option<&'a str>,
}

pub trait ByteSource {
    fn open(&self, request: &ReadRequest<'_>) -> io::Result<Box<dyn Read>>;
}

/// Reads uncompressed archives straight from a directory on disk.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ByteSource for DirSource {
    fn open(&self, request: &ReadRequest<'_>) -> io::Result<Box<dyn Read>> {
        // only the archive itself may run to end of file
        if request.len.is_none() && !request.path.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no recorded size for {}:{}", request.archive, request.path),
            ));
        }
        let mut file = File::open(self.root.join(request.archive))?;
        if request.offset > 0 {
            file.seek(SeekFrom::Start(request.offset))?;
        }
        Ok(match request.len {
            Some(len) => Box::new(file.take(len)),
            None => Box::new(file),
        })
    }
}

/// Entry payloads held in memory, keyed by archive and entry path.
///
/// Offsets are ignored: every entry owns its own buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    payloads: HashMap<(String, String), Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, archive: impl Into<String>, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let bytes: Vec<u8> = bytes.into();
        self.payloads.insert((archive.into(), path.into()), Arc::from(bytes));
    }

    pub fn with(mut self, archive: impl Into<String>, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(archive, path, bytes);
        self
    }
}

impl ByteSource for MemorySource {
    fn open(&self, request: &ReadRequest<'_>) -> io::Result<Box<dyn Read>> {
        let key = (request.archive.to_string(), request.path.to_string());
        match self.payloads.get(&key) {
            Some(bytes) => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no payload for {}:{}", request.archive, request.path),
            )),
        }
    }
}
