use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("output directory not found: {0}")]
    NotFound(PathBuf),

    #[error("output path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("destination already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("entry path is empty")]
    EmptyPath,

    #[error("entry path contains null byte: {0}")]
    InvalidPath(PathBuf),

    #[error("absolute entry path not allowed: {0}")]
    Absolute(PathBuf),

    #[error("entry '{entry}' escapes the output directory")]
    Escape { entry: PathBuf },

    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to create {path}: {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

impl Error {
    /// True for the errors raised before anything touched the disk because
    /// the relative path itself is unusable.
    pub fn is_unsafe_path(&self) -> bool {
        matches!(
            self,
            Self::EmptyPath | Self::InvalidPath(_) | Self::Absolute(_) | Self::Escape { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
