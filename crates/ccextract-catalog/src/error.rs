use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open catalog {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("malformed catalog XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("unknown catalog element <{0}>")]
    UnknownElement(String),

    #[error("catalog element <{element}> not allowed here")]
    Misplaced { element: String },

    #[error("catalog has no <catalog> root element")]
    MissingRoot,

    #[error("catalog element <{element}> is missing attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: &'static str },

    #[error("invalid value '{value}' for attribute '{attribute}'")]
    InvalidAttribute { attribute: String, value: String },

    #[error("invalid entry name '{0}'")]
    InvalidName(String),

    #[error("duplicate entry '{0}'")]
    DuplicateEntry(String),

    #[error("duplicate id '{0}'")]
    DuplicateId(String),

    #[error("'{0}' cannot contain entries")]
    NotAContainer(String),

    #[error("archive '{0}' not found in catalog")]
    ArchiveNotFound(String),

    #[error("alias '{0}' not found")]
    AliasNotFound(String),

    #[error("entry not found: '{0}'")]
    NotFound(String),

    #[error("unusable path form: '{0}'")]
    BadPath(String),

    #[error("'{0}' is not a file")]
    NotAFile(String),

    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("no locator recorded for '{0}'")]
    MissingLocator(String),

    #[error("locator overflow while addressing '{0}'")]
    LocatorOverflow(String),

    #[error("invalid archive location '{0}'")]
    InvalidLocation(String),

    #[error("failed to read '{path}': {source}")]
    Read { path: String, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
