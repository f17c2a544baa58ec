use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot resolve id '{id}' in '{identifier}': {source}")]
    AliasUnresolvable {
        identifier: String,
        id: String,
        #[source]
        source: ccextract_catalog::Error,
    },

    /// The identifier names the archive itself. Skipped, never fatal.
    #[error("'{identifier}' refers to the archive root")]
    EmptyAfterStrip { identifier: String },

    #[error("'{identifier}' resolves to '{canonical}', outside archive '{archive}'")]
    ForeignArchive {
        identifier: String,
        canonical: String,
        archive: String,
    },

    #[error("unsupported scheme '{scheme}' in '{identifier}'")]
    UnknownScheme { identifier: String, scheme: String },
}

impl ResolveError {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::EmptyAfterStrip { .. })
    }
}

#[derive(Debug, Error)]
pub enum OffsetError {
    #[error("path not found in archive: '{path}'")]
    NotFound { path: String },

    #[error("unusable path form: '{path}'")]
    InvalidPath { path: String },

    #[error("unusable path target type: '{path}'")]
    UnsupportedType { path: String },

    #[error("catalog query failed for '{path}': {source}")]
    Catalog {
        path: String,
        #[source]
        source: ccextract_catalog::Error,
    },

    #[error("physical key overflow for '{path}'")]
    Overflow { path: String },
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("couldn't schedule '{path}': {reason}")]
    InsertFailed { path: String, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("failed to open '{path}' in archive: {source}")]
    SourceOpenFailed {
        path: String,
        #[source]
        source: ccextract_catalog::Error,
    },

    #[error("failed to create '{path}': {source}")]
    DestCreateFailed {
        path: String,
        #[source]
        source: ccextract_fs::Error,
    },

    #[error("destination already exists: '{path}'")]
    DestExists { path: String },

    #[error("copy of '{path}' failed: {source}")]
    StreamFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to write '{path}': {source}")]
    UnsafePath {
        path: String,
        #[source]
        source: ccextract_fs::Error,
    },

    #[error("'{path}' failed verification: {source}")]
    Verify {
        path: String,
        #[source]
        source: ccextract_verify::VerificationError,
    },
}

impl CopyError {
    /// Destination-relative path of the entry being copied.
    pub fn path(&self) -> &str {
        match self {
            Self::SourceOpenFailed { path, .. }
            | Self::DestCreateFailed { path, .. }
            | Self::DestExists { path }
            | Self::StreamFailed { path, .. }
            | Self::UnsafePath { path, .. }
            | Self::Verify { path, .. } => path,
        }
    }
}

/// First failure of a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Offset(#[from] OffsetError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Copy(#[from] CopyError),
}

impl RunError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Resolve(_) => 2,
            Self::Offset(_) => 3,
            Self::Plan(_) => 4,
            Self::Copy(_) => 5,
        }
    }
}

pub type Result<T, E = RunError> = std::result::Result<T, E>;
