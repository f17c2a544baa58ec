#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("malformed expected digest '{0}'")]
    MalformedDigest(String),
}

pub type Result<T> = std::result::Result<T, VerificationError>;
