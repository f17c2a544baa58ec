use sha2::{Digest, Sha256};

/// Incremental digest fed by [`VerifiedReader`](crate::VerifiedReader).
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// SHA-256, the digest recorded in catalogs.
#[derive(Clone, Default)]
pub struct Sha256Hasher {
    state: Sha256,
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot digest of `data`.
    pub fn digest(data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }
}

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.state, data);
    }

    fn finalize(self) -> Vec<u8> {
        self.state.finalize().to_vec()
    }
}
