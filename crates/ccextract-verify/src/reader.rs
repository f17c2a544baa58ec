use std::io::{self, Read};

use crate::{Hasher, Result, VerificationError};

/// What the catalog claims about an entry. Unset fields are not checked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expected {
    pub size: Option<u64>,
    /// Hex-encoded digest.
    pub digest: Option<String>,
}

impl Expected {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn size(size: u64) -> Self {
        Self {
            size: Some(size),
            digest: None,
        }
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }
}

/// Byte count and digest of everything that passed through a reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamSummary {
    pub bytes: u64,
    pub digest: Vec<u8>,
}

impl StreamSummary {
    pub fn digest_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

/// Streaming reader that hashes and counts data as it passes through.
pub struct VerifiedReader<R, H> {
    reader: R,
    hasher: H,
    bytes: u64,
}

impl<R, H> VerifiedReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
            bytes: 0,
        }
    }

    /// Bytes read so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl<R: Read, H: Hasher> Read for VerifiedReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes += n as u64;
        }
        Ok(n)
    }
}

impl<R: Read, H: Hasher> VerifiedReader<R, H> {
    /// Finalize and check against `expected`.
    ///
    /// The summary is computed even when nothing is expected, so callers can
    /// report what was copied.
    pub fn finish(self, expected: &Expected) -> Result<StreamSummary> {
        let summary = StreamSummary {
            bytes: self.bytes,
            digest: self.hasher.finalize(),
        };

        if let Some(size) = expected.size {
            if size != summary.bytes {
                return Err(VerificationError::SizeMismatch {
                    expected: size,
                    actual: summary.bytes,
                });
            }
        }

        if let Some(digest) = &expected.digest {
            let wanted = hex::decode(digest.trim())
                .map_err(|_| VerificationError::MalformedDigest(digest.clone()))?;
            if wanted != summary.digest {
                return Err(VerificationError::DigestMismatch {
                    expected: digest.to_ascii_lowercase(),
                    actual: summary.digest_hex(),
                });
            }
        }

        Ok(summary)
    }
}
