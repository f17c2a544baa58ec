//! Single-pass content verification for extracted entries.
//!
//! Bytes are hashed and counted as they stream from the archive to the
//! output file, so the copy engine never re-reads what it wrote.
//!
//! # Example
//!
//! ```
//! use ccextract_verify::{Expected, Sha256Hasher, VerifiedReader};
//!
//! let data = b"hello world";
//! let mut reader = VerifiedReader::new(&data[..], Sha256Hasher::new());
//! let mut sink = Vec::new();
//! std::io::copy(&mut reader, &mut sink).unwrap();
//!
//! let summary = reader.finish(&Expected::size(11)).unwrap();
//! assert_eq!(summary.bytes, 11);
//! ```

pub use self::error::{Result, VerificationError};
pub use self::hasher::{Hasher, Sha256Hasher};
pub use self::reader::{Expected, StreamSummary, VerifiedReader};

mod error;
mod hasher;
mod reader;
