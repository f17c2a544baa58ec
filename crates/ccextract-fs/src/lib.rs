//! Output directory handling for ccextract.
//!
//! # Architecture
//!
//! - `output.rs` - Destination directory handle and file creation
//! - `permissions.rs` - Mode bits applied to newly created files
//! - `sanitize.rs` - Relative path normalization (zip-slip prevention)

mod error;
mod output;
pub mod permissions;
mod sanitize;

pub use error::{Error, Result};
pub use output::{OutputDir, OverwritePolicy};
pub use permissions::PermissionMode;
pub use sanitize::{SanitizedPath, sanitize_relative};
