use std::io::{self, Read, Write};

use ccextract_catalog::Container;
use ccextract_fs::{OutputDir, OverwritePolicy, PermissionMode};
use ccextract_verify::{Expected, Sha256Hasher, VerifiedReader};
use tracing::debug;

use crate::entry::EntryReference;
use crate::error::CopyError;

pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyOptions {
    pub policy: OverwritePolicy,
    pub buffer_size: usize,
    pub file_mode: PermissionMode,
    /// Check the catalog's recorded size and digest once the stream ends.
    pub verify: bool,
    /// fsync each file before reporting success.
    pub sync: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            policy: OverwritePolicy::CreateOnly,
            buffer_size: DEFAULT_BUFFER_SIZE,
            file_mode: PermissionMode::custom(0o640),
            verify: true,
            sync: false,
        }
    }
}

impl CopyOptions {
    pub fn policy(mut self, policy: OverwritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// What a finished copy moved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyStats {
    pub bytes: u64,
    /// Hex-encoded SHA-256 of the bytes written.
    pub sha256: String,
}

/// Copy `entry` from the base view to the same relative path below `dest`.
///
/// Every chunk read is written before the next read. On failure the
/// partially written file is left as is.
pub fn copy_entry<C>(
    base: &C,
    dest: &OutputDir,
    entry: &EntryReference,
    options: &CopyOptions,
) -> Result<CopyStats, CopyError>
where
    C: Container + ?Sized,
{
    let path = entry.path();

    dest.resolve(path).map_err(|source| CopyError::UnsafePath {
        path: path.to_string(),
        source,
    })?;

    let source = base.open_read(path, entry.selector()).map_err(|source| CopyError::SourceOpenFailed {
        path: path.to_string(),
        source,
    })?;

    let expected = if options.verify {
        let meta = base.metadata(path).map_err(|source| CopyError::SourceOpenFailed {
            path: path.to_string(),
            source,
        })?;
        Expected {
            size: meta.size,
            digest: meta.sha256,
        }
    } else {
        Expected::none()
    };

    let mut file = dest
        .create_file(path, options.policy, options.file_mode)
        .map_err(|source| match source {
            ccextract_fs::Error::AlreadyExists(_) => CopyError::DestExists {
                path: path.to_string(),
            },
            source => CopyError::DestCreateFailed {
                path: path.to_string(),
                source,
            },
        })?;

    let stream_failed = |source: io::Error| CopyError::StreamFailed {
        path: path.to_string(),
        source,
    };

    let mut reader = VerifiedReader::new(source, Sha256Hasher::new());
    let mut buf = vec![0u8; options.buffer_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(stream_failed(e)),
        };
        file.write_all(&buf[..n]).map_err(stream_failed)?;
    }
    file.flush().map_err(stream_failed)?;
    if options.sync {
        file.sync_all().map_err(stream_failed)?;
    }

    let summary = reader.finish(&expected).map_err(|source| CopyError::Verify {
        path: path.to_string(),
        source,
    })?;

    debug!(entry = %entry, bytes = summary.bytes, "copied");
    Ok(CopyStats {
        bytes: summary.bytes,
        sha256: summary.digest_hex(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccextract_catalog::{ArchiveView, Catalog, CatalogTree, EntrySpec, MemorySource};
    use tempfile::tempdir;

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn base() -> ArchiveView {
        let mut tree = CatalogTree::new();
        let archive = tree.add_archive("data.tar").unwrap();
        tree.insert(archive, EntrySpec::file("hello", 0).size(11).sha256(HELLO_SHA256))
            .unwrap();
        let dir = tree.insert(archive, EntrySpec::directory("dir")).unwrap();
        tree.insert(dir, EntrySpec::file("nested", 20)).unwrap();
        tree.insert(archive, EntrySpec::file("liar", 30).size(99)).unwrap();
        tree.insert(archive, EntrySpec::file("lost", 40)).unwrap();

        let source = MemorySource::new()
            .with("data.tar", "hello", b"hello world".to_vec())
            .with("data.tar", "dir/nested", vec![7u8; 100_000])
            .with("data.tar", "liar", b"short".to_vec());
        Catalog::new(tree, source).base_view("data.tar").unwrap()
    }

    #[test]
    fn copies_and_verifies() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let stats = copy_entry(&base(), &out, &EntryReference::parse("hello"), &CopyOptions::default())
            .unwrap();
        assert_eq!(stats.bytes, 11);
        assert_eq!(stats.sha256, HELLO_SHA256);
        assert_eq!(std::fs::read(dir.path().join("hello")).unwrap(), b"hello world");
    }

    #[test]
    fn creates_parents_and_streams_in_chunks() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let options = CopyOptions {
            buffer_size: 4096,
            ..CopyOptions::default()
        };
        let stats = copy_entry(&base(), &out, &EntryReference::parse("dir/nested"), &options).unwrap();
        assert_eq!(stats.bytes, 100_000);
        assert_eq!(std::fs::read(dir.path().join("dir/nested")).unwrap(), vec![7u8; 100_000]);
    }

    #[test]
    fn create_only_refuses_existing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("hello"), b"keep").unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let err = copy_entry(&base(), &out, &EntryReference::parse("hello"), &CopyOptions::default())
            .unwrap_err();
        assert!(matches!(err, CopyError::DestExists { ref path } if path == "hello"));
        assert_eq!(std::fs::read(dir.path().join("hello")).unwrap(), b"keep");
    }

    #[test]
    fn truncate_replaces_existing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("hello"), b"a much longer previous content").unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let options = CopyOptions::default().policy(OverwritePolicy::TruncateExisting);
        copy_entry(&base(), &out, &EntryReference::parse("hello"), &options).unwrap();
        assert_eq!(std::fs::read(dir.path().join("hello")).unwrap(), b"hello world");
    }

    #[test]
    fn size_mismatch_reported_and_file_kept() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let err = copy_entry(&base(), &out, &EntryReference::parse("liar"), &CopyOptions::default())
            .unwrap_err();
        assert!(matches!(err, CopyError::Verify { .. }));
        assert_eq!(err.path(), "liar");
        assert_eq!(std::fs::read(dir.path().join("liar")).unwrap(), b"short");

        let unchecked = CopyOptions::default()
            .verify(false)
            .policy(OverwritePolicy::TruncateExisting);
        copy_entry(&base(), &out, &EntryReference::parse("liar"), &unchecked).unwrap();
    }

    #[test]
    fn missing_payload_is_source_open_failure() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let err = copy_entry(&base(), &out, &EntryReference::parse("lost"), &CopyOptions::default())
            .unwrap_err();
        assert!(matches!(err, CopyError::SourceOpenFailed { .. }));
        assert!(!dir.path().join("lost").exists());
    }

    #[test]
    fn selector_reaches_the_container() {
        struct Keyed(ArchiveView);

        impl Container for Keyed {
            fn path_type(&self, path: &str) -> ccextract_catalog::PathType {
                self.0.path_type(path)
            }

            fn file_locator(&self, path: &str) -> ccextract_catalog::Result<u64> {
                self.0.file_locator(path)
            }

            fn resolve_alias(&self, id: &str) -> ccextract_catalog::Result<String> {
                self.0.resolve_alias(id)
            }

            fn open_read(&self, path: &str, selector: Option<&str>) -> ccextract_catalog::Result<Box<dyn Read + '_>> {
                match selector {
                    Some("?pwd=open") => self.0.open_read(path, selector),
                    _ => Err(ccextract_catalog::Error::NotFound(path.to_string())),
                }
            }

            fn read_dir(&self, path: &str) -> ccextract_catalog::Result<Vec<String>> {
                self.0.read_dir(path)
            }

            fn metadata(&self, path: &str) -> ccextract_catalog::Result<ccextract_catalog::EntryMeta> {
                self.0.metadata(path)
            }
        }

        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let keyed = Keyed(base());

        let err = copy_entry(&keyed, &out, &EntryReference::parse("hello"), &CopyOptions::default())
            .unwrap_err();
        assert!(matches!(err, CopyError::SourceOpenFailed { .. }));

        let stats = copy_entry(&keyed, &out, &EntryReference::parse("hello?pwd=open"), &CopyOptions::default())
            .unwrap();
        assert_eq!(stats.sha256, HELLO_SHA256);
        assert_eq!(std::fs::read(dir.path().join("hello")).unwrap(), b"hello world");
    }

    #[test]
    fn escaping_path_rejected_before_open() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let err = copy_entry(&base(), &out, &EntryReference::parse("../x"), &CopyOptions::default())
            .unwrap_err();
        assert!(matches!(err, CopyError::UnsafePath { .. }));
    }
}
