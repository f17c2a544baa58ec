use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::permissions::PermissionMode;
use crate::sanitize::{SanitizedPath, sanitize_relative};
use crate::{Error, Result};

/// What to do when a destination file already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Fail with [`Error::AlreadyExists`].
    #[default]
    CreateOnly,
    /// Truncate and rewrite the existing file.
    TruncateExisting,
}

impl OverwritePolicy {
    pub fn from_force(force: bool) -> Self {
        if force { Self::TruncateExisting } else { Self::CreateOnly }
    }
}

/// Handle on the extraction target directory.
///
/// The directory must already exist; it is the only writer of the output
/// tree for the lifetime of a run.
#[derive(Clone, Debug)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref();
        let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(root.to_path_buf()),
            _ => Error::Read {
                path: root.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Sanitize `relative` against this directory without touching the disk.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<SanitizedPath> {
        sanitize_relative(relative, &self.root)
    }

    /// Create `relative` for writing, creating missing parent directories.
    pub fn create_file(
        &self,
        relative: impl AsRef<Path>,
        policy: OverwritePolicy,
        mode: PermissionMode,
    ) -> Result<File> {
        let target = self.resolve(relative)?.resolved;

        if let Some(parent) = target.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut options = OpenOptions::new();
        options.write(true);
        match policy {
            OverwritePolicy::CreateOnly => {
                options.create_new(true);
            }
            OverwritePolicy::TruncateExisting => {
                options.create(true).truncate(true);
            }
        }
        mode.apply_to_options(&mut options);

        let file = options.open(&target).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::AlreadyExists(target.clone()),
            _ => Error::Create {
                path: target.clone(),
                source: e,
            },
        })?;
        tracing::trace!(path = %target.display(), ?policy, "created output file");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn open_missing_directory() {
        let dir = tempdir().unwrap();
        let result = OutputDir::open(dir.path().join("missing"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn open_regular_file_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(OutputDir::open(&file), Err(Error::NotADirectory(_))));
    }

    #[test]
    fn create_file_makes_parents() -> Result<()> {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path())?;
        let mut file = out.create_file("a/b/c.txt", OverwritePolicy::CreateOnly, PermissionMode::Inherit)?;
        file.write_all(b"data").unwrap();
        drop(file);
        assert_eq!(std::fs::read(dir.path().join("a/b/c.txt")).unwrap(), b"data");
        Ok(())
    }

    #[test]
    fn create_only_rejects_existing() -> Result<()> {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("x"), b"old").unwrap();
        let out = OutputDir::open(dir.path())?;
        let result = out.create_file("x", OverwritePolicy::CreateOnly, PermissionMode::Inherit);
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
        assert_eq!(std::fs::read(dir.path().join("x")).unwrap(), b"old");
        Ok(())
    }

    #[test]
    fn truncate_existing_replaces_content() -> Result<()> {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("x"), b"old and long").unwrap();
        let out = OutputDir::open(dir.path())?;
        let mut file = out.create_file("x", OverwritePolicy::TruncateExisting, PermissionMode::Inherit)?;
        file.write_all(b"new").unwrap();
        drop(file);
        assert_eq!(std::fs::read(dir.path().join("x")).unwrap(), b"new");
        Ok(())
    }

    #[test]
    fn escaping_path_creates_nothing() -> Result<()> {
        let dir = tempdir().unwrap();
        let out_path = dir.path().join("out");
        std::fs::create_dir(&out_path).unwrap();
        let out = OutputDir::open(&out_path)?;
        let result = out.create_file("../sneaky", OverwritePolicy::TruncateExisting, PermissionMode::Inherit);
        assert!(matches!(result, Err(ref e) if e.is_unsafe_path()));
        assert!(!dir.path().join("sneaky").exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn custom_mode_applied_on_create() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path())?;
        drop(out.create_file("m", OverwritePolicy::CreateOnly, PermissionMode::custom(0o600))?);
        let mode = std::fs::metadata(dir.path().join("m")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }
}
