use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Result of sanitizing an entry path against the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizedPath {
    /// The path as the catalog named it.
    pub original: PathBuf,
    /// Normalized path relative to the output directory.
    pub relative: PathBuf,
    /// `base` joined with `relative`.
    pub resolved: PathBuf,
}

/// Sanitize a catalog entry path for extraction below `base`.
///
/// `.` components and repeated separators are dropped, `..` is resolved
/// lexically. Absolute paths and paths that climb above `base` are rejected
/// instead of being clamped.
pub fn sanitize_relative<P: AsRef<Path>, B: AsRef<Path>>(entry_path: P, base: B) -> Result<SanitizedPath> {
    let entry_path = entry_path.as_ref();
    let base = base.as_ref();

    if entry_path.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(Error::InvalidPath(entry_path.to_path_buf()));
    }

    let relative = normalize_relative(entry_path)?;
    if relative.as_os_str().is_empty() {
        return Err(Error::EmptyPath);
    }

    Ok(SanitizedPath {
        original: entry_path.to_path_buf(),
        resolved: base.join(&relative),
        relative,
    })
}

fn normalize_relative(path: &Path) -> Result<PathBuf> {
    let mut result = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Normal(part) => {
                result.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(Error::Escape {
                        entry: path.to_path_buf(),
                    });
                }
                result.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::Absolute(path.to_path_buf()));
            }
        }
    }

    Ok(result)
}
