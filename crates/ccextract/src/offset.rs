use ccextract_catalog::{Container, PathType};
use tracing::trace;

use crate::entry::{EntryReference, PhysicalKey};
use crate::error::OffsetError;

/// Physical ordering key of `entry` inside the base view.
///
/// Sums the file locator of the entry and of every file-typed ancestor;
/// directories contribute nothing. Walks from the leaf towards the root.
pub fn offset_of<C>(base: &C, entry: &EntryReference) -> Result<PhysicalKey, OffsetError>
where
    C: Container + ?Sized,
{
    let mut key = PhysicalKey::ZERO;
    let mut current = Some(entry.path());

    while let Some(path) = current {
        key = add(key, locator_of(base, path)?, entry)?;

        current = match path.rfind('/') {
            Some(0) | None => None,
            Some(at) => Some(&path[..at]),
        };
    }

    trace!(entry = %entry, %key, "computed physical key");
    Ok(key)
}

fn locator_of<C>(base: &C, path: &str) -> Result<PhysicalKey, OffsetError>
where
    C: Container + ?Sized,
{
    match base.path_type(path) {
        PathType::File => base
            .file_locator(path)
            .map(PhysicalKey::new)
            .map_err(|source| OffsetError::Catalog {
                path: path.to_string(),
                source,
            }),
        PathType::Directory => Ok(PhysicalKey::ZERO),
        PathType::NotFound | PathType::ZombieFile => Err(OffsetError::NotFound {
            path: path.to_string(),
        }),
        PathType::BadPath => Err(OffsetError::InvalidPath {
            path: path.to_string(),
        }),
        PathType::Alias | PathType::DeviceOrFifo => Err(OffsetError::UnsupportedType {
            path: path.to_string(),
        }),
    }
}

fn add(key: PhysicalKey, locator: PhysicalKey, entry: &EntryReference) -> Result<PhysicalKey, OffsetError> {
    key.checked_add(locator).ok_or_else(|| OffsetError::Overflow {
        path: entry.path().to_string(),
    })
}
