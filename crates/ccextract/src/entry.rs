use std::fmt;
use std::ops::Add;
use std::sync::Arc;

use ccextract_catalog::uri::{split_scheme, split_selector};

/// Handle to an entry inside the archive's namespace.
///
/// Cheap to clone; the plan holds one per scheduled extraction.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EntryReference(Arc<Inner>);

#[derive(PartialEq, Eq, Hash)]
struct Inner {
    scheme: Option<String>,
    path: String,
    selector: Option<String>,
}

impl EntryReference {
    /// Parse a `[scheme:]path[?query|#fragment]` form.
    ///
    /// The path is normalized: empty and `.` components are dropped, so
    /// `./dir//b` and `dir/b` name the same entry and `.` names the root.
    /// A leading `/` is kept so the view can reject it.
    pub fn parse(raw: &str) -> Self {
        let (scheme, rest) = split_scheme(raw);
        let (path, selector) = split_selector(rest);
        Self::from_parts(scheme.map(str::to_string), path, selector.map(str::to_string))
    }

    fn from_parts(scheme: Option<String>, path: &str, selector: Option<String>) -> Self {
        Self(Arc::new(Inner {
            scheme,
            path: normalize(path),
            selector,
        }))
    }

    /// A direct child, carrying this reference's scheme and selector.
    pub fn child(&self, name: &str) -> Self {
        let path = if self.is_root() {
            name.to_string()
        } else {
            format!("{}/{}", self.0.path, name)
        };
        Self::from_parts(self.0.scheme.clone(), &path, self.0.selector.clone())
    }

    /// Canonical path relative to the archive root. Also the destination
    /// path relative to the output directory.
    pub fn path(&self) -> &str {
        &self.0.path
    }

    pub fn scheme(&self) -> Option<&str> {
        self.0.scheme.as_deref()
    }

    /// Trailing `?query` or `#fragment`, marker included.
    pub fn selector(&self) -> Option<&str> {
        self.0.selector.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.0.path.is_empty()
    }
}

impl fmt::Debug for EntryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryReference")
            .field("scheme", &self.0.scheme)
            .field("path", &self.0.path)
            .field("selector", &self.0.selector)
            .finish()
    }
}

impl fmt::Display for EntryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")?;
        } else {
            f.write_str(&self.0.path)?;
        }
        if let Some(selector) = &self.0.selector {
            f.write_str(selector)?;
        }
        Ok(())
    }
}

fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    if path.starts_with('/') {
        out.push('/');
    }
    for component in path.split('/').filter(|c| !c.is_empty() && *c != ".") {
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(component);
    }
    out
}

/// Cumulative physical position of an entry below the archive root.
///
/// Only meaningful as a sort key between entries of the same archive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalKey(u64);

impl PhysicalKey {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl From<u64> for PhysicalKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Add for PhysicalKey {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for PhysicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
