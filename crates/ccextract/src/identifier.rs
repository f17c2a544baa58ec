//! Turning user-supplied identifiers into entry references.
//!
//! Two forms are accepted:
//!
//! - a plain path, optionally prefixed with the file scheme
//!   (`dir/b`, `ncbi-file:dir/b?x`);
//! - an indirect id (`copycat-id:42?x`). The id is dereferenced through the
//!   root view's alias table, the archive name is stripped from the
//!   resulting canonical path, and the selector is carried over onto a
//!   file-scheme path.

use ccextract_catalog::Container;
use ccextract_catalog::uri::{split_scheme, split_selector};
use tracing::debug;

use crate::entry::EntryReference;
use crate::error::ResolveError;

/// Scheme names recognized in identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdScheme {
    pub indirect: String,
    pub file: String,
}

impl IdScheme {
    pub fn new(indirect: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            indirect: indirect.into(),
            file: file.into(),
        }
    }
}

impl Default for IdScheme {
    fn default() -> Self {
        Self::new("copycat-id", "ncbi-file")
    }
}

/// The three parts of an indirect identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct IndirectId<'a> {
    id: &'a str,
    selector: Option<&'a str>,
}

impl<'a> IndirectId<'a> {
    fn parse(raw: &'a str, scheme: &str) -> Option<Self> {
        let (found, rest) = split_scheme(raw);
        if found != Some(scheme) {
            return None;
        }
        let (id, selector) = split_selector(rest);
        Some(Self { id, selector })
    }

    /// `file_scheme:remainder` with the original selector re-appended.
    fn rewrite(&self, remainder: &str, file_scheme: &str) -> String {
        let selector = self.selector.unwrap_or_default();
        format!("{file_scheme}:{remainder}{selector}")
    }
}

/// Split a canonical alias target into its leading component and the rest.
fn strip_leading(canonical: &str) -> (&str, &str) {
    let trimmed = canonical.strip_prefix('/').unwrap_or(canonical);
    match trimmed.split_once('/') {
        Some((leading, rest)) => (leading, rest.trim_start_matches('/')),
        None => (trimmed, ""),
    }
}

pub struct Resolver<C> {
    root: C,
    scheme: IdScheme,
    archive: Option<String>,
}

impl<C: Container> Resolver<C> {
    /// `root` is the view whose alias table indirect ids are looked up in.
    pub fn new(root: C) -> Self {
        Self {
            root,
            scheme: IdScheme::default(),
            archive: None,
        }
    }

    pub fn scheme(mut self, scheme: IdScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Reject aliases whose canonical path lies in a different archive.
    pub fn archive(mut self, name: impl Into<String>) -> Self {
        self.archive = Some(name.into());
        self
    }

    pub fn resolve(&self, raw: &str) -> Result<EntryReference, ResolveError> {
        match split_scheme(raw).0 {
            None => Ok(EntryReference::parse(raw)),
            Some(scheme) if scheme == self.scheme.file => Ok(EntryReference::parse(raw)),
            Some(scheme) if scheme == self.scheme.indirect => self.resolve_indirect(raw),
            Some(scheme) => Err(ResolveError::UnknownScheme {
                identifier: raw.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }

    fn resolve_indirect(&self, raw: &str) -> Result<EntryReference, ResolveError> {
        let Some(indirect) = IndirectId::parse(raw, &self.scheme.indirect) else {
            return Ok(EntryReference::parse(raw));
        };

        let canonical =
            self.root
                .resolve_alias(indirect.id)
                .map_err(|source| ResolveError::AliasUnresolvable {
                    identifier: raw.to_string(),
                    id: indirect.id.to_string(),
                    source,
                })?;

        let (leading, remainder) = strip_leading(&canonical);
        if let Some(archive) = &self.archive {
            if leading != archive {
                return Err(ResolveError::ForeignArchive {
                    identifier: raw.to_string(),
                    canonical,
                    archive: archive.clone(),
                });
            }
        }

        let entry = EntryReference::parse(&indirect.rewrite(remainder, &self.scheme.file));
        if entry.is_root() {
            return Err(ResolveError::EmptyAfterStrip {
                identifier: raw.to_string(),
            });
        }
        debug!(identifier = raw, %canonical, entry = %entry, "dereferenced indirect id");
        Ok(entry)
    }
}
