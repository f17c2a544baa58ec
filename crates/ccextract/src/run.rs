//! The extraction run: resolve every identifier, key and order the results,
//! then copy in physical order.
//!
//! Every stage is fail-fast. An unresolved identifier aborts the run before
//! anything is planned, and a bad entry aborts it before anything is copied.
//! The first copy failure stops the traversal; files already written stay.

use std::ops::ControlFlow;

use ccextract_catalog::{Container, PathType};
use ccextract_fs::OutputDir;
use tracing::{debug, error, info, warn};

use crate::copy::{CopyOptions, copy_entry};
use crate::entry::{EntryReference, PhysicalKey};
use crate::error::{OffsetError, Result, RunError};
use crate::identifier::{IdScheme, Resolver};
use crate::offset::offset_of;
use crate::plan::ExtractionPlan;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    ResolvingIdentifiers,
    ComputingOffsets,
    Extracting,
    Done,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopiedFile {
    pub path: String,
    pub key: PhysicalKey,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Copied entries in extraction order.
    pub copied: Vec<CopiedFile>,
    /// Identifiers that named the archive root and were skipped.
    pub skipped: usize,
}

impl RunReport {
    pub fn total_bytes(&self) -> u64 {
        self.copied.iter().map(|f| f.bytes).sum()
    }
}

/// Sequences resolver, offset computer, plan and copy engine over one
/// archive.
///
/// `R` is the root view (the directory holding the archive, used for
/// alias lookups) and `B` the base view (the archive opened as a
/// directory, used for everything else).
pub struct Extractor<'o, R, B> {
    resolver: Resolver<R>,
    base: B,
    output: &'o OutputDir,
    options: CopyOptions,
    state: RunState,
}

impl<'o, R: Container, B: Container> Extractor<'o, R, B> {
    pub fn new(root: R, base: B, output: &'o OutputDir) -> Self {
        Self {
            resolver: Resolver::new(root),
            base,
            output,
            options: CopyOptions::default(),
            state: RunState::Idle,
        }
    }

    pub fn scheme(mut self, scheme: IdScheme) -> Self {
        self.resolver = self.resolver.scheme(scheme);
        self
    }

    /// Name of the archive in the root view; indirect ids resolving
    /// elsewhere are rejected.
    pub fn archive(mut self, name: impl Into<String>) -> Self {
        self.resolver = self.resolver.archive(name);
        self
    }

    pub fn options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run<I, S>(&mut self, identifiers: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = self.run_stages(identifiers);
        match &result {
            Ok(report) => {
                self.state = RunState::Done;
                info!(files = report.copied.len(), bytes = report.total_bytes(), "extraction done");
            }
            Err(e) => {
                error!(stage = ?self.state, error = %e, "extraction aborted");
                self.state = RunState::Failed;
            }
        }
        result
    }

    fn run_stages<I, S>(&mut self, identifiers: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.state = RunState::ResolvingIdentifiers;
        let mut resolved = Vec::new();
        let mut skipped = 0;
        for raw in identifiers {
            let raw = raw.as_ref();
            match self.resolver.resolve(raw) {
                Ok(entry) => {
                    debug!(identifier = raw, entry = %entry, "resolved");
                    resolved.push(entry);
                }
                Err(e) if e.is_skip() => {
                    info!(identifier = raw, "skipping reference to the archive root");
                    skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.state = RunState::ComputingOffsets;
        let mut plan = ExtractionPlan::new();
        for entry in resolved {
            self.schedule(&mut plan, entry)?;
        }
        info!(entries = plan.len(), skipped, "extraction plan ready");

        self.state = RunState::Extracting;
        let mut copied = Vec::with_capacity(plan.len());
        let mut failure = None;
        plan.for_each_in_order(|key, entry| {
            match copy_entry(&self.base, self.output, &entry, &self.options) {
                Ok(stats) => {
                    copied.push(CopiedFile {
                        path: entry.path().to_string(),
                        key,
                        bytes: stats.bytes,
                        sha256: stats.sha256,
                    });
                    ControlFlow::Continue(())
                }
                Err(e) => {
                    failure = Some(e);
                    ControlFlow::Break(())
                }
            }
        });

        match failure {
            Some(e) => Err(RunError::Copy(e)),
            None => Ok(RunReport { copied, skipped }),
        }
    }

    fn schedule(&self, plan: &mut ExtractionPlan, entry: EntryReference) -> Result<()> {
        if self.base.path_type(entry.path()) == PathType::Directory {
            return self.schedule_tree(plan, entry);
        }
        let key = offset_of(&self.base, &entry)?;
        plan.insert(entry, key)?;
        Ok(())
    }

    /// Plan every file below `dir`. Nested containers count as files.
    fn schedule_tree(&self, plan: &mut ExtractionPlan, dir: EntryReference) -> Result<()> {
        let mut pending = vec![dir];
        while let Some(dir) = pending.pop() {
            let names = self
                .base
                .read_dir(dir.path())
                .map_err(|source| OffsetError::Catalog {
                    path: dir.to_string(),
                    source,
                })?;
            for name in names {
                let child = dir.child(&name);
                match self.base.path_type(child.path()) {
                    PathType::File => {
                        let key = offset_of(&self.base, &child)?;
                        plan.insert(child, key)?;
                    }
                    PathType::Directory => pending.push(child),
                    other => warn!(entry = %child, kind = ?other, "skipping special entry"),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccextract_catalog::{ArchiveView, Catalog, CatalogTree, EntrySpec, MemorySource, NodeKind};
    use tempfile::tempdir;

    fn catalog() -> Catalog {
        let mut tree = CatalogTree::new();
        let archive = tree.add_archive("data.tar").unwrap();
        tree.insert(archive, EntrySpec::file("a", 10).id("A")).unwrap();
        let docs = tree.insert(archive, EntrySpec::directory("docs")).unwrap();
        tree.insert(docs, EntrySpec::file("z", 1)).unwrap();
        tree.insert(docs, EntrySpec::new(NodeKind::Device, "null")).unwrap();
        let sub = tree.insert(docs, EntrySpec::directory("sub")).unwrap();
        tree.insert(sub, EntrySpec::file("y", 3)).unwrap();

        let source = MemorySource::new()
            .with("data.tar", "a", b"A".to_vec())
            .with("data.tar", "docs/z", b"Z".to_vec())
            .with("data.tar", "docs/sub/y", b"Y".to_vec());
        Catalog::new(tree, source)
    }

    fn views() -> (ArchiveView, ArchiveView) {
        let catalog = catalog();
        (catalog.root_view(), catalog.base_view("data.tar").unwrap())
    }

    fn paths(report: &RunReport) -> Vec<&str> {
        report.copied.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn state_progresses_to_done() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let (root, base) = views();
        let mut extractor = Extractor::new(root, base, &out);
        assert_eq!(extractor.state(), RunState::Idle);

        let report = extractor.run(["a"]).unwrap();
        assert_eq!(extractor.state(), RunState::Done);
        assert_eq!(paths(&report), ["a"]);
        assert_eq!(report.copied[0].key, PhysicalKey::new(10));
    }

    #[test]
    fn directory_expands_and_skips_specials() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let (root, base) = views();
        let report = Extractor::new(root, base, &out).run(["docs"]).unwrap();
        assert_eq!(paths(&report), ["docs/z", "docs/sub/y"]);
        assert!(!dir.path().join("docs/null").exists());
    }

    #[test]
    fn root_dot_extracts_everything() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let (root, base) = views();
        let report = Extractor::new(root, base, &out).run(["."]).unwrap();
        assert_eq!(paths(&report), ["docs/z", "docs/sub/y", "a"]);
        assert_eq!(report.total_bytes(), 3);
    }

    #[test]
    fn special_entry_named_explicitly_fails() {
        let dir = tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        let (root, base) = views();
        let mut extractor = Extractor::new(root, base, &out);
        let err = extractor.run(["a", "docs/null"]).unwrap_err();
        assert!(matches!(err, RunError::Offset(OffsetError::UnsupportedType { .. })));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(extractor.state(), RunState::Failed);
        assert!(!dir.path().join("a").exists());
    }
}
