use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::ControlFlow;

use tracing::debug;

use crate::entry::{EntryReference, PhysicalKey};
use crate::error::PlanError;

/// Entries to extract, ordered by physical key then canonical path.
///
/// Inserting an entry whose `(key, path)` is already planned is a no-op, so
/// an entry named twice is extracted once.
#[derive(Debug, Default)]
pub struct ExtractionPlan {
    entries: BTreeMap<(PhysicalKey, String), EntryReference>,
}

impl ExtractionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: EntryReference, key: PhysicalKey) -> Result<(), PlanError> {
        if entry.is_root() {
            return Err(PlanError::InsertFailed {
                path: entry.to_string(),
                reason: "the archive root is not an extractable entry",
            });
        }

        match self.entries.entry((key, entry.path().to_string())) {
            Entry::Occupied(_) => {
                debug!(entry = %entry, %key, "duplicate collapsed");
            }
            Entry::Vacant(slot) => {
                debug!(entry = %entry, %key, "planned");
                slot.insert(entry);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Planned entries in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (PhysicalKey, &EntryReference)> {
        self.entries.iter().map(|((key, _), entry)| (*key, entry))
    }

    /// Visit every entry in order, stopping at the first `Break`.
    ///
    /// Consumes the plan; entries not visited are dropped with it. Returns
    /// `true` when the visitor broke off.
    pub fn for_each_in_order<F>(self, mut visitor: F) -> bool
    where
        F: FnMut(PhysicalKey, EntryReference) -> ControlFlow<()>,
    {
        for ((key, _), entry) in self.entries {
            if visitor(key, entry).is_break() {
                return true;
            }
        }
        false
    }
}
