//! Ordered extraction of catalogued archive entries.
//!
//! # Architecture
//!
//! - `identifier.rs` - Raw identifier to [`EntryReference`], indirect id dereferencing
//! - `offset.rs` - Physical ordering key of an entry
//! - `plan.rs` - Ordered, duplicate-free set of entries to extract
//! - `copy.rs` - Verified stream copy of one entry
//! - `run.rs` - Orchestration of one extraction run
//! - `config.rs` - Layered configuration
//! - `cli.rs` - Command-line surface and bootstrap
//!
//! Archive structure comes from [`ccextract_catalog`]; the engine only
//! talks to it through the [`Container`](ccextract_catalog::Container)
//! trait.

pub mod cli;
pub mod config;
mod copy;
mod entry;
mod error;
mod identifier;
mod offset;
mod plan;
mod run;

pub use copy::{CopyOptions, CopyStats, DEFAULT_BUFFER_SIZE, copy_entry};
pub use entry::{EntryReference, PhysicalKey};
pub use error::{CopyError, OffsetError, PlanError, ResolveError, Result, RunError};
pub use identifier::{IdScheme, Resolver};
pub use offset::offset_of;
pub use plan::ExtractionPlan;
pub use run::{CopiedFile, Extractor, RunReport, RunState};
