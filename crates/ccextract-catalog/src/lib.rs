//! Catalog-backed virtual directory over archives.
//!
//! A [`Catalog`] is an XML description of one or more archives sitting in
//! a directory: which entries each archive holds, where their bytes start
//! relative to the enclosing container, and the opaque ids that name them.
//! Two kinds of [`ArchiveView`] are handed out:
//!
//! - the root view, where paths start with an archive name and ids resolve
//!   to rooted canonical paths;
//! - a base view, the named archive opened as a directory.
//!
//! Both implement [`Container`], the contract the extraction engine is
//! written against.

mod container;
mod error;
mod location;
mod source;
mod tree;
pub mod uri;
mod view;
mod xml;

pub use container::{Container, EntryMeta, PathType};
pub use error::{Error, Result};
pub use location::ArchiveLocation;
pub use source::{ByteSource, DirSource, MemorySource, ReadRequest};
pub use tree::{CatalogTree, EntrySpec, Lookup, Node, NodeId, NodeKind};
pub use view::{ArchiveView, Catalog};
pub use xml::parse_catalog;
