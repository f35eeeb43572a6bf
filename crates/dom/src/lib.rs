//! An arena-backed document that implements [`finder::TreeAdapter`].
//!
//! Besides navigation and attribute reads it offers every optional host
//! primitive the engine can use (id, class and tag lookups, a bulk query and
//! a single match, scratch-node mutation), each of which can be switched off
//! or made to misbehave through a [`HostProfile`].

mod document;
mod host;
mod native;
mod profile;

pub use document::{Document, DomKind, DomNode};
pub use indextree::NodeId;
pub use profile::{HostProfile, Primitive};
