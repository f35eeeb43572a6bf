//! Selector search over pluggable host trees.
//!
//! A [`Finder`] answers "which nodes match this selector" for one tree that
//! implements [`TreeAdapter`]. It prefers the host's own primitives (bulk
//! queries, id/class/tag lookups, single matches) once a one-time probe has
//! shown they behave, remembers selectors a native primitive choked on, and
//! otherwise falls back to seeding candidates for the rightmost compound and
//! validating combinators right to left.
//!
//! ```ignore
//! let finder = Finder::new(&document)?;
//! let items = finder.query(None, "ul.menu > li:first-child, li.active");
//! ```

mod adapter;
mod capability;
mod config;
mod error;
mod failures;
mod finder;
mod identity;
mod matcher;
mod pseudo;
mod search;
mod seed;
mod validate;

pub use adapter::{NodeKind, TreeAdapter};
pub use capability::{Feature, Support};
pub use config::FinderOptions;
pub use error::FinderError;
pub use failures::Acceleration;
pub use finder::Finder;
pub use identity::NodeUid;
pub use matcher::Redundant;
pub use pseudo::PseudoClass;
pub use search::SCOPE_ATTRIBUTE;
pub use seed::Seeds;

pub use css_selectors::{SelectorList, parse_selector_list};
