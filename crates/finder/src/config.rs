//! Engine options.
//!
//! Options can be loaded from environment variables or constructed
//! programmatically. Every acceleration is on by default; switching one off
//! makes the matching capability report unsupported without probing.

use std::env;

/// Which native accelerations the engine may use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinderOptions {
    /// Use the host's bulk query and single-match primitives.
    pub native_queries: bool,
    /// Use the host's by-id, by-class and by-tag lookups when seeding.
    pub bulk_lookups: bool,
    /// Run native bulk queries from non-root contexts by tagging the context
    /// with a temporary scope marker attribute.
    pub scoped_native_queries: bool,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            native_queries: true,
            bulk_lookups: true,
            scoped_native_queries: true,
        }
    }
}

impl FinderOptions {
    /// Load options from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `FINDER_NO_NATIVE`: set to "1" to disable native queries and single matches
    /// - `FINDER_NO_BULK`: set to "1" to disable by-id, by-class and by-tag lookups
    /// - `FINDER_NO_SCOPED_NATIVE`: set to "1" to keep native queries at the document root
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let flag = |name: &str| env::var(name).ok().as_deref() == Some("1");
        Self {
            native_queries: !flag("FINDER_NO_NATIVE"),
            bulk_lookups: !flag("FINDER_NO_BULK"),
            scoped_native_queries: !flag("FINDER_NO_SCOPED_NATIVE"),
        }
    }

    /// Every acceleration off: pure seed and validate over tree navigation.
    #[inline]
    #[must_use]
    pub const fn manual() -> Self {
        Self {
            native_queries: false,
            bulk_lookups: false,
            scoped_native_queries: false,
        }
    }
}
