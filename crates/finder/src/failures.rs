//! Sticky record of native accelerations that failed for a given selector.

use core::cell::RefCell;
use std::collections::HashSet;

/// The native primitive a failure was recorded against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Acceleration {
    /// Bulk query (`query_selector_all`).
    QuerySelectorAll,
    /// Single match (`matches_selector`).
    MatchesSelector,
}

/// Selector texts known to break a native primitive on this tree. Entries are
/// never evicted.
#[derive(Debug, Default)]
pub struct StickyFailures {
    failed: RefCell<HashSet<(Acceleration, String)>>,
}

impl StickyFailures {
    pub fn is_failed(&self, kind: Acceleration, text: &str) -> bool {
        self.failed.borrow().contains(&(kind, text.to_owned()))
    }

    pub fn record(&self, kind: Acceleration, text: &str) {
        self.failed.borrow_mut().insert((kind, text.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_tracked_separately() {
        let failures = StickyFailures::default();
        failures.record(Acceleration::MatchesSelector, "a:x");
        assert!(failures.is_failed(Acceleration::MatchesSelector, "a:x"));
        assert!(!failures.is_failed(Acceleration::QuerySelectorAll, "a:x"));
        failures.record(Acceleration::MatchesSelector, "a:x");
        assert_eq!(failures.failed.borrow().len(), 1);
    }
}
