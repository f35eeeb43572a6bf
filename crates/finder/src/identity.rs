//! Lazily minted node identifiers.
//!
//! Each engine instance owns one [`NodeIdentities`] allocator. Allocators draw
//! a key space from a process-wide counter, so identifiers from different
//! engines never collide even when they reach the same host tree.

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::hash::Hash;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashMap;

static NEXT_SPACE: AtomicU64 = AtomicU64::new(1);

/// Claim an unused key space. Spaces are never handed out twice; once the
/// counter is exhausted every caller shares the last one.
fn next_space() -> u64 {
    NEXT_SPACE
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |space| space.checked_add(1))
        .unwrap_or(u64::MAX)
}

/// A stable identifier for a node, unique within the process.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeUid {
    space: u64,
    counter: u32,
}

impl NodeUid {
    /// Key space of the allocator that minted this identifier.
    #[inline]
    #[must_use]
    pub const fn space(self) -> u64 {
        self.space
    }

    /// Sequence number within the key space.
    #[inline]
    #[must_use]
    pub const fn counter(self) -> u32 {
        self.counter
    }
}

impl Display for NodeUid {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "s:{}:{}", self.space(), self.counter())
    }
}

/// Maps host nodes to identifiers, minting on first request.
#[derive(Debug)]
pub struct NodeIdentities<N: Eq + Hash + Copy> {
    space: u64,
    counter: u32,
    map: HashMap<N, NodeUid>,
}

impl<N: Eq + Hash + Copy> Default for NodeIdentities<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Eq + Hash + Copy> NodeIdentities<N> {
    /// Register a new allocator with its own key space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            space: next_space(),
            counter: 1,
            map: HashMap::new(),
        }
    }

    /// Identifier of `node`, minting one if not present.
    #[inline]
    pub fn key_of(&mut self, node: N) -> NodeUid {
        if let Some(&uid) = self.map.get(&node) {
            return uid;
        }
        let uid = self.mint();
        self.map.insert(node, uid);
        uid
    }

    /// A fresh identifier not bound to any node, used for probe ids and
    /// scope markers.
    #[inline]
    pub fn token(&mut self) -> NodeUid {
        self.mint()
    }

    /// Next identifier; an exhausted counter moves to a fresh key space.
    fn mint(&mut self) -> NodeUid {
        let uid = NodeUid {
            space: self.space,
            counter: self.counter,
        };
        if let Some(next) = self.counter.checked_add(1) {
            self.counter = next;
        } else {
            self.space = next_space();
            self.counter = 1;
        }
        uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_of_is_idempotent() {
        let mut ids = NodeIdentities::new();
        let first = ids.key_of(7_u32);
        let other = ids.key_of(8_u32);
        assert_eq!(ids.key_of(7_u32), first);
        assert_ne!(first, other);
    }

    #[test]
    fn allocators_do_not_collide() {
        let mut left = NodeIdentities::new();
        let mut right = NodeIdentities::new();
        let left_uid = left.key_of(1_u8);
        let right_uid = right.key_of(1_u8);
        assert_ne!(left_uid, right_uid);
        assert_eq!(left_uid.counter(), right_uid.counter());
        assert_ne!(left_uid.space(), right_uid.space());
    }

    #[test]
    fn exhausted_counter_moves_to_a_new_space() {
        let mut ids = NodeIdentities::new();
        let early = ids.key_of('a');
        ids.counter = u32::MAX;
        let last = ids.key_of('b');
        let next = ids.key_of('c');
        assert_eq!(last.counter(), u32::MAX);
        assert_eq!(next.counter(), 1);
        assert_ne!(next.space(), last.space());
        assert_ne!(next, early);
        assert_eq!(ids.key_of('a'), early);
    }

    #[test]
    fn tokens_are_fresh() {
        let mut ids = NodeIdentities::<u8>::new();
        let token = ids.token();
        assert_ne!(ids.key_of(0), token);
        assert!(token.to_string().starts_with("s:"));
    }
}
