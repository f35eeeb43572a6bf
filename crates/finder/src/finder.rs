//! The engine instance bound to one host tree.

use crate::adapter::{NodeKind, TreeAdapter};
use crate::capability::{CapabilityProfile, Feature, Support};
use crate::config::FinderOptions;
use crate::error::FinderError;
use crate::failures::{Acceleration, StickyFailures};
use crate::identity::{NodeIdentities, NodeUid};
use core::cell::RefCell;
use log::debug;

/// Selector search engine over a single tree.
///
/// Holds the capability profile, the sticky failure record and the node
/// identity allocator for that tree. All caches use interior mutability, so
/// every operation takes `&self` and reentrant use (as `:not(...)` does) is
/// fine on one thread.
pub struct Finder<'tree, T: TreeAdapter> {
    pub(crate) tree: &'tree T,
    pub(crate) options: FinderOptions,
    pub(crate) profile: CapabilityProfile,
    pub(crate) failures: StickyFailures,
    identities: RefCell<NodeIdentities<T::Node>>,
}

impl<'tree, T: TreeAdapter> Finder<'tree, T> {
    /// Create an engine with default options.
    ///
    /// # Errors
    /// Returns [`FinderError::InvalidDocument`] when the tree root is not a
    /// document node.
    pub fn new(tree: &'tree T) -> Result<Self, FinderError> {
        Self::with_options(tree, FinderOptions::default())
    }

    /// Create an engine with explicit options.
    ///
    /// # Errors
    /// Returns [`FinderError::InvalidDocument`] when the tree root is not a
    /// document node.
    pub fn with_options(tree: &'tree T, options: FinderOptions) -> Result<Self, FinderError> {
        let found = tree.node_kind(tree.root());
        if found != NodeKind::Document {
            return Err(FinderError::InvalidDocument { found });
        }
        debug!(target: "finder::search", "finder created with {options:?}");
        Ok(Self {
            tree,
            profile: CapabilityProfile::new(options.clone()),
            options,
            failures: StickyFailures::default(),
            identities: RefCell::new(NodeIdentities::new()),
        })
    }

    #[inline]
    pub const fn tree(&self) -> &'tree T {
        self.tree
    }

    #[inline]
    pub const fn options(&self) -> &FinderOptions {
        &self.options
    }

    /// Whether the host supports `feature`, probing it on first request.
    pub fn supports(&self, feature: Feature) -> bool {
        self.profile.supports(self.tree, feature, || {
            let token = self.fresh_token();
            format!("finder-probe-{}-{}", token.space(), token.counter())
        })
    }

    /// Recorded probe state of `feature`, without probing.
    pub fn support_status(&self, feature: Feature) -> Support {
        self.profile.status(feature)
    }

    /// Whether native `kind` is known to fail for `selector_text`.
    pub fn is_sticky_failure(&self, kind: Acceleration, selector_text: &str) -> bool {
        self.failures.is_failed(kind, selector_text)
    }

    /// Stable identifier of `node`, minted on first request.
    pub fn uid(&self, node: T::Node) -> NodeUid {
        self.identities.borrow_mut().key_of(node)
    }

    /// A fresh identifier bound to no node.
    pub(crate) fn fresh_token(&self) -> NodeUid {
        self.identities.borrow_mut().token()
    }

    /// Read an attribute through whichever getter the host gets right.
    pub fn get_attribute(&self, node: T::Node, name: &str) -> Option<String> {
        if self.supports(Feature::FormAttributeGetter) {
            self.tree.get_attribute(node, name)
        } else {
            self.tree.attribute_node_value(node, name)
        }
    }

    pub fn has_attribute(&self, node: T::Node, name: &str) -> bool {
        self.tree.has_attribute(node, name)
    }

    /// True when `node` is a strict descendant of `ancestor`.
    pub fn contains(&self, ancestor: T::Node, node: T::Node) -> bool {
        self.tree.contains(ancestor, node)
    }

    /// Record a native failure and log it.
    pub(crate) fn record_failure(&self, kind: Acceleration, text: &str, err: &anyhow::Error) {
        let target = match kind {
            Acceleration::QuerySelectorAll => "finder::search",
            Acceleration::MatchesSelector => "finder::matcher",
        };
        debug!(target: target, "native {kind:?} failed for `{text}`: {err}");
        self.failures.record(kind, text);
    }
}
