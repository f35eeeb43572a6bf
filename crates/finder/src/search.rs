//! Search orchestration: native bulk queries first, seed and validate
//! otherwise, then deduplication and document order across alternatives.

use crate::adapter::TreeAdapter;
use crate::capability::Feature;
use crate::failures::Acceleration;
use crate::finder::Finder;
use crate::identity::NodeUid;
use crate::matcher::Redundant;
use anyhow::{Context as _, Result};
use core::cmp::Ordering;
use css_selectors::{Combinator, Expression, SelectorList, escape_string, parse_selector_list};
use log::{debug, warn};
use std::collections::HashSet;

/// Attribute temporarily placed on a non-root context so a native query can
/// be anchored to it.
pub const SCOPE_ATTRIBUTE: &str = "data-finder-scope";

/// Result sink, optionally refusing nodes it has already seen.
struct Collector<'out, N> {
    out: &'out mut Vec<N>,
    seen: Option<HashSet<NodeUid>>,
}

impl<N: Copy> Collector<'_, N> {
    fn was_collected(&self, uid: impl FnOnce() -> NodeUid) -> bool {
        self.seen.as_ref().is_some_and(|seen| seen.contains(&uid()))
    }

    fn push(&mut self, node: N, uid: impl FnOnce() -> NodeUid) {
        if let Some(seen) = self.seen.as_mut()
            && !seen.insert(uid())
        {
            return;
        }
        self.out.push(node);
    }
}

impl<T: TreeAdapter> Finder<'_, T> {
    /// Every node below `context` (the document when `None`) matching any
    /// alternative of `selector`.
    ///
    /// With more than one alternative the result is deduplicated and in
    /// document order; a single alternative is returned in the order it was
    /// found.
    ///
    /// Ids are assumed unique: for a tree that reuses one, an `#id`
    /// search answered by the host's id lookup returns only the element the
    /// lookup reports.
    pub fn search(&self, context: Option<T::Node>, selector: &SelectorList) -> Vec<T::Node> {
        let mut found = Vec::new();
        self.search_into(context, selector, &mut found);
        found
    }

    /// Like [`Finder::search`], appending to `found`. When deduplication
    /// applies it covers the nodes already in `found` too.
    pub fn search_into(&self, context: Option<T::Node>, selector: &SelectorList, found: &mut Vec<T::Node>) {
        if selector.is_empty() {
            return;
        }
        let context = context.unwrap_or_else(|| self.tree.root());
        let dedup = selector.len() > 1;
        let seen = dedup.then(|| found.iter().map(|&node| self.uid(node)).collect());
        let mut sink = Collector { out: found, seen };

        for expression in &selector.expressions {
            if expression.is_empty() {
                continue;
            }
            if !self.search_native(context, expression, &mut sink) {
                self.search_manual(context, expression, &mut sink);
            }
        }

        if dedup {
            self.sort(found);
        }
    }

    /// First node [`Finder::search`] would return.
    pub fn find(&self, context: Option<T::Node>, selector: &SelectorList) -> Option<T::Node> {
        self.search(context, selector).into_iter().next()
    }

    /// Whether `node` matches any alternative of `selector`.
    pub fn matches(&self, node: T::Node, selector: &SelectorList) -> bool {
        if selector.is_empty() {
            return false;
        }
        if let Some(compound) = selector.as_single_compound() {
            return self.match_compound(node, compound, Redundant::default());
        }

        if self.tree.is_element(node) && self.supports(Feature::MatchesSelector) {
            let text = selector.to_string();
            if !self.failures.is_failed(Acceleration::MatchesSelector, &text) {
                match self.tree.matches_selector(node, &text) {
                    Ok(matched) => return matched,
                    Err(err) => self.record_failure(Acceleration::MatchesSelector, &text, &err),
                }
            }
        }

        let mut top = node;
        while let Some(parent) = self.tree.parent(top) {
            top = parent;
        }
        selector.expressions.iter().any(|expression| {
            expression.last().is_some_and(|last| {
                self.match_compound(node, last, Redundant::default())
                    && self.validate(top, node, expression.compounds.len().checked_sub(2), expression)
            })
        })
    }

    /// Stable sort into document order. Left untouched when the host has no
    /// document-order comparator.
    pub fn sort(&self, nodes: &mut [T::Node]) {
        let comparable = match nodes {
            [first, second, ..] => self.tree.compare_document_position(*first, *second).is_some(),
            _ => false,
        };
        if comparable {
            nodes.sort_by(|first, second| {
                self.tree
                    .compare_document_position(*first, *second)
                    .unwrap_or(Ordering::Equal)
            });
        }
    }

    /// [`Finder::search`] over selector text.
    pub fn query(&self, context: Option<T::Node>, selector: &str) -> Vec<T::Node> {
        self.search(context, &parse_selector_list(selector))
    }

    /// [`Finder::find`] over selector text.
    pub fn query_one(&self, context: Option<T::Node>, selector: &str) -> Option<T::Node> {
        self.find(context, &parse_selector_list(selector))
    }

    /// [`Finder::matches`] over selector text.
    pub fn is_match(&self, node: T::Node, selector: &str) -> bool {
        self.matches(node, &parse_selector_list(selector))
    }

    /// Try the host's bulk query. Returns false when the manual path must run.
    fn search_native(&self, context: T::Node, expression: &Expression, sink: &mut Collector<'_, T::Node>) -> bool {
        if !self.supports(Feature::QuerySelector) {
            return false;
        }
        let text = expression.to_string();
        if self.failures.is_failed(Acceleration::QuerySelectorAll, &text) {
            return false;
        }
        if expression.has_wildcard() && !self.supports(Feature::StarQuerySelector) {
            return false;
        }

        let outcome = if context == self.tree.root() {
            if expression.scope != Combinator::Descendant {
                return false;
            }
            self.tree.query_selector_all(context, &text)
        } else {
            if !self.options.scoped_native_queries {
                return false;
            }
            let Some(outcome) = self.scoped_query(context, expression) else {
                return false;
            };
            outcome
        };

        match outcome {
            Ok(nodes) => {
                for node in nodes {
                    if self.tree.is_element(node) {
                        sink.push(node, || self.uid(node));
                    }
                }
                true
            }
            Err(err) => {
                self.record_failure(Acceleration::QuerySelectorAll, &text, &err);
                false
            }
        }
    }

    /// Native query anchored to a non-root context through a marker
    /// attribute. `None` when the marker could not be used. A context that
    /// already carries the attribute is left alone; a marker the engine
    /// placed is removed in every case.
    fn scoped_query(&self, context: T::Node, expression: &Expression) -> Option<Result<Vec<T::Node>>> {
        let query_root = if expression.scope.is_sibling() {
            self.tree.parent(context)?
        } else {
            context
        };
        if self.tree.has_attribute(context, SCOPE_ATTRIBUTE) {
            debug!(target: "finder::search", "context already carries `{SCOPE_ATTRIBUTE}`");
            return None;
        }
        let marker = self.fresh_token().to_string();
        if let Err(err) = self.tree.set_attribute(context, SCOPE_ATTRIBUTE, &marker) {
            debug!(target: "finder::search", "cannot place scope marker: {err}");
            return None;
        }
        let scoped = format!("[{SCOPE_ATTRIBUTE}={}] {expression}", escape_string(&marker));
        let outcome = self
            .tree
            .query_selector_all(query_root, &scoped)
            .with_context(|| format!("scoped query `{scoped}`"));
        if let Err(err) = self.tree.remove_attribute(context, SCOPE_ATTRIBUTE) {
            warn!(target: "finder::search", "cannot remove scope marker: {err}");
        }
        Some(outcome)
    }

    /// Seed and validate.
    fn search_manual(&self, context: T::Node, expression: &Expression, sink: &mut Collector<'_, T::Node>) {
        let Some(last) = expression.last() else {
            return;
        };
        let seed_root = if expression.scope.is_sibling() {
            let Some(parent) = self.tree.parent(context) else {
                return;
            };
            parent
        } else {
            context
        };
        let seeds = self.seed(seed_root, last);
        let unmatched = seeds.redundant.covers(last);
        let start = expression.compounds.len().checked_sub(2);

        for node in seeds.nodes {
            if sink.was_collected(|| self.uid(node)) {
                continue;
            }
            if !unmatched && !self.match_compound(node, last, seeds.redundant) {
                continue;
            }
            if self.validate(context, node, start, expression) {
                sink.push(node, || self.uid(node));
            }
        }
    }
}
