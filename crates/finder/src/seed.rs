//! Seed selection for the rightmost compound.

use crate::adapter::{TreeAdapter, descendants};
use crate::capability::Feature;
use crate::finder::Finder;
use crate::matcher::Redundant;
use css_selectors::Compound;
use log::trace;

/// Candidate nodes for a compound, and the criteria their lookup guarantees.
#[derive(Debug)]
pub struct Seeds<N> {
    pub nodes: Vec<N>,
    pub redundant: Redundant,
}

impl<T: TreeAdapter> Finder<'_, T> {
    /// Smallest correct candidate set for `compound` below `root`.
    ///
    /// Tries an id lookup, then a class lookup, then a tag lookup (native or
    /// a manual pre-order walk). Native errors fall through to the next
    /// strategy. Candidates are always elements.
    ///
    /// The id lookup yields at most one node, the one the host's
    /// `element_by_id` reports. When a tree reuses an id, the other
    /// elements carrying it are only found by the native query and manual
    /// paths.
    pub fn seed(&self, root: T::Node, compound: &Compound) -> Seeds<T::Node> {
        let wildcard = compound.is_wildcard();

        if let Some(id) = &compound.id
            && self.supports(Feature::ElementById)
        {
            match self.tree.element_by_id(root, id) {
                Ok(None) => {
                    return self.seeds(Vec::new(), Redundant { tag: wildcard, id: true, classes: false });
                }
                Ok(Some(found))
                    if self.get_attribute(found, "id").as_deref() == Some(id.as_str())
                        && (root == self.tree.root() || self.tree.contains(root, found)) =>
                {
                    return self.seeds(vec![found], Redundant { tag: wildcard, id: true, classes: false });
                }
                Ok(Some(_)) => trace!(target: "finder::search", "id lookup for `{id}` rejected"),
                Err(err) => trace!(target: "finder::search", "id lookup failed: {err}"),
            }
        }

        if !compound.classes.is_empty() && self.supports(Feature::ElementsByClassName) {
            match self.tree.elements_by_class_name(root, &compound.classes) {
                Ok(nodes) => {
                    return self.seeds(nodes, Redundant { tag: wildcard, id: false, classes: true });
                }
                Err(err) => trace!(target: "finder::search", "class lookup failed: {err}"),
            }
        }

        let tag = compound.tag.as_deref().unwrap_or("*");
        let tag_redundant = tag != "*";
        if self.supports(Feature::ElementsByTagName) {
            match self.tree.elements_by_tag_name(root, tag) {
                Ok(nodes) => {
                    return self.seeds(nodes, Redundant { tag: tag_redundant, id: false, classes: false });
                }
                Err(err) => trace!(target: "finder::search", "tag lookup failed: {err}"),
            }
        }

        let nodes = descendants(self.tree, root)
            .into_iter()
            .filter(|&node| !tag_redundant || self.tree.node_name(node).eq_ignore_ascii_case(tag))
            .collect();
        self.seeds(nodes, Redundant { tag: tag_redundant, id: false, classes: false })
    }

    fn seeds(&self, mut nodes: Vec<T::Node>, redundant: Redundant) -> Seeds<T::Node> {
        nodes.retain(|&node| self.tree.is_element(node));
        Seeds { nodes, redundant }
    }
}
