//! The host tree abstraction the engine walks.
//!
//! Hosts implement the navigation and attribute reads; everything else has a
//! default. The optional bulk primitives and the scratch-node mutation
//! primitives default to an "unsupported" error, so a host that implements
//! none of them still works through pure tree navigation.

use anyhow::{Result, bail};
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::Hash;

/// Coarse node classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    Other,
}

/// An adapter that abstracts tree access for selector search.
/// Implement this for your DOM layer.
pub trait TreeAdapter {
    /// Opaque node handle.
    type Node: Copy + Eq + Hash + Debug;

    /// The document node of this tree.
    fn root(&self) -> Self::Node;

    fn node_kind(&self, node: Self::Node) -> NodeKind;

    /// Node name as stored by the host (tag name for elements). Compared
    /// case-insensitively.
    fn node_name(&self, node: Self::Node) -> String;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// Generic attribute getter. `None` when the attribute is absent.
    fn get_attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    fn has_attribute(&self, node: Self::Node, name: &str) -> bool;

    /// Character data of a text node; `None` for every other kind.
    fn text(&self, node: Self::Node) -> Option<String>;

    #[inline]
    fn is_element(&self, node: Self::Node) -> bool {
        self.node_kind(node) == NodeKind::Element
    }

    /// First element child of the root.
    fn document_element(&self) -> Option<Self::Node> {
        let mut child = self.first_child(self.root());
        while let Some(current) = child {
            if self.is_element(current) {
                return Some(current);
            }
            child = self.next_sibling(current);
        }
        None
    }

    /// True when `node` is a strict descendant of `ancestor`.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Concatenated character data of every descendant text node.
    fn text_content(&self, node: Self::Node) -> String {
        let mut out = String::new();
        if let Some(data) = self.text(node) {
            out.push_str(&data);
            return out;
        }
        let mut stack = Vec::new();
        if let Some(first) = self.first_child(node) {
            stack.push(first);
        }
        while let Some(current) = stack.pop() {
            if let Some(next) = self.next_sibling(current) {
                stack.push(next);
            }
            if let Some(data) = self.text(current) {
                out.push_str(&data);
            } else if let Some(child) = self.first_child(current) {
                stack.push(child);
            }
        }
        out
    }

    /// Document-order comparison; `None` when the host has no comparator.
    fn compare_document_position(&self, _first: Self::Node, _second: Self::Node) -> Option<Ordering> {
        None
    }

    /// Node holding input focus, if the host tracks one.
    fn active_element(&self) -> Option<Self::Node> {
        None
    }

    /// Alternate attribute read path that bypasses any shadowing the generic
    /// getter suffers from (such as form controls named like attributes).
    fn attribute_node_value(&self, node: Self::Node, name: &str) -> Option<String> {
        self.get_attribute(node, name)
    }

    fn is_disabled(&self, node: Self::Node) -> bool {
        self.has_attribute(node, "disabled")
    }

    fn is_checked(&self, node: Self::Node) -> bool {
        self.has_attribute(node, "checked")
    }

    fn is_selected(&self, node: Self::Node) -> bool {
        self.has_attribute(node, "selected")
    }

    /// Native lookup of the element with the given id below `root`.
    ///
    /// # Errors
    /// When the host has no such primitive or the lookup fails.
    fn element_by_id(&self, _root: Self::Node, _id: &str) -> Result<Option<Self::Node>> {
        bail!("element_by_id is not supported by this host")
    }

    /// Native lookup of elements carrying every class in `classes`.
    ///
    /// # Errors
    /// When the host has no such primitive or the lookup fails.
    fn elements_by_class_name(&self, _root: Self::Node, _classes: &[String]) -> Result<Vec<Self::Node>> {
        bail!("elements_by_class_name is not supported by this host")
    }

    /// Native lookup of descendants by tag name; `*` means every element.
    ///
    /// # Errors
    /// When the host has no such primitive or the lookup fails.
    fn elements_by_tag_name(&self, _root: Self::Node, _tag: &str) -> Result<Vec<Self::Node>> {
        bail!("elements_by_tag_name is not supported by this host")
    }

    /// Native bulk query of `selector` over the descendants of `root`.
    ///
    /// # Errors
    /// When the host has no such primitive or rejects the selector.
    fn query_selector_all(&self, _root: Self::Node, _selector: &str) -> Result<Vec<Self::Node>> {
        bail!("query_selector_all is not supported by this host")
    }

    /// Native single match of `node` against `selector`.
    ///
    /// # Errors
    /// When the host has no such primitive or rejects the selector.
    fn matches_selector(&self, _node: Self::Node, _selector: &str) -> Result<bool> {
        bail!("matches_selector is not supported by this host")
    }

    /// Create a detached element.
    ///
    /// # Errors
    /// When the host does not allow mutation.
    fn create_element(&self, _tag: &str) -> Result<Self::Node> {
        bail!("create_element is not supported by this host")
    }

    /// Create a detached text node.
    ///
    /// # Errors
    /// When the host does not allow mutation.
    fn create_text(&self, _data: &str) -> Result<Self::Node> {
        bail!("create_text is not supported by this host")
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// # Errors
    /// When the host does not allow mutation.
    fn append_child(&self, _parent: Self::Node, _child: Self::Node) -> Result<()> {
        bail!("append_child is not supported by this host")
    }

    /// Detach `node` (and its subtree) from its parent.
    ///
    /// # Errors
    /// When the host does not allow mutation.
    fn detach(&self, _node: Self::Node) -> Result<()> {
        bail!("detach is not supported by this host")
    }

    /// Set or replace an attribute.
    ///
    /// # Errors
    /// When the host does not allow mutation.
    fn set_attribute(&self, _node: Self::Node, _name: &str, _value: &str) -> Result<()> {
        bail!("set_attribute is not supported by this host")
    }

    /// Remove an attribute if present.
    ///
    /// # Errors
    /// When the host does not allow mutation.
    fn remove_attribute(&self, _node: Self::Node, _name: &str) -> Result<()> {
        bail!("remove_attribute is not supported by this host")
    }
}

/// Previous sibling that is an element.
pub(crate) fn previous_element_sibling<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<T::Node> {
    let mut current = tree.previous_sibling(node);
    while let Some(sibling) = current {
        if tree.is_element(sibling) {
            return Some(sibling);
        }
        current = tree.previous_sibling(sibling);
    }
    None
}

/// Next sibling that is an element.
pub(crate) fn next_element_sibling<T: TreeAdapter>(tree: &T, node: T::Node) -> Option<T::Node> {
    let mut current = tree.next_sibling(node);
    while let Some(sibling) = current {
        if tree.is_element(sibling) {
            return Some(sibling);
        }
        current = tree.next_sibling(sibling);
    }
    None
}

/// Pre-order list of every strict descendant of `root`.
pub(crate) fn descendants<T: TreeAdapter>(tree: &T, root: T::Node) -> Vec<T::Node> {
    let mut out = Vec::new();
    let mut stack = Vec::new();
    if let Some(first) = tree.first_child(root) {
        stack.push(first);
    }
    while let Some(current) = stack.pop() {
        out.push(current);
        if let Some(next) = tree.next_sibling(current) {
            stack.push(next);
        }
        if let Some(child) = tree.first_child(current) {
            stack.push(child);
        }
    }
    out
}
