//! The document tree and its builder API.

use crate::profile::HostProfile;
use anyhow::{Result, anyhow, bail};
use core::cell::{Cell, RefCell};
use core::cmp::Ordering;
use indextree::{Arena, Node as ArenaNode, NodeId};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
pub enum DomKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: DomKind,
    pub attrs: SmallVec<(String, String), 4>,
}

impl DomNode {
    fn element(tag: &str) -> Self {
        Self {
            kind: DomKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            attrs: SmallVec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub const fn is_element(&self) -> bool {
        matches!(self.kind, DomKind::Element { .. })
    }
}

/// An ordered, attributed tree.
///
/// The arena sits behind a `RefCell` so nodes can be created and attached
/// through `&self`, which is what the engine's scratch-node probes need.
#[derive(Debug)]
pub struct Document {
    arena: RefCell<Arena<DomNode>>,
    root: NodeId,
    active: Cell<Option<NodeId>>,
    profile: HostProfile,
    native_queries: Cell<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with every primitive working.
    pub fn new() -> Self {
        Self::with_profile(HostProfile::default())
    }

    /// An empty document imitating `profile`.
    pub fn with_profile(profile: HostProfile) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::default());
        Self {
            arena: RefCell::new(arena),
            root,
            active: Cell::new(None),
            profile,
            native_queries: Cell::new(0),
        }
    }

    /// A tree whose root is an element rather than a document node.
    pub fn fragment(tag: &str) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::element(tag));
        Self {
            arena: RefCell::new(arena),
            root,
            active: Cell::new(None),
            profile: HostProfile::default(),
            native_queries: Cell::new(0),
        }
    }

    #[inline]
    pub const fn root_id(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub const fn profile(&self) -> &HostProfile {
        &self.profile
    }

    /// Number of native bulk queries run so far.
    #[inline]
    pub fn native_query_count(&self) -> usize {
        self.native_queries.get()
    }

    pub(crate) fn count_native_query(&self) {
        self.native_queries.set(self.native_queries.get().saturating_add(1));
    }

    /// Give input focus to `node`.
    pub fn focus(&self, node: Option<NodeId>) {
        self.active.set(node);
    }

    pub(crate) fn focused(&self) -> Option<NodeId> {
        self.active.get()
    }

    /// Append a new element under `parent`.
    ///
    /// # Errors
    /// When `parent` cannot take children.
    pub fn element(&self, parent: NodeId, tag: &str) -> Result<NodeId> {
        self.element_with(parent, tag, &[])
    }

    /// Append a new element with attributes under `parent`.
    ///
    /// # Errors
    /// When `parent` cannot take children.
    pub fn element_with(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> Result<NodeId> {
        let mut node = DomNode::element(tag);
        node.attrs
            .extend(attrs.iter().map(|&(name, value)| (name.to_owned(), value.to_owned())));
        let id = self.arena.borrow_mut().new_node(node);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Append a text node under `parent`.
    ///
    /// # Errors
    /// When `parent` cannot take children.
    pub fn text_node(&self, parent: NodeId, text: &str) -> Result<NodeId> {
        let id = self.new_text(text);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Append a comment under `parent`.
    ///
    /// # Errors
    /// When `parent` cannot take children.
    pub fn comment_node(&self, parent: NodeId, text: &str) -> Result<NodeId> {
        let id = self.arena.borrow_mut().new_node(DomNode {
            kind: DomKind::Comment {
                text: text.to_owned(),
            },
            attrs: SmallVec::new(),
        });
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Set or replace an attribute.
    ///
    /// # Errors
    /// When `node` is not an element.
    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        let Some(data) = arena.get_mut(node).map(ArenaNode::get_mut) else {
            bail!("unknown node {node:?}");
        };
        if !data.is_element() {
            bail!("attributes can only be set on elements");
        }
        if let Some(slot) = data
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            value.clone_into(&mut slot.1);
        } else {
            data.attrs.push((name.to_owned(), value.to_owned()));
        }
        Ok(())
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&self, node: NodeId, name: &str) {
        if let Some(entry) = self.arena.borrow_mut().get_mut(node) {
            entry.get_mut().attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        }
    }

    /// Detach `node` and its subtree from the tree.
    pub fn detach_node(&self, node: NodeId) {
        node.detach(&mut self.arena.borrow_mut());
    }

    pub(crate) fn new_element(&self, tag: &str) -> NodeId {
        self.arena.borrow_mut().new_node(DomNode::element(tag))
    }

    pub(crate) fn new_text(&self, text: &str) -> NodeId {
        self.arena.borrow_mut().new_node(DomNode {
            kind: DomKind::Text {
                text: text.to_owned(),
            },
            attrs: SmallVec::new(),
        })
    }

    pub(crate) fn attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        let accepts_children = arena
            .get(parent)
            .is_some_and(|entry| matches!(entry.get().kind, DomKind::Document | DomKind::Element { .. }));
        if !accepts_children {
            bail!("node {parent:?} cannot have children");
        }
        parent
            .checked_append(child, &mut arena)
            .map_err(|err| anyhow!("cannot append {child:?} to {parent:?}: {err:?}"))
    }

    /// Run `read` on the data of `node`.
    pub(crate) fn with_node<R>(&self, node: NodeId, read: impl FnOnce(&DomNode) -> R) -> Option<R> {
        self.arena.borrow().get(node).map(|entry| read(entry.get()))
    }

    /// Run `step` on the arena entry of `node`, for navigation.
    pub(crate) fn link(&self, node: NodeId, step: impl FnOnce(&ArenaNode<DomNode>) -> Option<NodeId>) -> Option<NodeId> {
        self.arena.borrow().get(node).and_then(step)
    }

    /// Every strict descendant of `node` in document order.
    pub(crate) fn descendants_of(&self, node: NodeId) -> Vec<NodeId> {
        node.descendants(&self.arena.borrow()).skip(1).collect()
    }

    /// Document-order comparison through ancestor paths.
    pub(crate) fn order(&self, first: NodeId, second: NodeId) -> Ordering {
        if first == second {
            return Ordering::Equal;
        }
        let (first_top, first_path) = self.path(first);
        let (second_top, second_path) = self.path(second);
        first_top
            .cmp(&second_top)
            .then_with(|| first_path.cmp(&second_path))
    }

    /// Topmost ancestor of `node` and the child indices leading down to it.
    fn path(&self, node: NodeId) -> (NodeId, Vec<usize>) {
        let arena = self.arena.borrow();
        let mut indices = Vec::new();
        let mut top = node;
        for ancestor in node.ancestors(&arena) {
            top = ancestor;
            if arena.get(ancestor).and_then(ArenaNode::parent).is_some() {
                indices.push(ancestor.preceding_siblings(&arena).skip(1).count());
            }
        }
        indices.reverse();
        (top, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _init = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn order_follows_tree_positions() -> Result<()> {
        init_logging();
        let doc = Document::new();
        let html = doc.element(doc.root_id(), "html")?;
        let head = doc.element(html, "head")?;
        let title = doc.element(head, "title")?;
        let body = doc.element(html, "body")?;
        assert_eq!(doc.order(html, title), Ordering::Less);
        assert_eq!(doc.order(body, title), Ordering::Greater);
        assert_eq!(doc.order(head, body), Ordering::Less);
        assert_eq!(doc.order(body, body), Ordering::Equal);
        Ok(())
    }

    #[test]
    fn attributes_replace_and_remove() -> Result<()> {
        init_logging();
        let doc = Document::new();
        let node = doc.element_with(doc.root_id(), "div", &[("ID", "x")])?;
        doc.set_attr(node, "id", "y")?;
        assert_eq!(doc.with_node(node, |data| data.attrs.len()), Some(1));
        assert_eq!(doc.with_node(node, |data| data.attr("id").map(ToOwned::to_owned)).flatten().as_deref(), Some("y"));
        doc.remove_attr(node, "Id");
        assert_eq!(doc.with_node(node, |data| data.attrs.is_empty()), Some(true));
        Ok(())
    }

    #[test]
    fn text_cannot_take_children() -> Result<()> {
        init_logging();
        let doc = Document::new();
        let text = doc.text_node(doc.root_id(), "hi")?;
        assert!(doc.element(text, "b").is_err());
        assert!(doc.set_attr(text, "id", "x").is_err());
        Ok(())
    }
}
