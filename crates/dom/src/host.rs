//! [`TreeAdapter`] implementation, including the optional host primitives
//! shaped by the document's [`HostProfile`](crate::HostProfile).

use crate::document::{Document, DomKind};
use crate::profile::Primitive;
use anyhow::{Result, bail};
use core::cmp::Ordering;
use css_selectors::has_token;
use finder::{NodeKind, TreeAdapter};
use indextree::{Node as ArenaNode, NodeId};

impl Document {
    fn ensure_mutable(&self) -> Result<()> {
        if !self.profile().mutable {
            bail!("document is read-only");
        }
        Ok(())
    }

    fn element_descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants_of(root)
            .into_iter()
            .filter(|&node| self.is_element(node))
            .collect()
    }

    fn attr_of(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_node(node, |data| data.attr(name).map(ToOwned::to_owned))
            .flatten()
    }

    /// A form control below `form` whose id or name is `name`.
    fn shadowing_control(&self, form: NodeId, name: &str) -> Option<String> {
        self.element_descendants(form).into_iter().find_map(|control| {
            let shadows = self.attr_of(control, "id").as_deref() == Some(name)
                || self.attr_of(control, "name").as_deref() == Some(name);
            shadows.then(|| format!("[object {}]", self.node_name(control)))
        })
    }
}

impl TreeAdapter for Document {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root_id()
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.with_node(node, |data| match data.kind {
            DomKind::Document => NodeKind::Document,
            DomKind::Element { .. } => NodeKind::Element,
            DomKind::Text { .. } => NodeKind::Text,
            DomKind::Comment { .. } => NodeKind::Comment,
        })
        .unwrap_or(NodeKind::Other)
    }

    fn node_name(&self, node: NodeId) -> String {
        self.with_node(node, |data| match &data.kind {
            DomKind::Document => "#document".to_owned(),
            DomKind::Element { tag } => tag.clone(),
            DomKind::Text { .. } => "#text".to_owned(),
            DomKind::Comment { .. } => "#comment".to_owned(),
        })
        .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.link(node, ArenaNode::parent)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.link(node, ArenaNode::previous_sibling)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.link(node, ArenaNode::next_sibling)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.link(node, ArenaNode::first_child)
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        if self.profile().form_getter_shadowed
            && self.node_name(node) == "form"
            && let Some(control) = self.shadowing_control(node, name)
        {
            return Some(control);
        }
        self.attr_of(node, name)
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.with_node(node, |data| data.attr(name).is_some())
            .unwrap_or(false)
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |data| match &data.kind {
            DomKind::Text { text } => Some(text.clone()),
            _ => None,
        })
        .flatten()
    }

    fn compare_document_position(&self, first: NodeId, second: NodeId) -> Option<Ordering> {
        self.profile()
            .document_order
            .then(|| self.order(first, second))
    }

    fn active_element(&self) -> Option<NodeId> {
        self.focused()
    }

    fn attribute_node_value(&self, node: NodeId, name: &str) -> Option<String> {
        self.attr_of(node, name)
    }

    fn element_by_id(&self, root: NodeId, id: &str) -> Result<Option<NodeId>> {
        let also_name = match self.profile().id_lookup {
            Primitive::Absent => bail!("element_by_id is not available"),
            Primitive::Working => false,
            Primitive::Degraded => true,
        };
        Ok(self.element_descendants(root).into_iter().find(|&node| {
            self.attr_of(node, "id").as_deref() == Some(id)
                || (also_name && self.attr_of(node, "name").as_deref() == Some(id))
        }))
    }

    fn elements_by_class_name(&self, root: NodeId, classes: &[String]) -> Result<Vec<NodeId>> {
        let first_token_only = match self.profile().class_lookup {
            Primitive::Absent => bail!("elements_by_class_name is not available"),
            Primitive::Working => false,
            Primitive::Degraded => true,
        };
        Ok(self
            .element_descendants(root)
            .into_iter()
            .filter(|&node| {
                self.attr_of(node, "class").is_some_and(|list| {
                    classes.iter().all(|class| {
                        if first_token_only {
                            list.split_whitespace().next() == Some(class.as_str())
                        } else {
                            has_token(&list, class)
                        }
                    })
                })
            })
            .collect())
    }

    fn elements_by_tag_name(&self, root: NodeId, tag: &str) -> Result<Vec<NodeId>> {
        let leaks = match self.profile().tag_lookup {
            Primitive::Absent => bail!("elements_by_tag_name is not available"),
            Primitive::Working => false,
            Primitive::Degraded => true,
        };
        if tag == "*" {
            return Ok(if leaks {
                self.descendants_of(root)
            } else {
                self.element_descendants(root)
            });
        }
        Ok(self
            .element_descendants(root)
            .into_iter()
            .filter(|&node| self.node_name(node).eq_ignore_ascii_case(tag))
            .collect())
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        if self.profile().bulk_query == Primitive::Absent {
            bail!("query_selector_all is not available");
        }
        self.native_query_all(root, selector)
    }

    fn matches_selector(&self, node: NodeId, selector: &str) -> Result<bool> {
        if self.profile().single_match == Primitive::Absent {
            bail!("matches_selector is not available");
        }
        self.native_matches(node, selector)
    }

    fn create_element(&self, tag: &str) -> Result<NodeId> {
        self.ensure_mutable()?;
        Ok(self.new_element(tag))
    }

    fn create_text(&self, data: &str) -> Result<NodeId> {
        self.ensure_mutable()?;
        Ok(self.new_text(data))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_mutable()?;
        self.attach(parent, child)
    }

    fn detach(&self, node: NodeId) -> Result<()> {
        self.ensure_mutable()?;
        self.detach_node(node);
        Ok(())
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.ensure_mutable()?;
        self.set_attr(node, name, value)
    }

    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<()> {
        self.ensure_mutable()?;
        self.remove_attr(node, name);
        Ok(())
    }
}
