//! The document's own selector engine, backing its bulk query and single
//! match primitives.
//!
//! It reads standard selectors only: tag, id, class and attribute tests, the
//! four combinators and the structural and form-state pseudo-classes.
//! Anything else is rejected with an error, the way a host rejects a
//! selector it cannot parse.

use crate::document::{Document, DomKind};
use crate::profile::Primitive;
use anyhow::{Result, bail};
use css_selectors::{AttrOperator, Combinator, Compound, Expression, PseudoTest, SelectorList, has_token, parse_selector_list};
use indextree::{Node as ArenaNode, NodeId};
use log::debug;

const STANDARD_PSEUDOS: [&str; 11] = [
    "first-child",
    "last-child",
    "only-child",
    "first-of-type",
    "last-of-type",
    "only-of-type",
    "empty",
    "root",
    "enabled",
    "disabled",
    "checked",
];

/// Quirks the native engine imitates.
#[derive(Clone, Copy, Debug, Default)]
struct Quirks {
    ghosts: bool,
    ignore_class_case: bool,
    accept_unknown_pseudos: bool,
}

impl Document {
    /// Parse `selector` the way a strict host would.
    fn parse_native(&self, selector: &str, quirks: Quirks) -> Result<SelectorList> {
        let list = parse_selector_list(selector);
        if list.is_empty() {
            bail!("`{selector}` is not a valid selector");
        }
        for expression in &list.expressions {
            if expression.scope != Combinator::Descendant {
                bail!("relative selector `{expression}` is not supported");
            }
            for compound in &expression.compounds {
                if let Some(attr) = compound
                    .attributes
                    .iter()
                    .find(|attr| matches!(attr.operator, AttrOperator::Other(_)))
                {
                    bail!("unknown attribute operator `{}`", attr.operator.token());
                }
                if !quirks.accept_unknown_pseudos
                    && let Some(pseudo) = compound
                        .pseudos
                        .iter()
                        .find(|pseudo| !STANDARD_PSEUDOS.contains(&pseudo.name.as_str()))
                {
                    bail!("unsupported pseudo-class `:{}`", pseudo.name);
                }
            }
        }
        Ok(list)
    }

    /// Bulk query over the descendants of `root`.
    pub(crate) fn native_query_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        self.count_native_query();
        let quirks = Quirks {
            ghosts: self.profile().bulk_query == Primitive::Degraded,
            ignore_class_case: self.profile().bulk_query_ignores_class_case,
            accept_unknown_pseudos: false,
        };
        let list = self.parse_native(selector, quirks).inspect_err(|err| {
            debug!(target: "dom::native", "query rejected: {err}");
        })?;
        let ghosts = quirks.ghosts && list.expressions.iter().any(Expression::has_wildcard);
        Ok(self
            .descendants_of(root)
            .into_iter()
            .filter(|&node| {
                if self.is_element_node(node) {
                    list.expressions
                        .iter()
                        .any(|expression| self.matches_expression(node, expression, quirks))
                } else {
                    ghosts
                }
            })
            .collect())
    }

    /// Single match of `node`.
    pub(crate) fn native_matches(&self, node: NodeId, selector: &str) -> Result<bool> {
        let quirks = Quirks {
            accept_unknown_pseudos: self.profile().single_match == Primitive::Degraded,
            ..Quirks::default()
        };
        let list = self.parse_native(selector, quirks).inspect_err(|err| {
            debug!(target: "dom::native", "match rejected: {err}");
        })?;
        Ok(self.is_element_node(node)
            && list
                .expressions
                .iter()
                .any(|expression| self.matches_expression(node, expression, quirks)))
    }

    fn is_element_node(&self, node: NodeId) -> bool {
        self.with_node(node, |data| data.is_element()).unwrap_or(false)
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.link(node, ArenaNode::parent)
            .filter(|&parent| self.is_element_node(parent))
    }

    fn previous_element(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.link(node, ArenaNode::previous_sibling);
        while let Some(sibling) = current {
            if self.is_element_node(sibling) {
                return Some(sibling);
            }
            current = self.link(sibling, ArenaNode::previous_sibling);
        }
        None
    }

    fn next_element(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.link(node, ArenaNode::next_sibling);
        while let Some(sibling) = current {
            if self.is_element_node(sibling) {
                return Some(sibling);
            }
            current = self.link(sibling, ArenaNode::next_sibling);
        }
        None
    }

    /// Right-to-left match of a whole expression ending at `node`.
    fn matches_expression(&self, node: NodeId, expression: &Expression, quirks: Quirks) -> bool {
        expression
            .compounds
            .len()
            .checked_sub(1)
            .is_some_and(|last| self.matches_from(node, expression, last, quirks))
    }

    fn matches_from(&self, node: NodeId, expression: &Expression, index: usize, quirks: Quirks) -> bool {
        let Some(compound) = expression.compounds.get(index) else {
            return false;
        };
        if !self.matches_compound(node, compound, quirks) {
            return false;
        }
        let Some(previous) = index.checked_sub(1) else {
            return true;
        };
        let recurse = |candidate: NodeId| self.matches_from(candidate, expression, previous, quirks);
        match expression.combinator_after(previous) {
            Combinator::Descendant => {
                let mut current = self.parent_element(node);
                while let Some(ancestor) = current {
                    if recurse(ancestor) {
                        return true;
                    }
                    current = self.parent_element(ancestor);
                }
                false
            }
            Combinator::Child => self.parent_element(node).is_some_and(recurse),
            Combinator::AdjacentSibling => self.previous_element(node).is_some_and(recurse),
            Combinator::GeneralSibling => {
                let mut current = self.previous_element(node);
                while let Some(sibling) = current {
                    if recurse(sibling) {
                        return true;
                    }
                    current = self.previous_element(sibling);
                }
                false
            }
        }
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound, quirks: Quirks) -> bool {
        let simple_ok = self
            .with_node(node, |data| {
                let DomKind::Element { tag } = &data.kind else {
                    return false;
                };
                let tag_ok = compound
                    .tag
                    .as_deref()
                    .is_none_or(|wanted| wanted == "*" || wanted.eq_ignore_ascii_case(tag));
                let id_ok = compound
                    .id
                    .as_deref()
                    .is_none_or(|wanted| data.attr("id") == Some(wanted));
                let classes_ok = compound.classes.is_empty()
                    || data.attr("class").is_some_and(|list| {
                        compound.classes.iter().all(|class| {
                            if quirks.ignore_class_case {
                                list.split_whitespace()
                                    .any(|token| token.eq_ignore_ascii_case(class))
                            } else {
                                has_token(list, class)
                            }
                        })
                    });
                let attrs_ok = compound
                    .attributes
                    .iter()
                    .all(|test| test.test(data.attr(&test.name)));
                tag_ok && id_ok && classes_ok && attrs_ok
            })
            .unwrap_or(false);
        simple_ok
            && compound
                .pseudos
                .iter()
                .all(|pseudo| self.matches_pseudo(node, pseudo, quirks))
    }

    fn matches_pseudo(&self, node: NodeId, pseudo: &PseudoTest, quirks: Quirks) -> bool {
        let has = |name: &str| {
            self.with_node(node, |data| data.attr(name).is_some())
                .unwrap_or(false)
        };
        let tag = || {
            self.with_node(node, |data| match &data.kind {
                DomKind::Element { tag } => tag.clone(),
                _ => String::new(),
            })
            .unwrap_or_default()
        };
        let same_type = |sibling: NodeId| {
            self.with_node(sibling, |data| matches!(&data.kind, DomKind::Element { tag: other } if *other == tag()))
                .unwrap_or(false)
        };
        let sibling_of_type = |step: fn(&Self, NodeId) -> Option<NodeId>| {
            let mut current = step(self, node);
            while let Some(sibling) = current {
                if same_type(sibling) {
                    return true;
                }
                current = step(self, sibling);
            }
            false
        };
        match pseudo.name.as_str() {
            "first-child" => self.previous_element(node).is_none(),
            "last-child" => self.next_element(node).is_none(),
            "only-child" => self.previous_element(node).is_none() && self.next_element(node).is_none(),
            "first-of-type" => !sibling_of_type(Self::previous_element),
            "last-of-type" => !sibling_of_type(Self::next_element),
            "only-of-type" => {
                !sibling_of_type(Self::previous_element) && !sibling_of_type(Self::next_element)
            }
            "empty" => self.descendants_of(node).iter().all(|&child| {
                self.with_node(child, |data| match &data.kind {
                    DomKind::Text { text } => text.is_empty(),
                    DomKind::Comment { .. } => true,
                    DomKind::Document | DomKind::Element { .. } => false,
                })
                .unwrap_or(true)
            }),
            "root" => {
                self.link(node, ArenaNode::parent) == Some(self.root_id())
                    && self.previous_element(node).is_none()
            }
            "enabled" => !has("disabled"),
            "disabled" => has("disabled"),
            "checked" => has("checked") || has("selected"),
            _ => quirks.accept_unknown_pseudos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::HostProfile;
    use finder::TreeAdapter;

    fn list_document(profile: HostProfile) -> Result<(Document, Vec<NodeId>)> {
        let _init = env_logger::builder().is_test(true).try_init();
        let doc = Document::with_profile(profile);
        let list = doc.element_with(doc.root_id(), "ul", &[("class", "Menu")])?;
        let mut items = Vec::new();
        for class in ["a", "b", "a b"] {
            items.push(doc.element_with(list, "li", &[("class", class)])?);
            doc.text_node(list, " ")?;
        }
        Ok((doc, items))
    }

    #[test]
    fn query_returns_elements_in_document_order() -> Result<()> {
        let (doc, items) = list_document(HostProfile::default())?;
        assert_eq!(doc.query_selector_all(doc.root_id(), "li.a")?, [items[0], items[2]]);
        assert_eq!(doc.query_selector_all(doc.root_id(), "ul > li + li")?, items[1..]);
        assert_eq!(doc.query_selector_all(doc.root_id(), "li:last-child")?, [items[2]]);
        assert_eq!(doc.native_query_count(), 3);
        Ok(())
    }

    #[test]
    fn non_standard_selectors_are_rejected() -> Result<()> {
        let (doc, items) = list_document(HostProfile::default())?;
        assert!(doc.query_selector_all(doc.root_id(), "li:contains(x)").is_err());
        assert!(doc.query_selector_all(doc.root_id(), "> li").is_err());
        assert!(doc.query_selector_all(doc.root_id(), "[class!=a]").is_err());
        assert!(doc.query_selector_all(doc.root_id(), "").is_err());
        assert!(doc.matches_selector(items[0], ":made-up").is_err());
        Ok(())
    }

    #[test]
    fn quirks_are_imitated() -> Result<()> {
        let (doc, items) = list_document(HostProfile::quirky())?;
        assert_eq!(doc.query_selector_all(doc.root_id(), ".menu")?.len(), 1);
        let everything = doc.query_selector_all(doc.root_id(), "*")?;
        assert!(everything.iter().any(|&node| !doc.is_element(node)));
        assert!(doc.matches_selector(items[0], ":made-up")?);
        Ok(())
    }
}
