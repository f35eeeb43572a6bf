//! Compound matching: every predicate of one compound against one node.

use crate::adapter::TreeAdapter;
use crate::capability::Feature;
use crate::failures::Acceleration;
use crate::finder::Finder;
use css_selectors::{AttrOperator, Compound, has_token};

/// Criteria a seed lookup already guarantees, so the matcher can skip them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Redundant {
    pub tag: bool,
    pub id: bool,
    pub classes: bool,
}

impl Redundant {
    /// True when the lookup guaranteed everything `compound` asks for, so
    /// candidates need no matching at all.
    pub fn covers(self, compound: &Compound) -> bool {
        (compound.tag.is_none() || self.tag)
            && (compound.id.is_none() || self.id)
            && (compound.classes.is_empty() || self.classes)
            && compound.attributes.is_empty()
            && compound.pseudos.is_empty()
    }
}

impl<T: TreeAdapter> Finder<'_, T> {
    /// Test `node` against `compound`, skipping the `redundant` criteria.
    pub fn match_compound(&self, node: T::Node, compound: &Compound, redundant: Redundant) -> bool {
        if let Some(matched) = self.native_match(node, compound) {
            return matched;
        }

        if !redundant.tag
            && let Some(tag) = &compound.tag
        {
            let tag_ok = if tag == "*" {
                self.tree.is_element(node)
            } else {
                self.tree.node_name(node).eq_ignore_ascii_case(tag)
            };
            if !tag_ok {
                return false;
            }
        }

        if !redundant.id
            && let Some(id) = &compound.id
            && self.get_attribute(node, "id").as_deref() != Some(id.as_str())
        {
            return false;
        }

        if !redundant.classes && !compound.classes.is_empty() {
            let Some(class_list) = self.get_attribute(node, "class") else {
                return false;
            };
            if !compound.classes.iter().all(|class| has_token(&class_list, class)) {
                return false;
            }
        }

        for test in &compound.attributes {
            let passed = if test.operator == AttrOperator::Exists {
                self.has_attribute(node, &test.name)
            } else {
                test.test(self.get_attribute(node, &test.name).as_deref())
            };
            if !passed {
                return false;
            }
        }

        compound
            .pseudos
            .iter()
            .all(|pseudo| self.match_pseudo(node, pseudo))
    }

    /// Native single match, when usable for this compound.
    fn native_match(&self, node: T::Node, compound: &Compound) -> Option<bool> {
        if !self.tree.is_element(node) || !self.supports(Feature::MatchesSelector) {
            return None;
        }
        let text = compound.to_string();
        if self.failures.is_failed(Acceleration::MatchesSelector, &text) {
            return None;
        }
        self.tree
            .matches_selector(node, &text)
            .inspect_err(|err| self.record_failure(Acceleration::MatchesSelector, &text, err))
            .ok()
    }
}
