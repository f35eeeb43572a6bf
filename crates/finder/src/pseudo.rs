//! Built-in pseudo-classes.
//!
//! Names outside the catalog fall back to attribute semantics: `:name(value)`
//! requires the attribute `name` to equal `value`, and a bare `:name`
//! requires the attribute to be present.

use crate::adapter::{TreeAdapter, next_element_sibling, previous_element_sibling};
use crate::finder::Finder;
use css_selectors::{PseudoTest, parse_selector_list};

/// Catalog of structural and state pseudo-classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    /// No element children and no text content.
    Empty,
    /// Negation of a full selector match of the argument.
    Not,
    /// Text content contains the argument.
    Contains,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Enabled,
    Disabled,
    /// Checked, or a selected option.
    Checked,
    Selected,
    /// The active element, when it is focusable (`href`, `type` or `tabindex`).
    Focus,
    /// The document element.
    Root,
}

impl PseudoClass {
    /// Look up a lowercase pseudo-class name.
    pub fn from_name(name: &str) -> Option<Self> {
        let pseudo = match name {
            "empty" => Self::Empty,
            "not" => Self::Not,
            "contains" => Self::Contains,
            "first-child" => Self::FirstChild,
            "last-child" => Self::LastChild,
            "only-child" => Self::OnlyChild,
            "first-of-type" => Self::FirstOfType,
            "last-of-type" => Self::LastOfType,
            "only-of-type" => Self::OnlyOfType,
            "enabled" => Self::Enabled,
            "disabled" => Self::Disabled,
            "checked" => Self::Checked,
            "selected" => Self::Selected,
            "focus" => Self::Focus,
            "root" => Self::Root,
            _ => return None,
        };
        Some(pseudo)
    }
}

impl<T: TreeAdapter> Finder<'_, T> {
    /// Evaluate one pseudo-class test against `node`.
    pub fn match_pseudo(&self, node: T::Node, test: &PseudoTest) -> bool {
        let argument = test.argument.as_deref();
        match PseudoClass::from_name(&test.name) {
            Some(pseudo) => self.evaluate_pseudo(node, pseudo, argument),
            None => argument.map_or_else(
                || self.has_attribute(node, &test.name),
                |value| self.get_attribute(node, &test.name).as_deref() == Some(value),
            ),
        }
    }

    fn evaluate_pseudo(&self, node: T::Node, pseudo: PseudoClass, argument: Option<&str>) -> bool {
        let tree = self.tree;
        match pseudo {
            PseudoClass::Empty => self.is_empty_element(node),
            PseudoClass::Not => {
                let list = parse_selector_list(argument.unwrap_or_default());
                !self.matches(node, &list)
            }
            PseudoClass::Contains => tree
                .text_content(node)
                .contains(argument.unwrap_or_default()),
            PseudoClass::FirstChild => previous_element_sibling(tree, node).is_none(),
            PseudoClass::LastChild => next_element_sibling(tree, node).is_none(),
            PseudoClass::OnlyChild => {
                previous_element_sibling(tree, node).is_none()
                    && next_element_sibling(tree, node).is_none()
            }
            PseudoClass::FirstOfType => !self.has_sibling_of_type(node, false),
            PseudoClass::LastOfType => !self.has_sibling_of_type(node, true),
            PseudoClass::OnlyOfType => {
                !self.has_sibling_of_type(node, false) && !self.has_sibling_of_type(node, true)
            }
            PseudoClass::Enabled => !tree.is_disabled(node),
            PseudoClass::Disabled => tree.is_disabled(node),
            PseudoClass::Checked => tree.is_checked(node) || tree.is_selected(node),
            PseudoClass::Selected => tree.is_selected(node),
            PseudoClass::Focus => {
                tree.active_element() == Some(node)
                    && ["href", "type", "tabindex"]
                        .iter()
                        .any(|name| self.has_attribute(node, name))
            }
            PseudoClass::Root => tree.document_element() == Some(node),
        }
    }

    fn is_empty_element(&self, node: T::Node) -> bool {
        if !self.tree.is_element(node) {
            return false;
        }
        let mut child = self.tree.first_child(node);
        while let Some(current) = child {
            if self.tree.is_element(current) {
                return false;
            }
            child = self.tree.next_sibling(current);
        }
        self.tree.text_content(node).is_empty()
    }

    /// Whether an element sibling with the same node name exists after
    /// (`following`) or before `node`.
    fn has_sibling_of_type(&self, node: T::Node, following: bool) -> bool {
        let name = self.tree.node_name(node);
        let step = |current: T::Node| {
            if following {
                next_element_sibling(self.tree, current)
            } else {
                previous_element_sibling(self.tree, current)
            }
        };
        let mut sibling = step(node);
        while let Some(current) = sibling {
            if self.tree.node_name(current).eq_ignore_ascii_case(&name) {
                return true;
            }
            sibling = step(current);
        }
        false
    }
}
