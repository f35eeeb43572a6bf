//! Right-to-left chain validation.
//!
//! Once a node matched the rightmost compound, the remaining compounds are
//! checked by walking combinators backward: ancestors for descendant and
//! child, preceding element siblings for `~` and `+`. The first complete
//! chain wins; there is no memoization.

use crate::adapter::{TreeAdapter, previous_element_sibling};
use crate::finder::Finder;
use crate::matcher::Redundant;
use css_selectors::{Combinator, Expression};

impl<T: TreeAdapter> Finder<'_, T> {
    /// Check that `node`, already matched against `compounds[index + 1]`,
    /// has a chain of nodes matching `compounds[..=index]` and ending at
    /// `context`. `None` is the terminal step, which relates `node` to the
    /// context through the expression's scope combinator.
    pub fn validate(
        &self,
        context: T::Node,
        node: T::Node,
        index: Option<usize>,
        expression: &Expression,
    ) -> bool {
        let Some(position) = index else {
            return self.reaches_context(context, node, expression.scope);
        };
        let Some(compound) = expression.compounds.get(position) else {
            return false;
        };
        let next = position.checked_sub(1);
        let root = self.tree.root();
        let accept = |candidate: T::Node| {
            self.match_compound(candidate, compound, Redundant::default())
                && self.validate(context, candidate, next, expression)
        };

        match expression.combinator_after(position) {
            Combinator::Descendant => {
                let mut current = self.tree.parent(node);
                while let Some(ancestor) = current {
                    if ancestor == context || ancestor == root {
                        return false;
                    }
                    if accept(ancestor) {
                        return true;
                    }
                    current = self.tree.parent(ancestor);
                }
                false
            }
            Combinator::Child => self
                .tree
                .parent(node)
                .is_some_and(|parent| parent != context && parent != root && accept(parent)),
            Combinator::GeneralSibling => {
                let mut current = previous_element_sibling(self.tree, node);
                while let Some(sibling) = current {
                    if accept(sibling) {
                        return true;
                    }
                    current = previous_element_sibling(self.tree, sibling);
                }
                false
            }
            Combinator::AdjacentSibling => {
                previous_element_sibling(self.tree, node).is_some_and(accept)
            }
        }
    }

    /// Terminal step: is `context` reachable from `node` through `scope`?
    fn reaches_context(&self, context: T::Node, node: T::Node, scope: Combinator) -> bool {
        match scope {
            Combinator::Descendant => self.tree.contains(context, node),
            Combinator::Child => self.tree.parent(node) == Some(context),
            Combinator::GeneralSibling => {
                let mut current = previous_element_sibling(self.tree, node);
                while let Some(sibling) = current {
                    if sibling == context {
                        return true;
                    }
                    current = previous_element_sibling(self.tree, sibling);
                }
                false
            }
            Combinator::AdjacentSibling => previous_element_sibling(self.tree, node) == Some(context),
        }
    }
}
