//! Selector data model shared by the finder engine and host trees.
//!
//! A [`SelectorList`] is what the grammar collaborator hands to the matching
//! engine: comma separated alternatives, each an [`Expression`] made of
//! [`Compound`] predicates read left to right (outermost to innermost) and
//! joined by [`Combinator`]s.
//!
//! The crate also carries a permissive parser producing that shape and a
//! canonical serializer turning it back into selector text, which is the
//! form handed to native host query primitives.

mod attribute;
mod parser;
mod serialize;

pub use attribute::{AttrOperator, has_token};
pub use parser::{parse_expression, parse_selector_list};
pub use serialize::{escape_identifier, escape_string};

/// Structural relation between two adjacent compounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    #[default]
    Descendant,
    /// `>`: the immediate parent.
    Child,
    /// `+`: the nearest preceding element sibling.
    AdjacentSibling,
    /// `~`: any preceding element sibling.
    GeneralSibling,
}

impl Combinator {
    /// The selector-text symbol for this combinator (`" "` for descendant).
    #[inline]
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => ">",
            Self::AdjacentSibling => "+",
            Self::GeneralSibling => "~",
        }
    }

    /// True for `~` and `+`, which relate siblings rather than ancestors.
    #[inline]
    #[must_use]
    pub const fn is_sibling(self) -> bool {
        matches!(self, Self::AdjacentSibling | Self::GeneralSibling)
    }
}

/// One attribute test inside a compound, e.g. `[lang|="en"]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeTest {
    pub name: String,
    pub operator: AttrOperator,
    /// Raw expected value; empty for presence tests.
    pub value: String,
}

impl AttributeTest {
    /// Presence test, `[name]`.
    #[must_use]
    pub fn exists(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            operator: AttrOperator::Exists,
            value: String::new(),
        }
    }

    /// Valued test, `[name<op>"value"]`.
    #[must_use]
    pub fn new(name: &str, operator: AttrOperator, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            operator,
            value: value.to_owned(),
        }
    }

    /// Quoted, backslash-escaped form of the value used in serialized selectors.
    #[must_use]
    pub fn escaped_value(&self) -> String {
        escape_string(&self.value)
    }

    /// Evaluate this test against an attribute value (`None` when absent).
    #[inline]
    #[must_use]
    pub fn test(&self, actual: Option<&str>) -> bool {
        actual.is_some_and(|found| self.operator.test(found, &self.value))
    }
}

/// One pseudo-class test, e.g. `:first-child` or `:contains(foo)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PseudoTest {
    pub name: String,
    pub argument: Option<String>,
}

impl PseudoTest {
    #[must_use]
    pub fn new(name: &str, argument: Option<&str>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            argument: argument.map(ToOwned::to_owned),
        }
    }
}

/// Everything required of a single node at one position of an expression.
///
/// A compound with every field absent matches every node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Compound {
    /// Lowercased tag name, `*` for the wildcard.
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeTest>,
    pub pseudos: Vec<PseudoTest>,
    /// How this compound relates to the next compound of the expression;
    /// `None` on the last one.
    pub combinator: Option<Combinator>,
}

impl Compound {
    /// True when no predicate at all is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudos.is_empty()
    }

    /// True when the tag is the `*` wildcard.
    #[inline]
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.tag.as_deref() == Some("*")
    }

    /// Builder: set the tag (lowercased).
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_ascii_lowercase());
        self
    }

    /// Builder: set the id.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    /// Builder: require a class.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_owned());
        self
    }

    /// Builder: add an attribute test.
    #[must_use]
    pub fn with_attribute(mut self, test: AttributeTest) -> Self {
        self.attributes.push(test);
        self
    }

    /// Builder: add a pseudo-class test.
    #[must_use]
    pub fn with_pseudo(mut self, name: &str, argument: Option<&str>) -> Self {
        self.pseudos.push(PseudoTest::new(name, argument));
        self
    }
}

/// One alternative: a chain of compounds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Expression {
    /// Relation between the search context and the first compound. Only
    /// relative selectors such as `> li` or `~ p` change it.
    pub scope: Combinator,
    pub compounds: Vec<Compound>,
}

impl Expression {
    /// Build an expression from `(compound, combinator-to-next)` pairs.
    /// The combinator of the last pair is discarded.
    #[must_use]
    pub fn chain(parts: Vec<(Compound, Combinator)>) -> Self {
        let len = parts.len();
        let compounds = parts
            .into_iter()
            .enumerate()
            .map(|(index, (mut compound, combinator))| {
                compound.combinator = (index + 1 < len).then_some(combinator);
                compound
            })
            .collect();
        Self {
            scope: Combinator::Descendant,
            compounds,
        }
    }

    /// Single-compound expression.
    #[must_use]
    pub fn single(compound: Compound) -> Self {
        Self::chain(vec![(compound, Combinator::Descendant)])
    }

    /// Rightmost compound, the one seeds are drawn for.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Compound> {
        self.compounds.last()
    }

    /// Combinator relating `compounds[index]` to the compound after it.
    #[inline]
    #[must_use]
    pub fn combinator_after(&self, index: usize) -> Combinator {
        self.compounds
            .get(index)
            .and_then(|compound| compound.combinator)
            .unwrap_or_default()
    }

    /// True when any compound uses the `*` wildcard tag.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.compounds.iter().any(Compound::is_wildcard)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty()
    }
}

/// The parsed form of a whole selector: comma separated alternatives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct SelectorList {
    pub expressions: Vec<Expression>,
}

impl SelectorList {
    #[must_use]
    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// The lone compound when this list is one single-compound alternative.
    #[must_use]
    pub fn as_single_compound(&self) -> Option<&Compound> {
        match self.expressions.as_slice() {
            [only] if only.scope == Combinator::Descendant => match only.compounds.as_slice() {
                [compound] => Some(compound),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<Expression> for SelectorList {
    fn from(expression: Expression) -> Self {
        Self::new(vec![expression])
    }
}
