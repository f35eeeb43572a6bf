//! Attribute selector operators and their string predicates.

/// Operator of an attribute test.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum AttrOperator {
    /// `[attr]`: presence only.
    #[default]
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr~=value]`: one whitespace separated token.
    Includes,
    /// `[attr|=value]`: exact, or followed by a hyphen.
    DashMatch,
    /// `[attr*=value]`
    Substring,
    /// Any other operator token. Never matches.
    Other(String),
}

impl AttrOperator {
    /// Map an operator token to its operator. Unknown tokens are kept so
    /// that they fail matching instead of disappearing.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "" => Self::Exists,
            "=" => Self::Equals,
            "^=" => Self::Prefix,
            "$=" => Self::Suffix,
            "~=" => Self::Includes,
            "|=" => Self::DashMatch,
            "*=" => Self::Substring,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Selector-text token of this operator.
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::Substring => "*=",
            Self::Other(token) => token,
        }
    }

    /// Test an attribute value that is known to be present.
    #[must_use]
    pub fn test(&self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Exists => true,
            Self::Equals => actual == expected,
            Self::Prefix => actual.starts_with(expected),
            Self::Suffix => actual.ends_with(expected),
            Self::Includes => has_token(actual, expected),
            Self::DashMatch => actual
                .strip_prefix(expected)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-')),
            Self::Substring => actual.contains(expected),
            Self::Other(_) => false,
        }
    }
}

/// True when `token` appears in `list` as a whole whitespace-delimited word.
#[inline]
#[must_use]
pub fn has_token(list: &str, token: &str) -> bool {
    list.split_whitespace().any(|word| word == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: &str = "foo bar-baz";

    #[test]
    fn operators_on_a_class_list() {
        assert!(AttrOperator::Includes.test(CLASSES, "bar-baz"));
        assert!(!AttrOperator::Includes.test(CLASSES, "bar"));
        assert!(AttrOperator::Substring.test(CLASSES, "bar"));
        assert!(AttrOperator::Prefix.test(CLASSES, "foo"));
        assert!(AttrOperator::Suffix.test(CLASSES, "baz"));
        assert!(!AttrOperator::DashMatch.test(CLASSES, "foo"));
        assert!(!AttrOperator::Equals.test(CLASSES, "foo"));
    }

    #[test]
    fn dash_match_accepts_exact_and_subcodes() {
        assert!(AttrOperator::DashMatch.test("en", "en"));
        assert!(AttrOperator::DashMatch.test("en-US", "en"));
        assert!(!AttrOperator::DashMatch.test("english", "en"));
    }

    #[test]
    fn unknown_operator_never_matches() {
        let op = AttrOperator::from_token("!=");
        assert_eq!(op, AttrOperator::Other("!=".to_owned()));
        assert!(!op.test("a", "a"));
        assert!(!op.test("a", "b"));
    }

    #[test]
    fn tokens_round_trip() {
        for token in ["", "=", "^=", "$=", "~=", "|=", "*=", "!="] {
            assert_eq!(AttrOperator::from_token(token).token(), token);
        }
    }
}
