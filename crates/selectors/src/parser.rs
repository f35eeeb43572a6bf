//! Permissive selector-text parser.
//!
//! Malformed fragments are dropped rather than reported: a selector that
//! yields no compounds simply contributes no alternative, and an empty list
//! matches nothing.

use crate::{AttrOperator, AttributeTest, Combinator, Compound, Expression, PseudoTest, SelectorList};
use core::mem::take;

/// Internal tokenizer token kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Tok {
    /// An explicit `>`, `+` or `~`.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attr(AttributeTest),
    Pseudo(PseudoTest),
    /// A character that starts nothing we understand; skipped.
    Junk,
}

/// Tokenizer over one alternative of a selector.
struct SelectorTokenizer {
    chars: Vec<char>,
    index: usize,
    pending_whitespace: bool,
}

impl SelectorTokenizer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
            pending_whitespace: false,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index.saturating_add(offset)).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    fn next_token(&mut self) -> Option<Tok> {
        if self.pending_whitespace {
            self.pending_whitespace = false;
            return Some(Tok::DescendantWS);
        }
        self.skip_whitespace_descendant();
        if self.pending_whitespace {
            self.pending_whitespace = false;
            return Some(Tok::DescendantWS);
        }
        let current = self.peek()?;
        let token = match current {
            '*' => {
                self.bump();
                Tok::Universal
            }
            '.' => {
                self.bump();
                Tok::Class(self.consume_ident())
            }
            '#' => {
                self.bump();
                Tok::Id(self.consume_ident())
            }
            '[' => self.consume_attr(),
            ':' => self.consume_pseudo(),
            '>' => {
                self.bump();
                Tok::Combinator(Combinator::Child)
            }
            '+' => {
                self.bump();
                Tok::Combinator(Combinator::AdjacentSibling)
            }
            '~' => {
                self.bump();
                Tok::Combinator(Combinator::GeneralSibling)
            }
            _ => {
                let ident = self.consume_ident();
                if ident.is_empty() {
                    self.bump();
                    Tok::Junk
                } else {
                    Tok::Tag(ident)
                }
            }
        };
        Some(token)
    }

    /// Skip whitespace and remember that a descendant combinator may follow.
    fn skip_whitespace_descendant(&mut self) {
        let start = self.index;
        self.skip_spaces();
        if self.index > start {
            self.pending_whitespace = true;
        }
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    #[inline]
    fn is_ident_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
    }

    /// Consume an identifier, resolving backslash escapes. Case is preserved.
    fn consume_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.bump();
                if let Some(escaped) = self.consume_escape() {
                    out.push(escaped);
                }
            } else if Self::is_ident_char(ch) {
                out.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    /// Resolve the escape following a consumed backslash.
    fn consume_escape(&mut self) -> Option<char> {
        let first = self.peek()?;
        if !first.is_ascii_hexdigit() {
            self.bump();
            return Some(first);
        }
        let mut code = 0_u32;
        let mut digits = 0;
        while digits < 6
            && let Some(digit) = self.peek().and_then(|ch| ch.to_digit(16))
        {
            code = code.saturating_mul(16).saturating_add(digit);
            digits += 1;
            self.bump();
        }
        if self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Consume a quoted string whose opening quote is the current character.
    fn consume_quoted(&mut self) -> String {
        let quote = self.peek().unwrap_or('"');
        self.bump();
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            self.bump();
            if ch == quote {
                break;
            }
            if ch == '\\' {
                if let Some(escaped) = self.consume_escape() {
                    out.push(escaped);
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Consume an unquoted attribute value until whitespace or `]`.
    fn consume_unquoted_value(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == ']' {
                break;
            }
            self.bump();
            if ch == '\\' {
                if let Some(escaped) = self.consume_escape() {
                    out.push(escaped);
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Parse `[name]` or `[name<op>value]`, keeping unknown operator tokens.
    fn consume_attr(&mut self) -> Tok {
        self.bump();
        self.skip_spaces();
        let name = self.consume_ident();
        self.skip_spaces();
        let mut operator = String::new();
        while let Some(ch) = self.peek() {
            if ch == ']' || ch.is_whitespace() || ch == '"' || ch == '\'' {
                break;
            }
            if ch == '=' {
                operator.push(ch);
                self.bump();
                break;
            }
            if Self::is_ident_char(ch) {
                break;
            }
            operator.push(ch);
            self.bump();
        }
        self.skip_spaces();
        let value = if operator.is_empty() {
            String::new()
        } else if matches!(self.peek(), Some('"' | '\'')) {
            self.consume_quoted()
        } else {
            self.consume_unquoted_value()
        };
        // Anything else up to the closing bracket (e.g. a case flag) is ignored.
        while let Some(ch) = self.peek() {
            self.bump();
            if ch == ']' {
                break;
            }
        }
        if name.is_empty() {
            return Tok::Junk;
        }
        Tok::Attr(AttributeTest {
            name,
            operator: AttrOperator::from_token(&operator),
            value,
        })
    }

    /// Parse `:name` or `:name(argument)`; `::name` is read like `:name`.
    fn consume_pseudo(&mut self) -> Tok {
        self.bump();
        if self.peek() == Some(':') {
            self.bump();
        }
        let name = self.consume_ident();
        if name.is_empty() {
            return Tok::Junk;
        }
        let argument = (self.peek() == Some('(')).then(|| self.consume_parenthesized());
        Tok::Pseudo(PseudoTest::new(&name, argument.as_deref()))
    }

    /// Consume a balanced `( ... )` group and return its trimmed contents.
    /// A lone quoted string argument is unquoted.
    fn consume_parenthesized(&mut self) -> String {
        self.bump();
        let start = self.index;
        let mut depth = 1_usize;
        let mut quote: Option<char> = None;
        while let Some(ch) = self.peek() {
            match (quote, ch) {
                (_, '\\') => self.bump(),
                (Some(open), _) if ch == open => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(ch),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                (None, _) => {}
            }
            self.bump();
        }
        let end = self.index.min(self.chars.len());
        let raw: String = self.chars.get(start..end).unwrap_or_default().iter().collect();
        if self.peek() == Some(')') {
            self.bump();
        }
        let trimmed = raw.trim();
        if let Some(first @ ('"' | '\'')) = trimmed.chars().next()
            && trimmed.len() >= 2
            && trimmed.ends_with(first)
        {
            let mut inner = Self::new(trimmed);
            return inner.consume_quoted();
        }
        trimmed.to_owned()
    }
}

/// Split on `separator` outside of parentheses, brackets and quotes.
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (offset, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (_, '\\') => escaped = true,
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, _) if ch == separator && depth == 0 => {
                parts.push(input.get(start..offset).unwrap_or_default());
                start = offset + ch.len_utf8();
            }
            (None, _) => {}
        }
    }
    parts.push(input.get(start..).unwrap_or_default());
    parts
}

/// Parse a selector list: comma separated alternatives.
///
/// Alternatives that produce no compound are dropped, so an empty or blank
/// input yields an empty list.
#[must_use]
pub fn parse_selector_list(input: &str) -> SelectorList {
    let expressions = split_top_level(input, ',')
        .into_iter()
        .map(parse_expression)
        .filter(|expression| !expression.is_empty())
        .collect();
    SelectorList::new(expressions)
}

/// Parse one alternative (no top-level commas).
#[must_use]
pub fn parse_expression(input: &str) -> Expression {
    let mut tokens = SelectorTokenizer::new(input.trim());
    let mut expression = Expression::default();
    let mut current = Compound::default();
    let mut has_current = false;
    let mut pending_combinator: Option<Combinator> = None;

    while let Some(token) = tokens.next_token() {
        match token {
            Tok::Combinator(comb) => pending_combinator = Some(comb),
            Tok::DescendantWS => {
                if pending_combinator.is_none() {
                    pending_combinator = Some(Combinator::Descendant);
                }
            }
            Tok::Junk => {}
            simple => {
                if let Some(comb) = pending_combinator.take() {
                    if has_current {
                        current.combinator = Some(comb);
                        expression.compounds.push(take(&mut current));
                    } else if expression.compounds.is_empty() {
                        expression.scope = comb;
                    }
                }
                apply_simple(&mut current, simple);
                has_current = true;
            }
        }
    }

    if has_current {
        current.combinator = None;
        expression.compounds.push(current);
    }
    expression
}

fn apply_simple(compound: &mut Compound, token: Tok) {
    match token {
        Tok::Universal => compound.tag = Some("*".to_owned()),
        Tok::Tag(tag) => compound.tag = Some(tag.to_ascii_lowercase()),
        Tok::Id(id) => compound.id = Some(id),
        Tok::Class(class) => compound.classes.push(class),
        Tok::Attr(attr) => compound.attributes.push(attr),
        Tok::Pseudo(pseudo) => compound.pseudos.push(pseudo),
        Tok::Combinator(_) | Tok::DescendantWS | Tok::Junk => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_parts_are_collected() {
        let list = parse_selector_list(r#"DIV#main.a.b[data-x^="y z"]:first-child"#);
        let compound = list.as_single_compound();
        assert_eq!(
            compound,
            Some(
                &Compound::default()
                    .with_tag("div")
                    .with_id("main")
                    .with_class("a")
                    .with_class("b")
                    .with_attribute(AttributeTest::new("data-x", AttrOperator::Prefix, "y z"))
                    .with_pseudo("first-child", None)
            )
        );
    }

    #[test]
    fn combinators_and_whitespace() {
        let expr = parse_expression("a  >b + c ~ d e");
        let tags: Vec<_> = expr
            .compounds
            .iter()
            .map(|compound| compound.tag.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(tags, ["a", "b", "c", "d", "e"]);
        assert_eq!(expr.combinator_after(0), Combinator::Child);
        assert_eq!(expr.combinator_after(1), Combinator::AdjacentSibling);
        assert_eq!(expr.combinator_after(2), Combinator::GeneralSibling);
        assert_eq!(expr.combinator_after(3), Combinator::Descendant);
        assert_eq!(expr.scope, Combinator::Descendant);
    }

    #[test]
    fn leading_combinator_becomes_scope() {
        let expr = parse_expression(" ~ p.note");
        assert_eq!(expr.scope, Combinator::GeneralSibling);
        assert_eq!(expr.compounds.len(), 1);
    }

    #[test]
    fn commas_inside_arguments_do_not_split() {
        let list = parse_selector_list("li:not(.a, .b), p[title=\"x,y\"]");
        assert_eq!(list.len(), 2);
        let first = list.expressions.first().and_then(Expression::last);
        assert_eq!(
            first.and_then(|compound| compound.pseudos.first()),
            Some(&PseudoTest::new("not", Some(".a, .b")))
        );
    }

    #[test]
    fn quoted_pseudo_argument_is_unquoted() {
        let expr = parse_expression(r#"p:contains("hello world")"#);
        let pseudo = expr.last().and_then(|compound| compound.pseudos.first());
        assert_eq!(pseudo, Some(&PseudoTest::new("contains", Some("hello world"))));
    }

    #[test]
    fn unknown_attribute_operator_is_kept() {
        let expr = parse_expression("[a!=b]");
        let attr = expr.last().and_then(|compound| compound.attributes.first());
        assert_eq!(attr.map(|test| &test.operator), Some(&AttrOperator::Other("!=".to_owned())));
    }

    #[test]
    fn escapes_round_trip_through_serialization() {
        let source = parse_selector_list(r#"#s\:1 > .\31 st[title="a \"q\""], ~ em"#);
        let reparsed = parse_selector_list(&source.to_string());
        assert_eq!(source, reparsed);
        assert_eq!(
            source.expressions.first().and_then(|expr| expr.compounds.first()).and_then(|compound| compound.id.as_deref()),
            Some("s:1")
        );

        for text in [
            r#"p:contains(" x ")"#,
            r#"p:contains(")")"#,
            r#"p:contains('say "hi"')"#,
            r#"p:contains("a, b")"#,
            "li:not(.first, [lang=en])",
        ] {
            let source = parse_selector_list(text);
            let serialized = source.to_string();
            assert_eq!(source, parse_selector_list(&serialized), "`{text}` serialized as `{serialized}`");
        }
        assert_eq!(
            parse_selector_list(r#"p:contains(" x ")"#).to_string(),
            r#"p:contains(" x ")"#
        );
        assert_eq!(parse_selector_list("li:not(.a, .b)").to_string(), "li:not(.a, .b)");
    }

    #[test]
    fn empty_and_junk_inputs() {
        assert!(parse_selector_list("").is_empty());
        assert!(parse_selector_list(" , ").is_empty());
        assert!(parse_selector_list(")").is_empty());
        assert_eq!(parse_expression("a >").compounds.len(), 1);
    }
}
