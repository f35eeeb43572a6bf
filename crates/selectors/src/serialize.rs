//! Canonical selector text.
//!
//! The output re-parses to an equal structure, which lets the engine hand an
//! expression to a native host query and use the same text as a cache key.

use crate::parser::parse_expression;
use crate::{AttrOperator, Combinator, Compound, Expression, SelectorList};
use core::fmt::{Display, Formatter, Result as FmtResult, Write as _};

/// Escape an identifier (id, class or attribute name) for selector text.
#[must_use]
pub fn escape_identifier(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (index, ch) in ident.chars().enumerate() {
        let leading_digit = ch.is_ascii_digit()
            && (index == 0 || (index == 1 && ident.starts_with('-')));
        if leading_digit {
            let _ignored = write!(out, "\\{:x} ", u32::from(ch));
        } else if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

/// Double-quote a string value, escaping quotes and backslashes.
#[must_use]
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Whether a pseudo argument written unquoted parses back to itself. The
/// parser trims arguments and unquotes a lone quoted string, so anything
/// else goes out quoted.
fn reads_back_raw(argument: &str) -> bool {
    let expression = parse_expression(&format!("*:x({argument})"));
    match expression.compounds.as_slice() {
        [compound] => match compound.pseudos.as_slice() {
            [pseudo] => pseudo.argument.as_deref() == Some(argument),
            _ => false,
        },
        _ => false,
    }
}

impl Display for Compound {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        if self.is_empty() {
            return fmt.write_str("*");
        }
        if let Some(tag) = &self.tag {
            fmt.write_str(tag)?;
        }
        if let Some(id) = &self.id {
            write!(fmt, "#{}", escape_identifier(id))?;
        }
        for class in &self.classes {
            write!(fmt, ".{}", escape_identifier(class))?;
        }
        for attr in &self.attributes {
            let name = escape_identifier(&attr.name);
            if attr.operator == AttrOperator::Exists {
                write!(fmt, "[{name}]")?;
            } else {
                write!(fmt, "[{name}{}{}]", attr.operator.token(), attr.escaped_value())?;
            }
        }
        for pseudo in &self.pseudos {
            match &pseudo.argument {
                Some(argument) if reads_back_raw(argument) => write!(fmt, ":{}({argument})", pseudo.name)?,
                Some(argument) => write!(fmt, ":{}({})", pseudo.name, escape_string(argument))?,
                None => write!(fmt, ":{}", pseudo.name)?,
            }
        }
        Ok(())
    }
}

impl Display for Expression {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        if self.scope != Combinator::Descendant {
            write!(fmt, "{} ", self.scope.symbol())?;
        }
        let last = self.compounds.len().saturating_sub(1);
        for (index, compound) in self.compounds.iter().enumerate() {
            write!(fmt, "{compound}")?;
            if index < last {
                let combinator = self.combinator_after(index);
                if combinator == Combinator::Descendant {
                    fmt.write_str(" ")?;
                } else {
                    write!(fmt, " {} ", combinator.symbol())?;
                }
            }
        }
        Ok(())
    }
}

impl Display for SelectorList {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for (index, expression) in self.expressions.iter().enumerate() {
            if index > 0 {
                fmt.write_str(", ")?;
            }
            write!(fmt, "{expression}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeTest;

    #[test]
    fn identifiers_with_punctuation_are_escaped() {
        assert_eq!(escape_identifier("s:1"), "s\\:1");
        assert_eq!(escape_identifier("1st"), "\\31 st");
        assert_eq!(escape_identifier("plain-name_2"), "plain-name_2");
    }

    #[test]
    fn strings_are_quoted() {
        assert_eq!(escape_string(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn expression_text() {
        let expr = Expression::chain(vec![
            (Compound::default().with_tag("ul").with_class("menu"), Combinator::Child),
            (
                Compound::default()
                    .with_tag("li")
                    .with_attribute(AttributeTest::new("lang", AttrOperator::DashMatch, "en"))
                    .with_pseudo("first-child", None),
                Combinator::Descendant,
            ),
            (Compound::default().with_id("x"), Combinator::Descendant),
        ]);
        assert_eq!(
            expr.to_string(),
            r#"ul.menu > li[lang|="en"]:first-child #x"#
        );
    }

    #[test]
    fn relative_scope_is_written_first() {
        let mut expr = Expression::single(Compound::default().with_tag("p"));
        expr.scope = Combinator::GeneralSibling;
        assert_eq!(expr.to_string(), "~ p");
    }

    #[test]
    fn empty_compound_prints_as_wildcard() {
        assert_eq!(Compound::default().to_string(), "*");
    }
}
