//! Selector parsing.
//!
//! This module implements the subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) that the compiler
//! understands: compound selectors made of an optional type (or universal)
//! selector followed by class and id selectors, chained with the descendant
//! combinator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Construct, Malformed, SelectorError};
use crate::tokenizer::{SelectorTokenizer, Token, TokenKind, is_ident_code_point, is_whitespace};
use crate::xpath;

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous conditions
/// on a single element."
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompoundTerm {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors),
    /// or `"*"` for an explicit
    /// [universal selector](https://www.w3.org/TR/selectors-4/#universal-selector).
    /// `None` when the component only has qualifiers.
    pub element: Option<String>,
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html),
    /// in selector order. All must match.
    pub classes: Vec<String>,
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    pub id: Option<String>,
}

impl CompoundTerm {
    /// A term with just a type selector.
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            element: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a class qualifier.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the id qualifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether this term matches any element name.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.element.as_deref().is_none_or(|e| e == "*")
    }

    fn is_empty(&self) -> bool {
        self.element.is_none() && self.classes.is_empty() && self.id.is_none()
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// A chain of compound terms separated by
/// [descendant combinators](https://www.w3.org/TR/selectors-4/#descendant-combinators).
/// The last term is the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector {
    terms: Vec<CompoundTerm>,
}

impl Selector {
    /// Build a selector from terms, outermost ancestor first.
    #[must_use]
    pub const fn new(terms: Vec<CompoundTerm>) -> Self {
        Self { terms }
    }

    /// The compound terms, outermost ancestor first.
    #[must_use]
    pub fn terms(&self) -> &[CompoundTerm] {
        &self.terms
    }

    /// `true` for the selector parsed from an empty or blank string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compile to an XPath 1.0 expression. See [`xpath::selector_to_xpath`].
    #[must_use]
    pub fn to_xpath(&self) -> String {
        xpath::selector_to_xpath(self)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

/// Writes the selector back as CSS, escaping where needed, so that the
/// output parses to an equal selector.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CompoundTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element.as_deref() {
            Some("*") => f.write_str("*")?,
            Some(name) => write_ident(f, name)?,
            None if self.classes.is_empty() && self.id.is_none() => f.write_str("*")?,
            None => {}
        }
        for class in &self.classes {
            f.write_str(".")?;
            write_ident(f, class)?;
        }
        if let Some(id) = &self.id {
            f.write_str("#")?;
            write_ident(f, id)?;
        }
        Ok(())
    }
}

/// [CSSOM § 2.1 serialize an identifier](https://drafts.csswg.org/cssom/#serialize-an-identifier),
/// simplified to the code points our tokenizer treats specially.
fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    for c in ident.chars() {
        if is_ident_code_point(c) {
            write!(f, "{c}")?;
        } else if c.is_ascii_control() {
            write!(f, "\\{:x} ", u32::from(c))?;
        } else {
            write!(f, "\\{c}")?;
        }
    }
    Ok(())
}

/// Parse a selector string.
///
/// An empty or whitespace-only string yields an empty [`Selector`].
///
/// # Errors
///
/// [`SelectorError::UnsupportedSyntax`] for attribute selectors,
/// pseudo-classes, the `>`, `+` and `~` combinators and selector lists;
/// [`SelectorError::Malformed`] for anything that is not a selector.
pub fn parse_selector(input: &str) -> Result<Selector, SelectorError> {
    let tokens = SelectorTokenizer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        terms: Vec::new(),
        current: CompoundTerm::default(),
        end: input.chars().count(),
    };
    parser.run()?;
    tracing::trace!(input, terms = parser.terms.len(), "parsed selector");
    Ok(Selector::new(parser.terms))
}

struct Parser {
    tokens: std::iter::Peekable<std::vec::IntoIter<Token>>,
    terms: Vec<CompoundTerm>,
    current: CompoundTerm,
    end: usize,
}

impl Parser {
    fn run(&mut self) -> Result<(), SelectorError> {
        while let Some(token) = self.tokens.next() {
            match token.kind {
                // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
                TokenKind::Ident(name) => {
                    let name = checked_name(name, token.offset)?;
                    self.set_element(name, token.offset)?;
                }

                // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
                TokenKind::Asterisk => self.set_element("*".to_string(), token.offset)?,

                // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
                // "The class selector is given as a full stop (. U+002E) immediately
                // followed by an identifier."
                TokenKind::Dot => {
                    let class = self.expect_ident(Malformed::MissingClassName, token.offset)?;
                    self.current.classes.push(class);
                }

                // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
                // "An ID selector is a hash (#, U+0023) immediately followed by the
                // ID value, which is an identifier."
                TokenKind::Hash => {
                    if self.current.id.is_some() {
                        return Err(SelectorError::malformed(
                            Malformed::DuplicateId,
                            token.offset,
                        ));
                    }
                    let id = self.expect_ident(Malformed::MissingId, token.offset)?;
                    self.current.id = Some(id);
                }

                // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
                // "A descendant combinator is whitespace that separates two compound
                // selectors."
                TokenKind::Whitespace => self.flush(),

                TokenKind::Delim(c) => {
                    return Err(match Construct::from_delim(c) {
                        Some(construct) => SelectorError::UnsupportedSyntax {
                            construct,
                            offset: token.offset,
                        },
                        None => SelectorError::malformed(
                            Malformed::UnexpectedCharacter(c),
                            token.offset,
                        ),
                    });
                }
            }
        }
        self.flush();
        Ok(())
    }

    fn set_element(&mut self, name: String, offset: usize) -> Result<(), SelectorError> {
        if self.current.element.is_some() {
            return Err(SelectorError::malformed(Malformed::DuplicateType, offset));
        }
        if !self.current.is_empty() {
            return Err(SelectorError::malformed(
                Malformed::TypeAfterQualifier,
                offset,
            ));
        }
        self.current.element = Some(name);
        Ok(())
    }

    fn expect_ident(&mut self, reason: Malformed, offset: usize) -> Result<String, SelectorError> {
        match self.tokens.next_if(|t| matches!(t.kind, TokenKind::Ident(_))) {
            Some(Token {
                kind: TokenKind::Ident(name),
                offset,
            }) => checked_name(name, offset),
            _ => Err(SelectorError::malformed(
                reason,
                self.tokens.peek().map_or(self.end, |t| t.offset.max(offset + 1)),
            )),
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.terms.push(std::mem::take(&mut self.current));
        }
    }
}

/// Escapes can smuggle whitespace into a name. Class values are matched as
/// single whitespace-separated tokens, so such a name is refused rather than
/// compiled into a predicate spanning two tokens.
fn checked_name(name: String, offset: usize) -> Result<String, SelectorError> {
    if name.chars().any(is_whitespace) {
        return Err(SelectorError::malformed(Malformed::WhitespaceInName, offset));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_empty() {
        assert!(parse_selector("").unwrap().is_empty());
        assert!(parse_selector(" \t\n").unwrap().is_empty());
    }

    #[test]
    fn test_leading_and_trailing_whitespace() {
        let selector = parse_selector("  div  p ").unwrap();
        assert_eq!(
            selector.terms(),
            &[CompoundTerm::element("div"), CompoundTerm::element("p")]
        );
    }

    #[test]
    fn test_display_escapes_specials() {
        let selector = Selector::new(vec![CompoundTerm::default().with_class("it's:a.b")]);
        let css = selector.to_string();
        assert_eq!(css, r".it\'s\:a\.b");
        assert_eq!(parse_selector(&css).unwrap(), selector);
    }

    #[test]
    fn test_display_of_bare_universal() {
        assert_eq!(parse_selector("*").unwrap().to_string(), "*");
        assert_eq!(parse_selector("*.a").unwrap().to_string(), "*.a");
        assert_eq!(parse_selector(".a").unwrap().to_string(), ".a");
    }

    #[test]
    fn test_display_escapes_non_ascii() {
        let selector = Selector::new(vec![CompoundTerm::element("p").with_class("café")]);
        assert_eq!(selector.to_string(), r"p.caf\é");
        assert_eq!(parse_selector(&selector.to_string()).unwrap(), selector);
    }

    #[test]
    fn test_whitespace_in_name_offset() {
        let err = parse_selector(r"div .a\ b").unwrap_err();
        assert_eq!(
            err,
            SelectorError::malformed(Malformed::WhitespaceInName, 5)
        );
    }

    #[test]
    fn test_missing_class_name_offset() {
        let err = parse_selector("div.").unwrap_err();
        assert_eq!(
            err,
            SelectorError::malformed(Malformed::MissingClassName, 4)
        );
    }
}
