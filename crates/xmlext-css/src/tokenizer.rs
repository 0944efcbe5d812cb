//! Selector tokenizer.
//!
//! A reduced [CSS Syntax Level 3](https://www.w3.org/TR/css-syntax-3/#tokenization)
//! tokenizer: it only knows the code points that can appear in the compiled
//! selector subset, and hands every other delimiter to the parser so that it
//! can name the unsupported construct.

use crate::error::{Malformed, SelectorError};

/// A token together with the character offset it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// Character offset of the first code point of the token.
    pub offset: usize,
}

/// Token kinds produced by [`SelectorTokenizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// An ident sequence with escapes already resolved.
    Ident(String),
    /// U+002E FULL STOP (.)
    Dot,
    /// U+0023 NUMBER SIGN (#)
    Hash,
    /// U+002A ASTERISK (*)
    Asterisk,
    /// One or more whitespace code points.
    Whitespace,
    /// Any other code point.
    Delim(char),
}

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
pub struct SelectorTokenizer {
    input: Vec<char>,
    position: usize,
}

impl SelectorTokenizer {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the whole input.
    ///
    /// # Errors
    ///
    /// Returns [`Malformed::InvalidEscape`] for a backslash that does not
    /// start a valid escape.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SelectorError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn next_token(&mut self) -> Result<Option<Token>, SelectorError> {
        let offset = self.position;
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let kind = match c {
            // "Consume as much whitespace as possible."
            c if is_whitespace(c) => {
                while self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                TokenKind::Whitespace
            }
            c if is_ident_code_point(c) || c == '\\' => {
                TokenKind::Ident(self.consume_ident_sequence()?)
            }
            '.' => self.single(TokenKind::Dot),
            '#' => self.single(TokenKind::Hash),
            '*' => self.single(TokenKind::Asterisk),
            other => self.single(TokenKind::Delim(other)),
        };
        Ok(Some(Token { kind, offset }))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        let _ = self.consume();
        kind
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Digits are accepted at the start as well; class and id values are
    /// commonly written that way in HTML.
    fn consume_ident_sequence(&mut self) -> Result<String, SelectorError> {
        let mut result = String::new();
        loop {
            match self.peek() {
                // "ident code point"
                Some(c) if is_ident_code_point(c) => {
                    result.push(c);
                    let _ = self.consume();
                }
                // "the stream starts with a valid escape"
                Some('\\') => {
                    if !is_valid_escape(Some('\\'), self.peek_at(1)) {
                        return Err(SelectorError::malformed(
                            Malformed::InvalidEscape,
                            self.position,
                        ));
                    }
                    let _ = self.consume();
                    result.push(self.consume_escaped_code_point());
                }
                _ => return Ok(result),
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Assumes the backslash has been consumed and the escape is valid.
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            // "hex digit"
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = String::from(c);
                // "Consume as many hex digits as possible, but no more than 5."
                for _ in 0..5 {
                    match self.peek() {
                        Some(d) if d.is_ascii_hexdigit() => {
                            hex.push(d);
                            let _ = self.consume();
                        }
                        _ => break,
                    }
                }
                // "If the next input code point is whitespace, consume it as well."
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                // "If this number is zero, or is for a surrogate, or is greater than the
                // maximum allowed code point, return U+FFFD REPLACEMENT CHARACTER."
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|&cp| cp != 0)
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}')
            }
            // "EOF": rejected earlier by `is_valid_escape`.
            None => '\u{FFFD}',
            // "anything else"
            Some(c) => c,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
///
/// A backslash at end of input is treated as invalid as well.
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && !matches!(second, None | Some('\n' | '\r' | '\x0C'))
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
pub(crate) const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
///
/// Restricted to ASCII; other code points only enter a name through an
/// escape.
pub(crate) const fn is_ident_code_point(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
