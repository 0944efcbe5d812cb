//! Selector compilation errors.

use strum_macros::Display;
use thiserror::Error;

/// Selector syntax that is valid CSS but deliberately not compiled.
///
/// Only type, universal, class and id selectors joined by the descendant
/// combinator are translated; everything listed here is rejected instead of
/// being silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum Construct {
    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors), `[href]`
    #[strum(serialize = "attribute selector")]
    AttributeSelector,
    /// [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes), `:hover`, `::before`
    #[strum(serialize = "pseudo-class")]
    PseudoClass,
    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators), `a > b`
    #[strum(serialize = "child combinator")]
    ChildCombinator,
    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators), `a + b`
    #[strum(serialize = "next-sibling combinator")]
    NextSiblingCombinator,
    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators), `a ~ b`
    #[strum(serialize = "subsequent-sibling combinator")]
    SubsequentSiblingCombinator,
    /// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping), `a, b`
    #[strum(serialize = "selector list")]
    SelectorList,
}

impl Construct {
    /// The construct introduced by `c`, if `c` starts one.
    #[must_use]
    pub const fn from_delim(c: char) -> Option<Self> {
        match c {
            '[' => Some(Self::AttributeSelector),
            ':' => Some(Self::PseudoClass),
            '>' => Some(Self::ChildCombinator),
            '+' => Some(Self::NextSiblingCombinator),
            '~' => Some(Self::SubsequentSiblingCombinator),
            ',' => Some(Self::SelectorList),
            _ => None,
        }
    }

    /// The character that introduces this construct.
    #[must_use]
    pub const fn delim(self) -> char {
        match self {
            Self::AttributeSelector => '[',
            Self::PseudoClass => ':',
            Self::ChildCombinator => '>',
            Self::NextSiblingCombinator => '+',
            Self::SubsequentSiblingCombinator => '~',
            Self::SelectorList => ',',
        }
    }
}

/// Why a selector could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    /// `.` not followed by an identifier.
    #[error("expected a class name after '.'")]
    MissingClassName,
    /// `#` not followed by an identifier.
    #[error("expected an id after '#'")]
    MissingId,
    /// A character that cannot appear in a selector.
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
    /// A second `#id` in the same component.
    #[error("a component may only carry one id")]
    DuplicateId,
    /// A second type name or `*` in the same component.
    #[error("a component may only carry one type selector")]
    DuplicateType,
    /// A type name or `*` after a class or id in the same component.
    #[error("type selector must come before class and id qualifiers")]
    TypeAfterQualifier,
    /// A backslash at end of input or before a newline.
    #[error("invalid escape")]
    InvalidEscape,
    /// An escaped whitespace code point inside a type, class or id name.
    #[error("a name cannot contain whitespace")]
    WhitespaceInName,
}

/// Errors produced while compiling a selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Valid CSS outside the compiled subset.
    #[error("unsupported selector syntax at offset {offset}: {construct}")]
    UnsupportedSyntax {
        /// What was found.
        construct: Construct,
        /// Character offset of the construct in the selector.
        offset: usize,
    },
    /// Input that is not a selector at all.
    #[error("malformed selector at offset {offset}: {reason}")]
    Malformed {
        /// What went wrong.
        reason: Malformed,
        /// Character offset of the problem in the selector.
        offset: usize,
    },
}

impl SelectorError {
    /// Character offset the error points at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::UnsupportedSyntax { offset, .. } | Self::Malformed { offset, .. } => *offset,
        }
    }

    pub(crate) const fn malformed(reason: Malformed, offset: usize) -> Self {
        Self::Malformed { reason, offset }
    }
}
