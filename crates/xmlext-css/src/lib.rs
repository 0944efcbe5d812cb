//! CSS selector to XPath 1.0 compiler.
//!
//! Translates the selector subset that document search needs (type,
//! universal, class and id selectors joined by the descendant combinator)
//! into an equivalent XPath 1.0 expression:
//!
//! ```
//! use xmlext_css::css2xpath;
//!
//! assert_eq!(css2xpath("div p").unwrap(), "//div//p");
//! assert_eq!(css2xpath("#main").unwrap(), "//*[@id='main']");
//! assert_eq!(
//!     css2xpath(".nav").unwrap(),
//!     "//*[contains(concat(' ', normalize-space(@class), ' '), ' nav ')]"
//! );
//! ```
//!
//! The output is an absolute path. Evaluate it as is against a document, or
//! prefix it with `.` to search the descendants of a context node.
//!
//! Compilation is pure: no state, no I/O, and the same input always gives the
//! same output.

pub mod error;
pub mod selector;
pub mod tokenizer;
pub mod xpath;

pub use error::{Construct, Malformed, SelectorError};
pub use selector::{CompoundTerm, Selector, parse_selector};
pub use xpath::xpath_literal;

/// Compile a CSS selector into an XPath 1.0 expression.
///
/// An empty or whitespace-only selector compiles to the empty string, which
/// callers must treat as "no search" rather than evaluate.
///
/// # Errors
///
/// See [`parse_selector`].
pub fn css2xpath(selector: &str) -> Result<String, SelectorError> {
    let xpath = parse_selector(selector)?.to_xpath();
    tracing::debug!(selector, %xpath, "compiled selector");
    Ok(xpath)
}

/// Alias of [`css2xpath`].
///
/// # Errors
///
/// See [`parse_selector`].
pub fn translate(selector: &str) -> Result<String, SelectorError> {
    css2xpath(selector)
}
