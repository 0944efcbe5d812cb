//! XPath emission.
//!
//! Each compound term becomes one location step on the
//! `descendant-or-self` axis, written in its abbreviated form `//`:
//!
//! ```text
//! div.a#b p   =>   //div[contains(concat(' ', normalize-space(@class), ' '), ' a ')][@id='b']//p
//! ```
//!
//! The expression is absolute. To search below a context node, prefix it
//! with `.`, which turns `//…` into `.//…`.

use std::fmt::Write;

use crate::selector::{CompoundTerm, Selector};

/// Compile a parsed selector. An empty selector compiles to an empty string.
#[must_use]
pub fn selector_to_xpath(selector: &Selector) -> String {
    let mut out = String::new();
    for term in selector.terms() {
        // [XPath 1.0 § 2.5](https://www.w3.org/TR/xpath-10/#path-abbrev)
        // "// is short for /descendant-or-self::node()/"
        out.push_str("//");
        write_term(&mut out, term);
    }
    out
}

fn write_term(out: &mut String, term: &CompoundTerm) {
    match term.element.as_deref() {
        Some(name) if name != "*" && is_xml_name(name) => out.push_str(name),
        // Names that are not valid XPath name tests are compared as strings.
        Some(name) if name != "*" => {
            let _ = write!(out, "*[name()={}]", xpath_literal(name));
        }
        _ => out.push('*'),
    }

    // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    // "the class selector ... represents an element belonging to the class
    // identified by the identifier": whole-token membership, so pad both
    // sides with a single space.
    for class in &term.classes {
        let _ = write!(
            out,
            "[contains(concat(' ', normalize-space(@class), ' '), {})]",
            xpath_literal(&format!(" {class} "))
        );
    }

    // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    if let Some(id) = &term.id {
        let _ = write!(out, "[@id={}]", xpath_literal(id));
    }
}

/// Quote `value` as an XPath 1.0 string literal.
///
/// [XPath 1.0 § 3.7](https://www.w3.org/TR/xpath-10/#exprlex) literals have no
/// escape syntax, so a value containing `'` is split and rebuilt with
/// `concat()`, each apostrophe quoted with `"`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }

    let mut parts: Vec<String> = Vec::new();
    for (i, piece) in value.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !piece.is_empty() {
            parts.push(format!("'{piece}'"));
        }
    }
    // concat() takes at least two arguments.
    if parts.len() == 1 {
        return parts.remove(0);
    }
    format!("concat({})", parts.join(", "))
}

/// [XML 1.0 § 2.3 Name](https://www.w3.org/TR/xml/#NT-Name), restricted to
/// what an XPath name test accepts without a namespace context.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
