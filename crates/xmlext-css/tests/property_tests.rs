//! Property tests for the selector compiler.

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use xmlext_css::{CompoundTerm, Malformed, Selector, SelectorError, css2xpath, parse_selector};

const NAMES: &[&str] = &[
    "div", "p", "em", "li", "h1", "nav", "x-y", "_a", "item2", "Élan", "it's", "a.b", "a:b",
    "sp%ce",
];

fn name(g: &mut Gen) -> String {
    (*g.choose(NAMES).unwrap_or(&"div")).to_string()
}

/// A random selector with at least one term, built from names that exercise
/// escaping.
#[derive(Debug, Clone)]
struct ArbSelector(Selector);

impl Arbitrary for ArbSelector {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = 1 + usize::arbitrary(g) % 4;
        let terms = (0..len)
            .map(|_| {
                let mut term = CompoundTerm::default();
                if bool::arbitrary(g) {
                    term.element = Some(if bool::arbitrary(g) {
                        "*".to_string()
                    } else {
                        name(g)
                    });
                }
                for _ in 0..usize::arbitrary(g) % 3 {
                    term.classes.push(name(g));
                }
                if bool::arbitrary(g) || (term.element.is_none() && term.classes.is_empty()) {
                    term.id = Some(name(g));
                }
                term
            })
            .collect();
        Self(Selector::new(terms))
    }
}

#[quickcheck]
fn prop_display_reparses_to_same_selector(s: ArbSelector) -> bool {
    parse_selector(&s.0.to_string()).is_ok_and(|parsed| parsed == s.0)
}

#[quickcheck]
fn prop_compilation_is_idempotent(s: ArbSelector) -> bool {
    let css = s.0.to_string();
    css2xpath(&css).ok() == css2xpath(&css).ok()
}

#[quickcheck]
fn prop_one_step_per_term(s: ArbSelector) -> bool {
    let xpath = s.0.to_xpath();
    // Literals never contain "//" here, so the step count is exact.
    xpath.starts_with("//") && xpath.matches("//").count() == s.0.terms().len()
}

#[quickcheck]
fn prop_one_class_predicate_per_class(s: ArbSelector) -> bool {
    let classes: usize = s.0.terms().iter().map(|t| t.classes.len()).sum();
    s.0.to_xpath().matches("normalize-space(@class)").count() == classes
}

#[quickcheck]
fn prop_blank_input_is_empty(spaces: Vec<bool>) -> bool {
    let blank: String = spaces.iter().map(|&b| if b { ' ' } else { '\t' }).collect();
    css2xpath(&blank).is_ok_and(|x| x.is_empty())
}

/// Whitespace written into a class, id or type name through an escape is
/// refused wherever it sits in the name.
#[quickcheck]
fn prop_whitespace_in_a_name_is_malformed(s: ArbSelector, at: usize, pick: u8) -> bool {
    let ws = [' ', '\t', '\n', '\r', '\x0C'][usize::from(pick) % 5];
    let mut terms = s.0.terms().to_vec();
    let Some(last) = terms.last_mut() else {
        return true;
    };
    let mut name = name_of(last);
    let split = name
        .char_indices()
        .map(|(i, _)| i)
        .nth(at % name.chars().count())
        .unwrap_or(0);
    name.insert(split, ws);
    match (last.id.is_some(), last.classes.is_empty()) {
        (true, _) => last.id = Some(name),
        (false, false) => last.classes[0] = name,
        (false, true) => last.element = Some(name),
    }
    let css = Selector::new(terms).to_string();
    matches!(
        parse_selector(&css),
        Err(SelectorError::Malformed {
            reason: Malformed::WhitespaceInName,
            ..
        })
    )
}

fn name_of(term: &CompoundTerm) -> String {
    term.id
        .clone()
        .or_else(|| term.classes.first().cloned())
        .or_else(|| term.element.clone().filter(|e| e != "*"))
        .unwrap_or_else(|| "div".to_string())
}
