//! CSS selector search against parsed documents.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use xmlext::css::{Construct, Malformed, SelectorError};
use xmlext::{Document, Error, NodeRef, Searchable, search};

const TEST1: &str = include_str!("fixtures/test1.html");
const TEST2: &str = include_str!("fixtures/test2.html");

fn html(source: &str) -> Document {
    Document::parse_html(source).unwrap()
}

fn ids(nodes: &[NodeRef<'_>]) -> Vec<String> {
    nodes
        .iter()
        .map(|n| n.attr("id").unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Page scenarios
// =============================================================================

#[test]
fn test_single_class() {
    let doc = html(TEST2);
    let matches = doc.search(".register-nav").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].text(), "Products");
}

#[test]
fn test_class_on_many_elements() {
    let doc = html(TEST2);
    let matches = doc.search(".commentlist_alt").unwrap();
    assert_eq!(matches.len(), 4);
    assert!(matches.iter().all(|m| m.name() == "li"));
    assert_eq!(
        ids(&matches),
        ["comment-1", "comment-3", "comment-5", "comment-7"]
    );
}

#[test]
fn test_heading() {
    let doc = html(TEST2);
    let matches = doc.search("h1").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].text(), "Noble Samurai");
}

#[test]
fn test_universal_matches_every_element() {
    let doc = html(TEST2);
    let all = doc.search("*").unwrap();
    let by_xpath = doc.find("//*").unwrap();
    assert_eq!(all, by_xpath);
    assert_eq!(all[0].name(), "html");
    assert!(all.iter().all(NodeRef::is_element));
}

#[test]
fn test_document_search_first_paragraph() {
    let doc = html(TEST1);
    let p = doc.search("p").unwrap()[0];
    assert_eq!(p.to_string(), "<p>This is a paragraph</p>");
}

#[test]
fn test_element_search() {
    let doc = html(TEST1);
    let body = doc.search("body").unwrap()[0];
    let h1 = body.search("h1").unwrap()[0];
    assert_eq!(h1.to_string(), "<h1>This is my heading</h1>");
}

#[test]
fn test_paragraph_inside_em() {
    let doc = html("<p><em>my par</em></p>");
    let found = doc.search("em").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].to_string(), "<em>my par</em>");
}

// =============================================================================
// Matching rules
// =============================================================================

#[test]
fn test_class_matches_whole_tokens() {
    let doc = html(
        r#"<div class="foobar">1</div><div class="bar foo baz">2</div><div class=" foo ">3</div>"#,
    );
    let texts: Vec<String> = doc.search(".foo").unwrap().iter().map(NodeRef::text).collect();
    assert_eq!(texts, ["2", "3"]);
}

#[test]
fn test_class_boundary_on_page() {
    let doc = html(TEST2);
    let plain = doc.search(".commentlist").unwrap();
    // The list itself and the three non-alternate items.
    assert_eq!(plain.len(), 4);
    assert_eq!(plain[0].name(), "ol");
}

#[test]
fn test_id_is_exact() {
    let doc = html(r#"<p id="abcd">x</p><p id="abc">y</p>"#);
    let found = doc.search("#abc").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text(), "y");

    let page = html(TEST2);
    assert!(page.search("#comment").unwrap().is_empty());
    assert_eq!(page.search("h3#comments").unwrap().len(), 1);
}

#[test]
fn test_descendant_at_any_depth() {
    let doc = html(TEST2);
    assert_eq!(doc.search("#content li p").unwrap().len(), 7);
    assert_eq!(doc.search("div a").unwrap().len(), 4);
    assert_eq!(doc.search("ul a").unwrap().len(), 3);
    assert!(doc.search("#footer li").unwrap().is_empty());
}

#[test]
fn test_compound_needs_every_class() {
    let doc = html(TEST2);
    let found = doc.search("li.current.blog-nav").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text(), "Blog");
    assert!(doc.search("li.current.support-nav").unwrap().is_empty());
}

#[test]
fn test_node_search_stays_below_node() {
    let doc = html(TEST2);
    let post = doc.fetch("#post-42").unwrap().unwrap();
    assert_eq!(post.search("p").unwrap().len(), 3);
    assert_eq!(doc.search("p").unwrap().len(), 11);
    // The node itself is not a descendant of itself.
    assert!(post.search("div").unwrap().is_empty());
}

#[test]
fn test_free_function_and_trait_objects() {
    let doc = html(TEST2);
    let nav = doc.fetch("ul.nav").unwrap().unwrap();

    assert_eq!(search(&doc, "li").unwrap().len(), 10);
    assert_eq!(search(&nav, "li").unwrap().len(), 3);

    let targets: [&dyn Searchable; 2] = [&doc, &nav];
    let counts: Vec<usize> = targets
        .iter()
        .map(|t| t.search("a").unwrap().len())
        .collect();
    assert_eq!(counts, [4, 3]);
}

#[test]
fn test_xml_names_are_case_sensitive() {
    let doc = Document::parse_xml(r#"<Root><Item class="x"/><item class="x"/></Root>"#).unwrap();
    assert_eq!(doc.search("Item.x").unwrap().len(), 1);
    assert_eq!(doc.search("item").unwrap().len(), 1);
    assert_eq!(doc.search("ITEM").unwrap().len(), 0);
}

#[test]
fn test_apostrophe_in_id() {
    let doc = Document::parse_xml(r#"<r><a id="it's"/><a id="its"/></r>"#).unwrap();
    let found = doc.search(r"#it\'s").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].attr("id"), Some("it's"));
}

// =============================================================================
// Errors and empty selectors
// =============================================================================

#[test]
fn test_blank_selector_matches_nothing() {
    let doc = html(TEST2);
    assert!(doc.search("").unwrap().is_empty());
    assert!(doc.search("   ").unwrap().is_empty());
    assert!(doc.fetch("").unwrap().is_none());
}

#[test]
fn test_unsupported_selector_is_an_error() {
    let doc = html(TEST2);
    for (selector, construct) in [
        ("ul > li", Construct::ChildCombinator),
        ("a[href]", Construct::AttributeSelector),
        ("li:first-child", Construct::PseudoClass),
        ("h1, h2", Construct::SelectorList),
    ] {
        match doc.search(selector) {
            Err(Error::Selector(SelectorError::UnsupportedSyntax { construct: c, .. })) => {
                assert_eq!(c, construct, "{selector}");
            }
            other => panic!("{selector}: expected unsupported syntax, got {other:?}"),
        }
    }
}

#[test]
fn test_malformed_selector_is_an_error() {
    let doc = html(TEST2);
    assert!(matches!(
        doc.search("div.").unwrap_err(),
        Error::Selector(SelectorError::Malformed { .. })
    ));
}

#[test]
fn test_escaped_whitespace_class_never_spans_two_classes() {
    let doc = html(r#"<p class="a b">x</p><p class="a">y</p>"#);
    for selector in [r".a\ b", r"p.a\9 b", r".a\20 b"] {
        match doc.search(selector) {
            Err(Error::Selector(SelectorError::Malformed { reason, .. })) => {
                assert_eq!(reason, Malformed::WhitespaceInName, "{selector}");
            }
            other => panic!("{selector}: expected a malformed selector, got {other:?}"),
        }
    }
    assert_eq!(doc.search(".a.b").unwrap().len(), 1);
    assert_eq!(doc.search(".a").unwrap().len(), 2);
}

#[test]
fn test_raw_non_ascii_class_is_an_error() {
    let doc = html(r#"<p class="café">x</p>"#);
    assert!(matches!(
        doc.search(".café").unwrap_err(),
        Error::Selector(SelectorError::Malformed {
            reason: Malformed::UnexpectedCharacter('é'),
            ..
        })
    ));
    assert_eq!(doc.search(r".caf\e9").unwrap().len(), 1);
}

#[test]
fn test_xpath_returning_a_value_is_not_a_search_result() {
    let doc = html(TEST2);
    assert!(matches!(
        doc.find("count(//li)").unwrap_err(),
        Error::NotANodeSet { found: "number", .. }
    ));
    assert!(matches!(
        doc.find("name(//li)").unwrap_err(),
        Error::NotANodeSet { found: "string", .. }
    ));
}

// =============================================================================
// Properties
// =============================================================================

const PAGE_CLASSES: &[&str] = &[
    "register-nav",
    "support-nav",
    "blog-nav",
    "current",
    "nav",
    "commentlist",
    "commentlist_alt",
    "post",
    "title",
    "copyright",
    "logo",
    "single",
];

/// Class search agrees with the elements' own class token sets, for class
/// names on the page and for arbitrary ones.
#[quickcheck]
fn prop_class_search_matches_class_tokens(pick: usize, extra: String) -> TestResult {
    let extra: String = extra
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if extra.is_empty() || extra.starts_with('-') {
        return TestResult::discard();
    }

    let doc = html(TEST2);
    let tree = doc.tree();
    for class in [PAGE_CLASSES[pick % PAGE_CLASSES.len()], extra.as_str()] {
        let found: Vec<_> = doc
            .search(&format!(".{class}"))
            .unwrap()
            .iter()
            .map(NodeRef::id)
            .collect();
        let expected: Vec<_> = tree
            .descendants(tree.root())
            .filter(|&id| {
                tree.attribute(id, "class")
                    .is_some_and(|value| value.split_ascii_whitespace().any(|t| t == class))
            })
            .collect();
        if found != expected {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}
