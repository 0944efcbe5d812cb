//! Parser configuration.
//!
//! Both dialects are parsed by xmloxide. HTML goes through its libxml2-style
//! recovering parser, which lowercases names, adds the implied `html` and
//! `body` elements and a default doctype. XML must be well-formed.

use xmloxide::html::{HtmlParseOptions, parse_html_with_options};
use xmloxide::parser::{ParseOptions as XmlParseOptions, parse_str_with_options};
use xmloxide::tree::NodeKind;
use xmloxide::{Document, NodeId};

use crate::Error;

/// What the parsers keep besides elements and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep comment nodes.
    pub keep_comments: bool,
    /// Keep text nodes that hold only whitespace.
    pub keep_whitespace_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            keep_comments: true,
            keep_whitespace_text: true,
        }
    }
}

impl ParseOptions {
    /// Drop comments and whitespace-only text.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            keep_comments: false,
            keep_whitespace_text: false,
        }
    }
}

pub(crate) fn html(source: &str, options: ParseOptions) -> Result<Document, Error> {
    let html_options = HtmlParseOptions::default().no_blanks(!options.keep_whitespace_text);
    let mut doc = parse_html_with_options(source, &html_options)?;
    if !doc.diagnostics.is_empty() {
        tracing::debug!(repairs = doc.diagnostics.len(), "HTML input was repaired");
    }
    finish(&mut doc, options);
    Ok(doc)
}

pub(crate) fn xml(source: &str, options: ParseOptions) -> Result<Document, Error> {
    let xml_options = XmlParseOptions::default().no_blanks(!options.keep_whitespace_text);
    let mut doc = parse_str_with_options(source, &xml_options)?;
    finish(&mut doc, options);
    Ok(doc)
}

fn finish(doc: &mut Document, options: ParseOptions) {
    if options.keep_comments {
        return;
    }
    let comments: Vec<NodeId> = doc
        .descendants(doc.root())
        .filter(|&id| matches!(doc.node(id).kind, NodeKind::Comment { .. }))
        .collect();
    tracing::trace!(count = comments.len(), "dropping comments");
    for id in comments {
        doc.detach(id);
    }
}
