//! The document: an xmloxide tree plus the markup dialect it came from.
//!
//! xmloxide exposes element payloads read-only, so renaming an element or
//! editing its attributes swaps in a replacement node carrying the edited
//! payload and the same children. The old id forwards to the new one; every
//! id handed to this module is resolved through the forwarding table first,
//! which keeps the ids callers hold valid across edits.

use std::collections::HashMap;
use std::fmt;

use xmloxide::serial::html::serialize_html;
use xmloxide::serial::serialize;
use xmloxide::tree::NodeKind;
use xmloxide::xpath::{self, XPathValue};
use xmloxide::{Attribute, NodeId};

use crate::builder::{NodeBuilder, attribute, element};
use crate::extensions::Extensions;
use crate::node::{NodeMut, NodeRef};
use crate::parse::{self, ParseOptions};
use crate::search::Searchable;
use crate::Error;

/// Which parser produced a document, and so how it serializes and how
/// attribute names are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    /// Parsed as HTML: attribute names are ASCII case-insensitive.
    Html,
    /// Parsed or built as XML: names are case-sensitive.
    #[default]
    Xml,
}

/// An HTML or XML document.
#[derive(Debug)]
pub struct Document {
    tree: xmloxide::Document,
    kind: DocumentKind,
    extensions: Extensions,
    forwards: HashMap<NodeId, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty XML document declaring UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = xmloxide::Document::new();
        tree.encoding = Some("UTF-8".to_string());
        Self::from_tree(tree, DocumentKind::Xml)
    }

    /// Build an XML document node by node.
    ///
    /// ```
    /// use xmlext::Document;
    ///
    /// let doc = Document::build(|b| {
    ///     b.node("root", |b| {
    ///         b.leaf("child", &[("foo", "bar")], "text");
    ///     });
    /// });
    /// assert_eq!(
    ///     doc.to_string(),
    ///     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><child foo=\"bar\">text</child></root>\n"
    /// );
    /// ```
    #[must_use]
    pub fn build(f: impl FnOnce(&mut NodeBuilder<'_>)) -> Self {
        let mut doc = Self::new();
        let root = doc.tree.root();
        f(&mut NodeBuilder::new(&mut doc.tree, root));
        doc
    }

    /// Parse HTML, repairing malformed markup the way libxml2 does.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] only for input the recovering parser gives up on,
    /// such as nesting beyond its depth limit.
    pub fn parse_html(html: &str) -> Result<Self, Error> {
        Self::parse_html_with(html, ParseOptions::default())
    }

    /// Parse HTML with explicit [`ParseOptions`].
    ///
    /// # Errors
    ///
    /// As [`Self::parse_html`].
    pub fn parse_html_with(html: &str, options: ParseOptions) -> Result<Self, Error> {
        Ok(Self::from_tree(parse::html(html, options)?, DocumentKind::Html))
    }

    /// Parse a well-formed XML document.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] describing the first well-formedness error.
    pub fn parse_xml(xml: &str) -> Result<Self, Error> {
        Self::parse_xml_with(xml, ParseOptions::default())
    }

    /// Parse XML with explicit [`ParseOptions`].
    ///
    /// # Errors
    ///
    /// As [`Self::parse_xml`].
    pub fn parse_xml_with(xml: &str, options: ParseOptions) -> Result<Self, Error> {
        Ok(Self::from_tree(parse::xml(xml, options)?, DocumentKind::Xml))
    }

    /// Wrap a tree produced elsewhere.
    #[must_use]
    pub fn from_tree(tree: xmloxide::Document, kind: DocumentKind) -> Self {
        Self {
            tree,
            kind,
            extensions: Extensions::default(),
            forwards: HashMap::new(),
        }
    }

    /// The markup dialect.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &xmloxide::Document {
        &self.tree
    }

    /// The document node.
    #[must_use]
    pub fn document_node(&self) -> NodeRef<'_> {
        NodeRef::new(self, self.tree.root())
    }

    /// The document element (`<html>` for HTML), if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.tree.root_element().map(|id| NodeRef::new(self, id))
    }

    /// The document node's children: doctype, comments and the document
    /// element.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<NodeRef<'_>> {
        self.document_node().child_nodes()
    }

    /// A read handle, if `id` names a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.resolve(id).map(|id| NodeRef::new(self, id))
    }

    /// A write handle, if `id` names a node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        let id = self.resolve(id)?;
        Some(NodeMut::new(self, id))
    }

    /// Create a detached element with `attrs` and, when `content` is not
    /// empty, a single text child. Attach it with [`NodeMut::add_child`].
    pub fn create_element(&mut self, name: &str, attrs: &[(&str, &str)], content: &str) -> NodeId {
        let attributes = attrs
            .iter()
            .map(|&(name, value)| attribute(&self.attribute_name(name), value))
            .collect();
        let name = match self.kind {
            DocumentKind::Html => name.to_ascii_lowercase(),
            DocumentKind::Xml => name.to_string(),
        };
        let id = self.tree.create_node(element(&name, attributes));
        if !content.is_empty() {
            let text = self.create_text(content);
            self.tree.append_child(id, text);
        }
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_node(NodeKind::Text {
            content: content.to_string(),
        })
    }

    /// Nodes matched by an XPath expression evaluated at the document node,
    /// in document order.
    ///
    /// # Errors
    ///
    /// [`Error::XPath`] if the expression is invalid, [`Error::NotANodeSet`]
    /// if it yields another type. Attributes are not nodes here: test them in
    /// predicates and read values with [`NodeRef::attr`].
    pub fn find(&self, xpath: &str) -> Result<Vec<NodeRef<'_>>, Error> {
        self.find_from(self.tree.root(), xpath)
    }

    /// The first node matched by an XPath expression.
    ///
    /// # Errors
    ///
    /// As [`Self::find`].
    pub fn get(&self, xpath: &str) -> Result<Option<NodeRef<'_>>, Error> {
        Ok(self.find(xpath)?.into_iter().next())
    }

    /// Evaluate an XPath expression of any result type at the document node.
    ///
    /// # Errors
    ///
    /// [`Error::XPath`] if the expression is invalid.
    pub fn evaluate(&self, xpath: &str) -> Result<XPathValue, Error> {
        Ok(xpath::evaluate(&self.tree, self.tree.root(), xpath)?)
    }

    /// Elements matching a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// [`Error::Selector`] for selectors outside the supported subset.
    pub fn search(&self, selector: &str) -> Result<Vec<NodeRef<'_>>, Error> {
        let xpath = xmlext_css::css2xpath(selector)?;
        self.run_compiled(self.tree.root(), &xpath)
    }

    /// The first element matching a CSS selector.
    ///
    /// # Errors
    ///
    /// As [`Self::search`].
    pub fn fetch(&self, selector: &str) -> Result<Option<NodeRef<'_>>, Error> {
        Ok(self.search(selector)?.into_iter().next())
    }

    pub(crate) fn find_from(&self, context: NodeId, expression: &str) -> Result<Vec<NodeRef<'_>>, Error> {
        let mut nodes = match xpath::evaluate(&self.tree, context, expression)? {
            XPathValue::NodeSet(nodes) => nodes,
            other => {
                return Err(Error::NotANodeSet {
                    expression: expression.to_string(),
                    found: other.type_name(),
                });
            }
        };
        self.sort_document_order(&mut nodes);
        Ok(nodes.into_iter().map(|id| NodeRef::new(self, id)).collect())
    }

    /// Run a compiled selector at `context`, anchoring it below a non-document
    /// node. An empty compiled selector matches nothing.
    pub(crate) fn run_compiled(
        &self,
        context: NodeId,
        compiled: &str,
    ) -> Result<Vec<NodeRef<'_>>, Error> {
        if compiled.is_empty() {
            return Ok(Vec::new());
        }
        let found = if context == self.tree.root() {
            self.find_from(context, compiled)?
        } else {
            self.find_from(context, &format!(".{compiled}"))?
        };
        tracing::debug!(
            compiled,
            context = context.into_raw(),
            matched = found.len(),
            "selector search"
        );
        Ok(found)
    }

    /// The live id for `id`, following replacements; `None` if `id` was
    /// never allocated in this document.
    pub(crate) fn resolve(&self, id: NodeId) -> Option<NodeId> {
        let mut id = id;
        while let Some(&next) = self.forwards.get(&id) {
            id = next;
        }
        let allocated = usize::try_from(id.into_raw()).is_ok_and(|raw| raw <= self.tree.node_count());
        allocated.then_some(id)
    }

    /// Attribute lookup honoring the document's case rules.
    pub(crate) fn attribute(&self, id: NodeId, name: &str) -> Option<&Attribute> {
        self.tree
            .attributes(id)
            .iter()
            .find(|a| self.name_matches(&qualified_name(a.prefix.as_deref(), &a.name), name))
    }

    /// Normalize an attribute name for writing.
    pub(crate) fn attribute_name(&self, name: &str) -> String {
        match self.kind {
            DocumentKind::Html => name.to_ascii_lowercase(),
            DocumentKind::Xml => name.to_string(),
        }
    }

    fn name_matches(&self, have: &str, want: &str) -> bool {
        match self.kind {
            DocumentKind::Html => have.eq_ignore_ascii_case(want),
            DocumentKind::Xml => have == want,
        }
    }

    /// Replace element `id` with a copy whose name and attributes went
    /// through `edit`, and return the copy's id.
    pub(crate) fn edit_element<R>(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut String, &mut Option<String>, &mut Vec<Attribute>) -> R,
    ) -> Result<(NodeId, R), Error> {
        let mut kind = self.tree.node(id).kind.clone();
        let NodeKind::Element {
            name,
            prefix,
            attributes,
            ..
        } = &mut kind
        else {
            return Err(Error::NotAnElement(id));
        };
        let out = edit(name, prefix, attributes);

        let replacement = self.tree.create_node(kind);
        if self.tree.parent(id).is_some() {
            self.tree.insert_before(id, replacement);
        }
        let children: Vec<NodeId> = self.tree.children(id).collect();
        for child in children {
            self.tree.detach(child);
            self.tree.append_child(replacement, child);
        }
        self.tree.detach(id);

        let _ = self.forwards.insert(id, replacement);
        self.extensions.rekey(id, replacement);
        tracing::trace!(
            from = id.into_raw(),
            to = replacement.into_raw(),
            "element payload replaced"
        );
        Ok((replacement, out))
    }

    pub(crate) const fn tree_mut(&mut self) -> &mut xmloxide::Document {
        &mut self.tree
    }

    pub(crate) const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub(crate) const fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// XPath results come back in arena order, which stops matching document
    /// order once nodes are moved or replaced.
    fn sort_document_order(&self, nodes: &mut [NodeId]) {
        let Some(&first) = nodes.first() else {
            return;
        };
        if nodes.len() == 1 {
            return;
        }
        let top = self.tree.ancestors(first).last().unwrap_or(first);
        let rank: HashMap<NodeId, usize> = std::iter::once(top)
            .chain(self.tree.descendants(top))
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        nodes.sort_by_key(|id| rank.get(id).copied().unwrap_or(usize::MAX));
    }

    /// Outer markup of one node in the document's dialect.
    pub(crate) fn markup(&self, id: NodeId) -> String {
        if id == self.tree.root() {
            return self.to_string();
        }
        let mut fragment = xmloxide::Document::new();
        fragment.encoding = Some("UTF-8".to_string());
        let root = fragment.root();
        copy_subtree(&self.tree, id, &mut fragment, root);

        match self.kind {
            DocumentKind::Html => {
                let mut out = serialize_html(&fragment);
                let _ = out.pop();
                out
            }
            DocumentKind::Xml => {
                let out = serialize(&fragment);
                let body = out.split_once("?>\n").map_or(out.as_str(), |(_, body)| body);
                body.strip_suffix('\n').unwrap_or(body).to_string()
            }
        }
    }
}

impl Searchable for Document {
    fn search(&self, selector: &str) -> Result<Vec<NodeRef<'_>>, Error> {
        Self::search(self, selector)
    }
}

/// The whole document: XML with the declaration first, HTML with its
/// doctype.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DocumentKind::Html => f.write_str(&serialize_html(&self.tree)),
            DocumentKind::Xml => f.write_str(&serialize(&self.tree)),
        }
    }
}

pub(crate) fn qualified_name(prefix: Option<&str>, local: &str) -> String {
    prefix.map_or_else(|| local.to_string(), |p| format!("{p}:{local}"))
}

fn copy_subtree(src: &xmloxide::Document, id: NodeId, dst: &mut xmloxide::Document, parent: NodeId) {
    let copy = dst.create_node(src.node(id).kind.clone());
    dst.append_child(parent, copy);
    for child in src.children(id) {
        copy_subtree(src, child, dst, copy);
    }
}
