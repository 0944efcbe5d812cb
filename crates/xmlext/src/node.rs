//! Read and write handles onto document nodes.
//!
//! A handle is a document borrow plus a [`NodeId`]. Handles are cheap and
//! short-lived; anything that must outlive one (the node's identity, its
//! extension values) lives in the document, so fetching the same node again
//! yields an equal handle.

use std::any::Any;
use std::fmt;

use strum_macros::Display;
use xmloxide::tree::{self, NodeData};
use xmloxide::{Attribute, NodeId};

use crate::builder::attribute;
use crate::document::{Document, DocumentKind, qualified_name};
use crate::search::Searchable;
use crate::Error;

/// The kind of a node, displayed the way libxml names node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    /// The document node.
    Document,
    /// `<!DOCTYPE …>`
    #[strum(serialize = "dtd")]
    Doctype,
    /// An element.
    Element,
    /// Character data.
    Text,
    /// A CDATA section.
    #[strum(serialize = "cdata")]
    CData,
    /// A comment.
    Comment,
    /// A processing instruction.
    #[strum(serialize = "pi")]
    ProcessingInstruction,
    /// An unexpanded entity reference.
    #[strum(serialize = "entity_ref")]
    EntityReference,
}

impl From<&tree::NodeKind> for NodeKind {
    fn from(kind: &tree::NodeKind) -> Self {
        match kind {
            tree::NodeKind::Document => Self::Document,
            tree::NodeKind::DocumentType { .. } => Self::Doctype,
            tree::NodeKind::Element { .. } => Self::Element,
            tree::NodeKind::Text { .. } => Self::Text,
            tree::NodeKind::CData { .. } => Self::CData,
            tree::NodeKind::Comment { .. } => Self::Comment,
            tree::NodeKind::ProcessingInstruction { .. } => Self::ProcessingInstruction,
            tree::NodeKind::EntityRef { .. } => Self::EntityReference,
        }
    }
}

/// Read handle on one node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> NodeRef<'a> {
    pub(crate) const fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    /// The node's id. Ids stay valid for the life of the document, across
    /// renames and attribute edits.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The owning document.
    #[must_use]
    pub const fn document(&self) -> &'a Document {
        self.doc
    }

    fn data(&self) -> &'a NodeData {
        self.doc.tree().node(self.id)
    }

    /// Qualified tag name for elements, doctype name for doctypes, target
    /// for processing instructions, and `#text`, `#cdata-section`,
    /// `#comment` or `#document` otherwise.
    #[must_use]
    pub fn name(&self) -> String {
        match &self.data().kind {
            tree::NodeKind::Element { name, prefix, .. } => {
                qualified_name(prefix.as_deref(), name)
            }
            tree::NodeKind::DocumentType { name, .. } | tree::NodeKind::EntityRef { name, .. } => {
                name.clone()
            }
            tree::NodeKind::ProcessingInstruction { target, .. } => target.clone(),
            tree::NodeKind::Text { .. } => "#text".to_string(),
            tree::NodeKind::CData { .. } => "#cdata-section".to_string(),
            tree::NodeKind::Comment { .. } => "#comment".to_string(),
            tree::NodeKind::Document => "#document".to_string(),
        }
    }

    /// The kind of node; displays as `"element"`, `"text"`, `"comment"`,
    /// `"document"`, `"dtd"` and so on.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        NodeKind::from(&self.data().kind)
    }

    /// An attribute by name. HTML documents match names case-insensitively.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.doc.attribute(self.id, name).map(|a| a.value.as_str())
    }

    /// All attributes in source order; empty for non-elements.
    #[must_use]
    pub fn attrs(&self) -> &'a [Attribute] {
        self.doc.tree().attributes(self.id)
    }

    /// The text content: concatenated descendant text for elements and the
    /// document, the data for text, comment and processing-instruction nodes.
    #[must_use]
    pub fn text(&self) -> String {
        let tree = self.doc.tree();
        tree.node_text(self.id)
            .map_or_else(|| tree.text_content(self.id), str::to_string)
    }

    /// Children in order.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Self> {
        self.doc
            .tree()
            .children(self.id)
            .map(|id| Self::new(self.doc, id))
            .collect()
    }

    /// The parent, or `None` for the document node and detached nodes.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.doc.tree().parent(self.id).map(|id| Self::new(self.doc, id))
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    /// Serialized children (`innerHTML`).
    #[must_use]
    pub fn inner_markup(&self) -> String {
        self.doc
            .tree()
            .children(self.id)
            .map(|id| self.doc.markup(id))
            .collect()
    }

    /// Nodes matched by an XPath expression with this node as context.
    ///
    /// # Errors
    ///
    /// As [`Document::find`].
    pub fn find(&self, xpath: &str) -> Result<Vec<Self>, Error> {
        self.doc.find_from(self.id, xpath)
    }

    /// The first node matched by an XPath expression.
    ///
    /// # Errors
    ///
    /// As [`Self::find`].
    pub fn get(&self, xpath: &str) -> Result<Option<Self>, Error> {
        Ok(self.find(xpath)?.into_iter().next())
    }

    /// Descendant elements matching a CSS selector.
    ///
    /// # Errors
    ///
    /// [`Error::Selector`] for selectors outside the supported subset.
    pub fn search(&self, selector: &str) -> Result<Vec<Self>, Error> {
        let xpath = xmlext_css::css2xpath(selector)?;
        self.doc.run_compiled(self.id, &xpath)
    }

    /// A value previously stored with [`NodeMut::set_extension`].
    #[must_use]
    pub fn extension<T: Any>(&self, key: &str) -> Option<&'a T> {
        self.doc.extensions().get(self.id, key)
    }
}

impl Searchable for NodeRef<'_> {
    fn search(&self, selector: &str) -> Result<Vec<NodeRef<'_>>, Error> {
        NodeRef::search(self, selector)
    }
}

/// Outer markup in the document's dialect. The document node serializes
/// like [`Document`]'s `Display`.
impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.doc.markup(self.id))
    }
}

/// Write handle on one node.
#[derive(Debug)]
pub struct NodeMut<'a> {
    doc: &'a mut Document,
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    pub(crate) const fn new(doc: &'a mut Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    /// The node's current id.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Reborrow as a read handle.
    #[must_use]
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        NodeRef::new(self.doc, self.id)
    }

    /// Rename an element, keeping its attributes and children.
    ///
    /// # Errors
    ///
    /// [`Error::NotAnElement`] for other node kinds.
    pub fn set_name(&mut self, name: &str) -> Result<&mut Self, Error> {
        let name = match self.doc.kind() {
            DocumentKind::Html => name.to_ascii_lowercase(),
            DocumentKind::Xml => name.to_string(),
        };
        let (id, ()) = self.doc.edit_element(self.id, |local, prefix, _| {
            *local = name;
            *prefix = None;
        })?;
        self.id = id;
        Ok(self)
    }

    /// Set an attribute, replacing an existing value in place.
    ///
    /// # Errors
    ///
    /// [`Error::NotAnElement`] for other node kinds.
    pub fn set_attr(&mut self, name: &str, value: &str) -> Result<&mut Self, Error> {
        let position = self.attr_position(name);
        let written = self.doc.attribute_name(name);
        let (id, ()) = self.doc.edit_element(self.id, |_, _, attrs| match position {
            Some(i) => {
                attrs[i].value = value.to_string();
                attrs[i].raw_value = None;
            }
            None => attrs.push(attribute(&written, value)),
        })?;
        self.id = id;
        Ok(self)
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let position = self.attr_position(name)?;
        let (id, removed) = self
            .doc
            .edit_element(self.id, |_, _, attrs| attrs.remove(position))
            .ok()?;
        self.id = id;
        Some(removed.value)
    }

    /// Remove every attribute, returning them in their former order.
    pub fn remove_attrs(&mut self) -> Vec<Attribute> {
        if self.doc.tree().attributes(self.id).is_empty() {
            return Vec::new();
        }
        match self
            .doc
            .edit_element(self.id, |_, _, attrs| std::mem::take(attrs))
        {
            Ok((id, removed)) => {
                self.id = id;
                removed
            }
            Err(_) => Vec::new(),
        }
    }

    /// Append `child` as the last child, detaching it from wherever it was.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownNode`] if `child` does not exist,
    /// [`Error::HierarchyRequest`] if this node cannot hold children or
    /// `child` is this node or one of its ancestors.
    pub fn add_child(&mut self, child: NodeId) -> Result<&mut Self, Error> {
        let Some(child) = self.doc.resolve(child) else {
            return Err(Error::UnknownNode(child));
        };
        let tree = self.doc.tree();
        let holds_children = matches!(
            tree.node(self.id).kind,
            tree::NodeKind::Element { .. } | tree::NodeKind::Document
        );
        let cyclic = tree.ancestors(self.id).any(|a| a == child);
        if !holds_children || cyclic || child == tree.root() {
            return Err(Error::HierarchyRequest {
                parent: self.id,
                child,
            });
        }
        let tree = self.doc.tree_mut();
        tree.detach(child);
        tree.append_child(self.id, child);
        Ok(self)
    }

    /// Detach this node from its parent. The node and its subtree stay
    /// allocated and can be re-attached with [`Self::add_child`].
    pub fn remove(self) -> NodeId {
        self.doc.tree_mut().detach(self.id);
        self.id
    }

    /// Store a typed value under `key`, replacing any previous value.
    /// Returns `true` if a value was replaced.
    pub fn set_extension<T: Any + Send + Sync>(&mut self, key: &str, value: T) -> bool {
        self.doc.extensions_mut().insert(self.id, key, value)
    }

    /// Remove a stored value. Returns `true` if one was present.
    pub fn remove_extension(&mut self, key: &str) -> bool {
        self.doc.extensions_mut().remove(self.id, key)
    }

    /// Index of the attribute `name` matches under the document's case rules.
    fn attr_position(&self, name: &str) -> Option<usize> {
        let found = self.doc.attribute(self.id, name)?;
        self.doc
            .tree()
            .attributes(self.id)
            .iter()
            .position(|a| std::ptr::eq(a, found))
    }
}
