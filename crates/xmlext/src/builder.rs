//! Nested construction of documents.

use xmloxide::tree::NodeKind;
use xmloxide::{Attribute, NodeId};

/// Appends children to one parent node. Passed to [`Document::build`] and to
/// the closures of [`Self::node`] and [`Self::node_with`].
///
/// [`Document::build`]: crate::Document::build
#[derive(Debug)]
pub struct NodeBuilder<'t> {
    tree: &'t mut xmloxide::Document,
    parent: NodeId,
}

impl<'t> NodeBuilder<'t> {
    pub(crate) const fn new(tree: &'t mut xmloxide::Document, parent: NodeId) -> Self {
        Self { tree, parent }
    }

    /// The node children are appended to.
    #[must_use]
    pub const fn parent(&self) -> NodeId {
        self.parent
    }

    /// Append an element and build its children.
    pub fn node(&mut self, name: &str, children: impl FnOnce(&mut NodeBuilder<'_>)) {
        self.node_with(name, &[], children);
    }

    /// Append an element with attributes and build its children.
    pub fn node_with(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        children: impl FnOnce(&mut NodeBuilder<'_>),
    ) {
        let id = self.element(name, attrs);
        children(&mut NodeBuilder::new(self.tree, id));
    }

    /// Append an element with attributes and text content.
    pub fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], content: &str) {
        let id = self.element(name, attrs);
        if !content.is_empty() {
            let text = self.tree.create_node(NodeKind::Text {
                content: content.to_string(),
            });
            self.tree.append_child(id, text);
        }
    }

    /// Append a text node.
    pub fn text(&mut self, content: &str) {
        let id = self.tree.create_node(NodeKind::Text {
            content: content.to_string(),
        });
        self.tree.append_child(self.parent, id);
    }

    fn element(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attributes = attrs.iter().map(|&(n, v)| attribute(n, v)).collect();
        let id = self.tree.create_node(element(name, attributes));
        self.tree.append_child(self.parent, id);
        id
    }
}

/// An unprefixed, namespace-less element payload.
pub(crate) fn element(name: &str, attributes: Vec<Attribute>) -> NodeKind {
    NodeKind::Element {
        name: name.to_string(),
        prefix: None,
        namespace: None,
        attributes,
    }
}

pub(crate) fn attribute(name: &str, value: &str) -> Attribute {
    Attribute {
        name: name.to_string(),
        value: value.to_string(),
        prefix: None,
        namespace: None,
        raw_value: None,
    }
}
