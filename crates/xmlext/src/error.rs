use thiserror::Error;
use xmloxide::NodeId;
use xmloxide::error::ParseError;
use xmloxide::xpath::XPathError;
use xmlext_css::SelectorError;

/// Errors from document operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A CSS selector could not be compiled.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// An XPath expression could not be parsed or evaluated.
    #[error(transparent)]
    XPath(#[from] XPathError),

    /// A document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An expression passed to a node search evaluated to a number, string
    /// or boolean.
    #[error("{expression:?} evaluates to a {found}, not a node-set")]
    NotANodeSet {
        /// The expression as given.
        expression: String,
        /// The XPath type it produced.
        found: &'static str,
    },

    /// The id does not name a node of this document.
    #[error("no node with id {0:?} in this document")]
    UnknownNode(NodeId),

    /// An element-only operation on another kind of node.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    ///
    /// "If node is a host-including inclusive ancestor of parent, then throw
    /// a HierarchyRequestError"
    #[error("cannot insert node {child:?} under {parent:?}")]
    HierarchyRequest {
        /// The would-be parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },
}
