//! CSS selector search over HTML and XML documents.
//!
//! # Scope
//!
//! This crate provides:
//! - **Documents** - parse HTML or XML, or build one node by node
//! - **Node handles** - read through [`NodeRef`], mutate through [`NodeMut`]
//! - **Search** - XPath via [`Document::find`], CSS selectors via
//!   [`Searchable::search`] and the free [`search`] function
//! - **Extensions** - typed per-node values that outlive any handle
//!
//! Parsing, the tree, XPath evaluation and serialization come from
//! [`xmloxide`]. Selectors are compiled by [`css::css2xpath`]; document-level
//! search runs the compiled expression as is, node-level search prefixes it
//! with `.` so it stays below the node.
//!
//! # Example
//!
//! ```
//! use xmlext::Document;
//!
//! let doc = Document::parse_html(
//!     r#"<ul class="menu"><li class="item">One</li><li class="item on">Two</li></ul>"#,
//! )
//! .unwrap();
//! let on = doc.search("li.item.on").unwrap();
//! assert_eq!(on.len(), 1);
//! assert_eq!(on[0].text(), "Two");
//!
//! let menu = doc.fetch("ul").unwrap().unwrap();
//! assert_eq!(xmlext::search(&menu, ".item").unwrap().len(), 2);
//! ```

mod builder;
mod document;
mod error;
mod extensions;
mod node;
mod parse;
mod search;

pub use xmlext_css as css;
pub use xmloxide;

pub use builder::NodeBuilder;
pub use document::{Document, DocumentKind};
pub use error::Error;
pub use node::{NodeKind, NodeMut, NodeRef};
pub use parse::ParseOptions;
pub use search::{Searchable, search};

pub use xmlext_css::css2xpath;
pub use xmloxide::xpath::XPathValue;
pub use xmloxide::{Attribute, NodeId};
