//! CSS selector search as a capability.

use crate::Error;
use crate::node::NodeRef;

/// Something a CSS selector can be run against.
///
/// A [`Document`](crate::Document) searches the whole tree; a [`NodeRef`]
/// searches below its node only.
pub trait Searchable {
    /// Elements matching `selector`, in document order. A blank selector
    /// matches nothing.
    ///
    /// # Errors
    ///
    /// [`Error::Selector`] for selectors outside the supported subset.
    fn search(&self, selector: &str) -> Result<Vec<NodeRef<'_>>, Error>;
}

/// Run `selector` against a document or node.
///
/// # Errors
///
/// As [`Searchable::search`].
pub fn search<'s, S>(target: &'s S, selector: &str) -> Result<Vec<NodeRef<'s>>, Error>
where
    S: Searchable + ?Sized,
{
    target.search(selector)
}
