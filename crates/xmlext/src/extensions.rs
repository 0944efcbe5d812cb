//! Per-node extension data.
//!
//! Callers attach typed values to a node under a string key. The table is
//! owned by the [`Document`](crate::Document) and keyed by [`NodeId`], so a
//! value is visible again when the node is found by a later search and stays
//! with a detached node until the document is dropped.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use xmloxide::NodeId;

type Slot = Box<dyn Any + Send + Sync>;

/// Side table of typed values attached to nodes.
#[derive(Default)]
pub struct Extensions {
    slots: HashMap<NodeId, HashMap<String, Slot>>,
}

impl Extensions {
    /// Attach `value` to `node` under `key`. Returns `true` if a previous
    /// value was replaced.
    pub fn insert<T>(&mut self, node: NodeId, key: &str, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        tracing::trace!(node = node.into_raw(), key, "set node extension");
        self.slots
            .entry(node)
            .or_default()
            .insert(key.to_string(), Box::new(value))
            .is_some()
    }

    /// The value under `key`, if present and of type `T`.
    #[must_use]
    pub fn get<T: Any>(&self, node: NodeId, key: &str) -> Option<&T> {
        self.slots.get(&node)?.get(key)?.downcast_ref::<T>()
    }

    /// Whether anything is stored under `key`, whatever its type.
    #[must_use]
    pub fn contains(&self, node: NodeId, key: &str) -> bool {
        self.slots.get(&node).is_some_and(|m| m.contains_key(key))
    }

    /// Remove the value under `key`. Returns `true` if one was present.
    pub fn remove(&mut self, node: NodeId, key: &str) -> bool {
        let Some(map) = self.slots.get_mut(&node) else {
            return false;
        };
        let removed = map.remove(key).is_some();
        if map.is_empty() {
            let _ = self.slots.remove(&node);
        }
        removed
    }

    /// Move every value of `from` over to `to`.
    pub(crate) fn rekey(&mut self, from: NodeId, to: NodeId) {
        if let Some(map) = self.slots.remove(&from) {
            let _ = self.slots.insert(to, map);
        }
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (node, slots) in &self.slots {
            let keys: Vec<&str> = slots.keys().map(String::as_str).collect();
            let _ = map.entry(&node.into_raw(), &keys);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> NodeId {
        NodeId::from_raw(raw).unwrap()
    }

    #[test]
    fn test_typed_lookup() {
        let mut ext = Extensions::default();
        assert!(!ext.insert(id(3), "mystuff", String::from("hello")));
        assert_eq!(
            ext.get::<String>(id(3), "mystuff").map(String::as_str),
            Some("hello")
        );
        assert!(ext.get::<u32>(id(3), "mystuff").is_none());
        assert!(ext.contains(id(3), "mystuff"));
        assert!(ext.get::<String>(id(4), "mystuff").is_none());
    }

    #[test]
    fn test_replace_and_remove() {
        let mut ext = Extensions::default();
        let _ = ext.insert(id(1), "k", 1_i32);
        assert!(ext.insert(id(1), "k", 2_i32));
        assert_eq!(ext.get::<i32>(id(1), "k"), Some(&2));
        assert!(ext.remove(id(1), "k"));
        assert!(!ext.remove(id(1), "k"));
        assert!(!ext.contains(id(1), "k"));
    }

    #[test]
    fn test_rekey_moves_all_values() {
        let mut ext = Extensions::default();
        let _ = ext.insert(id(2), "a", 1_u8);
        let _ = ext.insert(id(2), "b", "two");
        ext.rekey(id(2), id(9));
        assert!(!ext.contains(id(2), "a"));
        assert_eq!(ext.get::<u8>(id(9), "a"), Some(&1));
        assert_eq!(ext.get::<&str>(id(9), "b"), Some(&"two"));
    }
}
