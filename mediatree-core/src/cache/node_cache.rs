//! Node cache
//!
//! Registry of navigation nodes keyed by item identity. Holds at most one
//! live node per item, so every screen, stack entry and parent that refers to
//! an item shares the same [`NodeRef`] and sees its updates.
//!
//! There is no eviction. A cache lives for one session scope and the library
//! behind a session is bounded; the whole scope is dropped on reset.

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::models::{classify, ItemId, NodeId, NodeKind, RawItem};
use crate::tree::{MediaTreeNode, NodeRef};

#[derive(Debug)]
pub struct NodeCache {
    scope: u64,
    this: Weak<NodeCache>,
    root: NodeRef,
    nodes: DashMap<ItemId, NodeRef>,
}

impl NodeCache {
    /// Create an empty cache for the given session scope.
    ///
    /// Every node it hands out remembers this cache (weakly) and its scope.
    #[must_use]
    pub fn new(scope: u64) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| Self {
            scope,
            this: this.clone(),
            root: Arc::new(MediaTreeNode::attached(this.clone(), scope, NodeId::root(), NodeKind::Root)),
            nodes: DashMap::new(),
        })
    }

    /// Session scope this cache belongs to
    #[must_use]
    pub const fn scope(&self) -> u64 {
        self.scope
    }

    /// The library root of this scope
    #[must_use]
    pub fn root(&self) -> NodeRef {
        self.root.clone()
    }

    /// Canonical node for a raw item.
    ///
    /// An existing node is returned unchanged and `raw` is ignored; fresher
    /// data goes through the loader's detail refresh, never re-insertion.
    pub fn node_for(&self, raw: RawItem) -> NodeRef {
        let key = ItemId::from(raw.id.as_str());
        self.nodes
            .entry(key)
            .or_insert_with(|| {
                let kind = classify(Some(&raw));
                let id = match kind {
                    NodeKind::Unknown => NodeId::synthetic(),
                    _ => NodeId::from(&ItemId::from(raw.id.as_str())),
                };
                tracing::trace!(scope = self.scope, node_id = %id, kind = kind.label(), "Caching node");
                Arc::new(MediaTreeNode::attached(self.this.clone(), self.scope, id, kind))
            })
            .value()
            .clone()
    }

    /// Look up a node without inserting
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<NodeRef> {
        self.nodes.get(id).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of cached item nodes (the root is not counted)
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::raw_item;

    #[test]
    fn test_same_id_returns_same_instance() {
        let cache = NodeCache::new(1);
        let first = cache.node_for(raw_item("1", "Movie", "Foo"));
        let second = cache.node_for(raw_item("1", "Movie", "Foo (renamed)"));

        assert!(Arc::ptr_eq(&first, &second));
        // The second record is ignored.
        assert_eq!(second.title(), "Foo");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_ids_get_distinct_nodes() {
        let cache = NodeCache::new(1);
        let a = cache.node_for(raw_item("1", "Movie", "A"));
        let b = cache.node_for(raw_item("2", "Movie", "B"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_has_no_side_effects() {
        let cache = NodeCache::new(1);
        assert!(cache.get(&ItemId::from("1")).is_none());
        assert!(cache.is_empty());

        let node = cache.node_for(raw_item("1", "Season", "Season 1"));
        let found = cache.get(&ItemId::from("1")).unwrap();
        assert!(Arc::ptr_eq(&node, &found));
        assert!(cache.contains(&ItemId::from("1")));
    }

    #[test]
    fn test_unknown_items_get_synthetic_ids_but_stay_cached() {
        let cache = NodeCache::new(1);
        let a = cache.node_for(raw_item("x1", "TvChannel", "News"));
        let b = cache.node_for(raw_item("x2", "TvChannel", "Sport"));

        assert!(a.id().as_str().starts_with("unknown-"));
        assert_ne!(a.id(), b.id());
        assert!(Arc::ptr_eq(&a, &cache.node_for(raw_item("x1", "TvChannel", "News"))));
    }

    #[test]
    fn test_root_is_stable_within_scope() {
        let cache = NodeCache::new(3);
        assert!(Arc::ptr_eq(&cache.root(), &cache.root()));
        assert!(cache.root().id().is_root());
        assert_eq!(cache.scope(), 3);

        let other = NodeCache::new(4);
        assert!(!Arc::ptr_eq(&cache.root(), &other.root()));
    }

    #[test]
    fn test_nodes_remember_their_cache() {
        let cache = NodeCache::new(5);
        let node = cache.node_for(raw_item("1", "Series", "Show"));

        assert_eq!(node.scope(), 5);
        assert_eq!(cache.root().scope(), 5);
        assert!(Arc::ptr_eq(&node.origin().unwrap(), &cache));

        drop(cache);
        assert!(node.origin().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_agree() {
        let cache = NodeCache::new(1);
        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.node_for(raw_item("shared", "Series", "Show"))
            }));
        }

        let mut nodes = Vec::new();
        for handle in handles {
            nodes.push(handle.await.unwrap());
        }
        assert!(nodes.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.len(), 1);
    }
}
