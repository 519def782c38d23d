//! Session context
//!
//! Owns the item source of the signed-in user and the current node cache
//! scope. Passed explicitly to the loader and the navigation store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::{LoadFlights, NodeCache};
use crate::source::ItemSource;
use crate::tree::NodeRef;

pub struct Session {
    source: RwLock<Arc<dyn ItemSource>>,
    cache: RwLock<Arc<NodeCache>>,
    next_scope: AtomicU64,
    flights: LoadFlights,
}

impl Session {
    #[must_use]
    pub fn new(source: Arc<dyn ItemSource>) -> Self {
        Self {
            source: RwLock::new(source),
            cache: RwLock::new(NodeCache::new(1)),
            next_scope: AtomicU64::new(2),
            flights: LoadFlights::new(),
        }
    }

    /// Item source of the current user
    #[must_use]
    pub fn source(&self) -> Arc<dyn ItemSource> {
        self.source.read().clone()
    }

    /// Node cache of the current scope
    #[must_use]
    pub fn cache(&self) -> Arc<NodeCache> {
        self.cache.read().clone()
    }

    /// Library root of the current scope
    #[must_use]
    pub fn root(&self) -> NodeRef {
        self.cache.read().root()
    }

    /// In-flight loads, shared by every loader of this session
    #[must_use]
    pub const fn flights(&self) -> &LoadFlights {
        &self.flights
    }

    #[must_use]
    pub fn scope(&self) -> u64 {
        self.cache.read().scope()
    }

    /// Discard every node of the current scope (logout, server switch).
    ///
    /// Loads still running against the old scope finish into the old cache
    /// and are never visible through the new one.
    pub fn reset(&self) {
        let scope = self.next_scope.fetch_add(1, Ordering::Relaxed);
        let old = std::mem::replace(&mut *self.cache.write(), NodeCache::new(scope));
        tracing::info!(old_scope = old.scope(), new_scope = scope, dropped = old.len(), "Session reset");
    }

    /// Switch to a new source (new credentials or server) and start a fresh scope
    pub fn reauthenticate(&self, source: Arc<dyn ItemSource>) {
        *self.source.write() = source;
        self.reset();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("scope", &self.scope())
            .field("cached_nodes", &self.cache().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{raw_item, FakeSource};

    #[test]
    fn test_reset_starts_a_new_scope() {
        let session = Session::new(Arc::new(FakeSource::new()));
        let root = session.root();
        let node = session.cache().node_for(raw_item("1", "Movie", "Foo"));
        assert_eq!(session.scope(), 1);

        session.reset();

        assert_eq!(session.scope(), 2);
        assert!(session.cache().is_empty());
        assert!(!Arc::ptr_eq(&root, &session.root()));
        assert!(!Arc::ptr_eq(&node, &session.cache().node_for(raw_item("1", "Movie", "Foo"))));
    }

    #[tokio::test]
    async fn test_reauthenticate_swaps_source() {
        let first = Arc::new(FakeSource::new());
        let second = Arc::new(FakeSource::new());
        let session = Session::new(first.clone());

        session.reauthenticate(second.clone());
        session.source().fetch_root_views().await.unwrap();

        assert_eq!(first.call_count(), 0);
        assert_eq!(second.call_count(), 1);
        assert_eq!(session.scope(), 2);
    }
}
