//! Lazy loader
//!
//! Fetches the children or the detail of a node from the session's item
//! source and writes the result into the node. Concurrent requests for the
//! same node and track share a single fetch. Failures are recorded on the
//! node and returned to the caller; nothing is retried automatically.

use std::sync::Arc;

use crate::cache::FlightKey;
use crate::models::{classify, NodeKind};
use crate::session::Session;
use crate::source::ChildFilters;
use crate::tree::{LoadTrack, NodeRef};
use crate::{Error, Result};

/// Children listing parameters for a container kind
fn filters_for(kind: &NodeKind) -> ChildFilters {
    match kind {
        kind if kind.is_movie_collection() => ChildFilters::recursive_of("Movie"),
        NodeKind::Series(_) | NodeKind::Season(_) => ChildFilters::numbered(),
        _ => ChildFilters::direct(),
    }
}

#[derive(Debug, Clone)]
pub struct LazyLoader {
    session: Arc<Session>,
    enrich_on_display: bool,
}

impl LazyLoader {
    #[must_use]
    pub const fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            enrich_on_display: true,
        }
    }

    /// Turn display-triggered enrichment on or off
    #[must_use]
    pub const fn with_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_on_display = enabled;
        self
    }

    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Load the children of a container node.
    ///
    /// Does nothing once children were loaded, unless `reload` is set.
    /// Leaf and unknown nodes have no children here: the call is a no-op
    /// returning `Ok(())`.
    ///
    /// Children are wrapped through the cache that owns `node`, so a node
    /// kept from before a session reset never writes into the new scope.
    /// A node whose cache is gone fails with `Unknown`.
    pub async fn load_children(&self, node: &NodeRef, reload: bool) -> Result<()> {
        if !node.is_container() {
            tracing::debug!(node_id = %node.id(), "Not a container, nothing to load");
            return Ok(());
        }
        if node.children_loaded() && !reload {
            return Ok(());
        }

        let Some(cache) = node.origin() else {
            let err = Error::Unknown(format!("node {} belongs to a discarded session", node.id()));
            tracing::warn!(node_id = %node.id(), scope = node.scope(), "Load of a node without a live cache");
            node.fail(LoadTrack::Children, err.clone());
            return Err(err);
        };
        let source = self.session.source();
        let key = FlightKey::new(node.scope(), node.id().clone(), LoadTrack::Children);
        let target = node.clone();

        self.session
            .flights()
            .run(key, async move {
                // Another caller may have finished a load while we queued.
                if target.children_loaded() && !reload {
                    return Ok(());
                }
                if !target.begin(LoadTrack::Children, reload) {
                    return Ok(());
                }

                let kind = target.kind();
                let fetched = match (&kind, kind.item_id()) {
                    (NodeKind::Root, _) => source.fetch_root_views().await,
                    (_, Some(item_id)) => source.fetch_children(&item_id, &filters_for(&kind)).await,
                    (_, None) => Err(Error::Unknown(format!("node {} has no item", target.id()))),
                };

                match fetched {
                    Ok(items) => {
                        let children: Vec<NodeRef> =
                            items.into_iter().map(|raw| cache.node_for(raw)).collect();
                        tracing::debug!(
                            node_id = %target.id(),
                            scope = cache.scope(),
                            count = children.len(),
                            "Children loaded"
                        );
                        target.finish_children(children);
                        Ok(())
                    }
                    Err(err) => {
                        tracing::warn!(node_id = %target.id(), error = %err, "Failed to load children");
                        target.fail(LoadTrack::Children, err.clone());
                        Err(err)
                    }
                }
            })
            .await
    }

    /// Load children if needed and return them.
    pub async fn children_of(&self, node: &NodeRef, reload: bool) -> Result<Vec<NodeRef>> {
        self.load_children(node, reload).await?;
        Ok(node.children())
    }

    /// Fetch a fresh record for the node and replace its kind wholesale.
    ///
    /// Children are left untouched. Root and unknown nodes carry no item:
    /// the call is a no-op returning `Ok(())`.
    pub async fn refresh_detail(&self, node: &NodeRef) -> Result<()> {
        let Some(item_id) = node.kind().item_id() else {
            tracing::debug!(node_id = %node.id(), "No item behind node, nothing to refresh");
            return Ok(());
        };

        let source = self.session.source();
        let key = FlightKey::new(node.scope(), node.id().clone(), LoadTrack::Detail);
        let target = node.clone();

        self.session
            .flights()
            .run(key, async move {
                if !target.begin(LoadTrack::Detail, true) {
                    return Ok(());
                }

                match source.fetch_detail(&item_id).await {
                    Ok(raw) if raw.id != item_id.as_str() => {
                        let err = Error::DecodeFailure(format!(
                            "requested item {item_id}, server returned {}",
                            raw.id
                        ));
                        target.fail(LoadTrack::Detail, err.clone());
                        Err(err)
                    }
                    Ok(raw) => {
                        tracing::debug!(node_id = %target.id(), "Detail refreshed");
                        target.finish_detail(classify(Some(&raw)));
                        Ok(())
                    }
                    Err(err) => {
                        tracing::warn!(node_id = %target.id(), error = %err, "Failed to refresh detail");
                        target.fail(LoadTrack::Detail, err.clone());
                        Err(err)
                    }
                }
            })
            .await
    }

    /// Display-triggered enrichment.
    ///
    /// The first time a node is inspected closely and its record lacks an
    /// overview or artwork, its detail is refreshed once. After one
    /// successful enrichment the node is never enriched again.
    pub async fn enrich(&self, node: &NodeRef) -> Result<()> {
        if !self.enrich_on_display || node.is_enriched() {
            return Ok(());
        }
        if node.kind().lacks_display_detail() {
            self.refresh_detail(node).await?;
        }
        node.mark_enriched();
        Ok(())
    }

    /// Search the library. Hits go through the node cache, so a result is
    /// the same node the tree shows for that item.
    pub async fn search(&self, query: &str) -> Result<Vec<NodeRef>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let cache = self.session.cache();
        let items = self.session.source().search(query).await?;
        tracing::debug!(query, hits = items.len(), "Search finished");
        Ok(items.into_iter().map(|raw| cache.node_for(raw)).collect())
    }

    /// Store the resume position of a playable node.
    pub async fn report_playback_position(&self, node: &NodeRef, position_ticks: i64) -> Result<()> {
        let item_id = node
            .kind()
            .item_id()
            .ok_or_else(|| Error::NotFound(format!("node {} has no item", node.id())))?;

        self.session
            .source()
            .put_user_playback_position(&item_id, position_ticks.max(0))
            .await
    }
}
