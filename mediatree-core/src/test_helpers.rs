//! Test helpers and fixtures for mediatree-core tests
//!
//! Raw item fixtures plus an in-memory item source with call recording,
//! artificial latency and failure injection.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::models::{classify, ItemId, NodeId, RawItem};
use crate::source::{ChildFilters, ItemSource};
use crate::tree::MediaTreeNode;
use crate::{Error, Result};

/// Raw item with the given id, type tag and name
pub fn raw_item(id: &str, item_type: &str, name: &str) -> RawItem {
    RawItem {
        id: id.to_string(),
        item_type: item_type.to_string(),
        name: name.to_string(),
        ..RawItem::default()
    }
}

/// Movie collection view, as returned by the root views call
pub fn movie_library(id: &str, name: &str) -> RawItem {
    let mut raw = raw_item(id, "CollectionFolder", name);
    raw.collection_type = Some("movies".to_string());
    raw
}

/// Detached node for a raw item (not registered in any cache)
pub fn node(id: &str, item_type: &str, name: &str) -> MediaTreeNode {
    MediaTreeNode::new(
        NodeId::from(&ItemId::from(id)),
        classify(Some(&raw_item(id, item_type, name))),
    )
}

/// One recorded call against [`FakeSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    RootViews,
    Children(ItemId, ChildFilters),
    Detail(ItemId),
    Search(String),
    PlaybackPosition(ItemId, i64),
}

/// In-memory item source
#[derive(Default)]
pub struct FakeSource {
    root_views: Mutex<Vec<RawItem>>,
    children: Mutex<HashMap<ItemId, Vec<RawItem>>>,
    details: Mutex<HashMap<ItemId, RawItem>>,
    search_hits: Mutex<Vec<RawItem>>,
    latency: Mutex<Option<Duration>>,
    failure: Mutex<Option<Error>>,
    calls: Mutex<Vec<SourceCall>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_views(self, items: Vec<RawItem>) -> Self {
        *self.root_views.lock() = items;
        self
    }

    pub fn with_children(self, parent: &str, items: Vec<RawItem>) -> Self {
        self.set_children(parent, items);
        self
    }

    pub fn with_detail(self, item: RawItem) -> Self {
        self.set_detail(item);
        self
    }

    pub fn with_search_hits(self, items: Vec<RawItem>) -> Self {
        *self.search_hits.lock() = items;
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = Some(latency);
        self
    }

    pub fn set_children(&self, parent: &str, items: Vec<RawItem>) {
        self.children.lock().insert(ItemId::from(parent), items);
    }

    pub fn set_detail(&self, item: RawItem) {
        self.details.lock().insert(ItemId::from(item.id.as_str()), item);
    }

    /// Make every following call fail with `err` (or succeed again with `None`)
    pub fn set_failure(&self, err: Option<Error>) {
        *self.failure.lock() = err;
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    async fn enter(&self, call: SourceCall) -> Result<()> {
        self.calls.lock().push(call);
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self.failure.lock().clone();
        failure.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl ItemSource for FakeSource {
    async fn fetch_root_views(&self) -> Result<Vec<RawItem>> {
        self.enter(SourceCall::RootViews).await?;
        Ok(self.root_views.lock().clone())
    }

    async fn fetch_children(&self, parent_id: &ItemId, filters: &ChildFilters) -> Result<Vec<RawItem>> {
        self.enter(SourceCall::Children(parent_id.clone(), filters.clone())).await?;
        Ok(self.children.lock().get(parent_id).cloned().unwrap_or_default())
    }

    async fn fetch_detail(&self, item_id: &ItemId) -> Result<RawItem> {
        self.enter(SourceCall::Detail(item_id.clone())).await?;
        self.details
            .lock()
            .get(item_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(item_id.to_string()))
    }

    async fn search(&self, query: &str) -> Result<Vec<RawItem>> {
        self.enter(SourceCall::Search(query.to_string())).await?;
        Ok(self.search_hits.lock().clone())
    }

    async fn put_user_playback_position(&self, item_id: &ItemId, position_ticks: i64) -> Result<()> {
        self.enter(SourceCall::PlaybackPosition(item_id.clone(), position_ticks)).await
    }
}
