//! Emby/Jellyfin item source
//!
//! Adapter that calls EmbyClient to implement the ItemSource trait

use async_trait::async_trait;
use mediatree_providers::emby::{EmbyClient, ItemsQuery};

use super::{ChildFilters, ItemSource};
use crate::models::{ItemId, RawItem};
use crate::Result;

/// Item source backed by an authenticated [`EmbyClient`]
#[derive(Debug, Clone)]
pub struct EmbyItemSource {
    client: EmbyClient,
    search_limit: Option<u32>,
}

impl EmbyItemSource {
    #[must_use]
    pub const fn new(client: EmbyClient) -> Self {
        Self {
            client,
            search_limit: None,
        }
    }

    /// Cap the number of search hits returned per query
    #[must_use]
    pub const fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn client(&self) -> &EmbyClient {
        &self.client
    }
}

fn items_query(parent_id: &ItemId, filters: &ChildFilters) -> ItemsQuery {
    ItemsQuery {
        parent_id: Some(parent_id.to_string()),
        recursive: filters.recursive,
        include_item_types: filters.include_item_types.clone(),
        sort_by: filters.sort_by.clone(),
        ..ItemsQuery::default()
    }
}

#[async_trait]
impl ItemSource for EmbyItemSource {
    async fn fetch_root_views(&self) -> Result<Vec<RawItem>> {
        Ok(self.client.get_views().await?)
    }

    async fn fetch_children(&self, parent_id: &ItemId, filters: &ChildFilters) -> Result<Vec<RawItem>> {
        Ok(self.client.get_items(&items_query(parent_id, filters)).await?)
    }

    async fn fetch_detail(&self, item_id: &ItemId) -> Result<RawItem> {
        Ok(self.client.get_item(item_id.as_str()).await?)
    }

    async fn search(&self, query: &str) -> Result<Vec<RawItem>> {
        Ok(self.client.search(query, self.search_limit).await?)
    }

    async fn put_user_playback_position(&self, item_id: &ItemId, position_ticks: i64) -> Result<()> {
        Ok(self
            .client
            .update_playback_position(item_id.as_str(), position_ticks)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_query_from_filters() {
        let query = items_query(&ItemId::from("1"), &ChildFilters::recursive_of("Movie"));
        assert_eq!(query.parent_id.as_deref(), Some("1"));
        assert!(query.recursive);
        assert_eq!(query.include_item_types, vec!["Movie".to_string()]);
        assert_eq!(query.search_term, None);

        let query = items_query(&ItemId::from("2"), &ChildFilters::numbered());
        assert!(!query.recursive);
        assert_eq!(query.sort_by.len(), 3);
    }
}
