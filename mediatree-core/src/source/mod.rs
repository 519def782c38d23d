//! Item source
//!
//! The loader's only view of the server. Implemented over HTTP by
//! `EmbyItemSource`; tests substitute in-memory fakes and mocks.

pub mod emby;

use async_trait::async_trait;

use crate::models::{ItemId, RawItem};
use crate::Result;

pub use emby::EmbyItemSource;

/// How the children of a container are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildFilters {
    /// Walk the whole subtree instead of direct children only
    pub recursive: bool,
    /// Restrict to these server type tags (empty = all)
    pub include_item_types: Vec<String>,
    /// Server sort fields, most significant first
    pub sort_by: Vec<String>,
}

impl ChildFilters {
    /// Direct children sorted by name
    #[must_use]
    pub fn direct() -> Self {
        Self {
            sort_by: vec!["SortName".to_string()],
            ..Self::default()
        }
    }

    /// Direct children in season / episode order
    #[must_use]
    pub fn numbered() -> Self {
        Self {
            sort_by: ["ParentIndexNumber", "IndexNumber", "SortName"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            ..Self::default()
        }
    }

    /// Every descendant of the given type, sorted by name
    #[must_use]
    pub fn recursive_of(item_type: &str) -> Self {
        Self {
            recursive: true,
            include_item_types: vec![item_type.to_string()],
            sort_by: vec!["SortName".to_string()],
        }
    }
}

/// Remote item source contract.
///
/// All calls may fail with a network, authorization or decode error,
/// reported through [`crate::Error`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Top-level library views of the signed-in user
    async fn fetch_root_views(&self) -> Result<Vec<RawItem>>;

    async fn fetch_children(&self, parent_id: &ItemId, filters: &ChildFilters) -> Result<Vec<RawItem>>;

    async fn fetch_detail(&self, item_id: &ItemId) -> Result<RawItem>;

    async fn search(&self, query: &str) -> Result<Vec<RawItem>>;

    async fn put_user_playback_position(&self, item_id: &ItemId, position_ticks: i64) -> Result<()>;
}
