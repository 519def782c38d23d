//! Emby/Jellyfin API Data Structures

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields requested on every item listing so that nodes arrive with enough
/// detail to render without an immediate follow-up fetch.
pub const DEFAULT_FIELDS: &str = "Overview,PrimaryImageAspectRatio,ParentId,SeriesInfo";

/// Authentication response
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "AccessToken")]
    pub access_token: String,
    #[serde(rename = "User")]
    pub user: User,
    #[serde(rename = "ServerId", default)]
    pub server_id: Option<String>,
}

/// User information (for authentication response)
#[derive(Debug, Deserialize)]
pub struct User {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Per-user state the server keeps for an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(rename = "PlaybackPositionTicks", default)]
    pub playback_position_ticks: i64,
    #[serde(rename = "Played", default)]
    pub played: bool,
    #[serde(rename = "IsFavorite", default)]
    pub is_favorite: bool,
}

/// Media item as returned by the server (`BaseItemDto`).
///
/// Only the fields the client reasons about are typed; everything else is
/// kept in `extra` and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub item_type: String,
    #[serde(rename = "Overview", default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(rename = "IsFolder", default)]
    pub is_folder: bool,
    #[serde(rename = "ParentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "SeriesName", default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    #[serde(rename = "SeriesId", default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(rename = "SeasonName", default, skip_serializing_if = "Option::is_none")]
    pub season_name: Option<String>,
    #[serde(rename = "SeasonId", default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<String>,
    #[serde(rename = "IndexNumber", default, skip_serializing_if = "Option::is_none")]
    pub index_number: Option<i32>,
    #[serde(rename = "ParentIndexNumber", default, skip_serializing_if = "Option::is_none")]
    pub parent_index_number: Option<i32>,
    #[serde(rename = "CollectionType", default, skip_serializing_if = "Option::is_none")]
    pub collection_type: Option<String>,
    #[serde(rename = "ImageTags", default, skip_serializing_if = "HashMap::is_empty")]
    pub image_tags: HashMap<String, String>,
    #[serde(rename = "RunTimeTicks", default, skip_serializing_if = "Option::is_none")]
    pub run_time_ticks: Option<i64>,
    #[serde(rename = "ProductionYear", default, skip_serializing_if = "Option::is_none")]
    pub production_year: Option<u32>,
    #[serde(rename = "UserData", default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Items response
#[derive(Debug, Deserialize)]
pub struct ItemsResponse {
    #[serde(rename = "Items", default)]
    pub items: Vec<Item>,
    #[serde(rename = "TotalRecordCount", default)]
    pub total_record_count: u64,
}

/// System information (the subset the client shows)
#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfo {
    #[serde(rename = "ServerName", default)]
    pub server_name: String,
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "ProductName", default)]
    pub product_name: String,
    #[serde(rename = "Id", default)]
    pub id: String,
}

/// Query parameters for `/Users/{id}/Items`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemsQuery {
    pub parent_id: Option<String>,
    pub recursive: bool,
    pub include_item_types: Vec<String>,
    pub sort_by: Vec<String>,
    pub search_term: Option<String>,
    pub limit: Option<u32>,
}

impl ItemsQuery {
    /// Encode as a URL query string (without the leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());

        if let Some(ref parent_id) = self.parent_id {
            serializer.append_pair("ParentId", parent_id);
        }
        if self.recursive {
            serializer.append_pair("Recursive", "true");
        }
        if !self.include_item_types.is_empty() {
            serializer.append_pair("IncludeItemTypes", &self.include_item_types.join(","));
        }
        if !self.sort_by.is_empty() {
            serializer.append_pair("SortBy", &self.sort_by.join(","));
            serializer.append_pair("SortOrder", "Ascending");
        }
        if let Some(ref term) = self.search_term {
            serializer.append_pair("SearchTerm", term);
        }
        if let Some(limit) = self.limit {
            serializer.append_pair("Limit", &limit.to_string());
        }
        serializer.append_pair("Fields", DEFAULT_FIELDS);

        serializer.finish()
    }
}
