//! Emby/Jellyfin HTTP Client

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::{Client, StatusCode, header::{HeaderMap, HeaderValue, CONTENT_TYPE}};
use serde_json::json;
use url::Url;

use super::error::{check_response, json_with_limit, EmbyError};
use super::types::{AuthResponse, Item, ItemsQuery, ItemsResponse, SystemInfo, DEFAULT_FIELDS};

/// Shared HTTP client for all Emby requests (connection pooling)
/// Redirects are disabled so credentials never follow a redirect to another host.
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    build_http_client(Duration::from_secs(10), Duration::from_secs(30))
        .unwrap_or_else(|_| Client::new())
});

/// Build a pooled HTTP client with the given timeouts.
pub fn build_http_client(connect_timeout: Duration, timeout: Duration) -> Result<Client, EmbyError> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| EmbyError::InvalidConfig(format!("Failed to build HTTP client: {e}")))
}

const X_EMBY_TOKEN: &str = "X-Emby-Token";
const X_EMBY_AUTHORIZATION: &str = "X-Emby-Authorization";

/// How this client identifies itself to the server.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub client: String,
    pub device: String,
    pub device_id: String,
    pub version: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            client: "mediatree".to_string(),
            device: "cli".to_string(),
            device_id: "mediatree-cli".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl DeviceInfo {
    fn authorization_header(&self) -> String {
        format!(
            r#"MediaBrowser Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
            self.client, self.device, self.device_id, self.version
        )
    }
}

/// Emby/Jellyfin HTTP Client
#[derive(Debug, Clone)]
pub struct EmbyClient {
    host: String,
    token: Option<String>,
    user_id: Option<String>,
    client: Client,
    api_prefix: Option<String>,
    device: DeviceInfo,
}

impl EmbyClient {
    /// Create a new Emby client (reuses shared connection pool)
    pub fn new(host: impl Into<String>) -> Result<Self, EmbyError> {
        let host: String = host.into();
        if host.is_empty() {
            return Err(EmbyError::InvalidConfig("Missing host".to_string()));
        }

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            token: None,
            user_id: None,
            client: SHARED_CLIENT.clone(),
            api_prefix: None,
            device: DeviceInfo::default(),
        })
    }

    /// Create a new Emby client with credentials (reuses shared connection pool)
    pub fn with_credentials(
        host: impl Into<String>,
        token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<Self, EmbyError> {
        let mut client = Self::new(host)?;
        client.set_credentials(token, user_id);
        Ok(client)
    }

    /// Replace the pooled HTTP client (e.g. one built with configured timeouts)
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Replace the device identification sent with every request
    #[must_use]
    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = device;
        self
    }

    /// Set a custom API prefix (e.g., "/emby" or "/jellyfin").
    /// When set, overrides the auto-detection based on hostname.
    pub fn set_api_prefix(&mut self, prefix: impl Into<String>) {
        self.api_prefix = Some(prefix.into());
    }

    /// Set authentication token and user ID
    pub fn set_credentials(&mut self, token: impl Into<String>, user_id: impl Into<String>) {
        self.token = Some(token.into());
        self.user_id = Some(user_id.into());
    }

    /// Get API prefix (/emby or /jellyfin).
    /// Uses the explicitly set prefix if available, otherwise auto-detects
    /// based on whether the host URL contains "jellyfin".
    fn api_prefix(&self) -> &str {
        if let Some(ref prefix) = self.api_prefix {
            return prefix;
        }
        if self.host.contains("jellyfin") {
            "/jellyfin"
        } else {
            "/emby"
        }
    }

    fn user_id(&self) -> Result<&str, EmbyError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| EmbyError::InvalidConfig("Missing user_id".to_string()))
    }

    /// Endpoint under the API prefix. Each segment is percent-encoded as a
    /// single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, EmbyError> {
        let mut url = Url::parse(&self.host)
            .map_err(|e| EmbyError::InvalidConfig(format!("Invalid host {}: {e}", self.host)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| EmbyError::InvalidConfig(format!("Host cannot carry a path: {}", self.host)))?;
            path.pop_if_empty();
            path.extend(self.api_prefix().split('/').filter(|part| !part.is_empty()));
            path.extend(segments);
        }
        Ok(url)
    }

    /// Endpoint under `/Users/{user_id}`
    fn user_url(&self, tail: &[&str]) -> Result<Url, EmbyError> {
        let user_id = self.user_id()?;
        let segments: Vec<&str> = ["Users", user_id].into_iter().chain(tail.iter().copied()).collect();
        self.endpoint(&segments)
    }

    /// Build request headers
    fn build_headers(&self) -> Result<HeaderMap, EmbyError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            X_EMBY_AUTHORIZATION,
            HeaderValue::from_str(&self.device.authorization_header())?,
        );

        if let Some(ref token) = self.token {
            headers.insert(X_EMBY_TOKEN, HeaderValue::from_str(token)?);
        }

        Ok(headers)
    }

    async fn get_items_at(&self, url: Url) -> Result<Vec<Item>, EmbyError> {
        let response = self
            .client
            .get(url.clone())
            .headers(self.build_headers()?)
            .send()
            .await?;

        let response = check_response(response)?;
        let items: ItemsResponse = json_with_limit(response).await?;
        tracing::debug!(%url, count = items.items.len(), total = items.total_record_count, "Fetched items");
        Ok(items.items)
    }

    /// Login to Emby/Jellyfin server, returning `(token, user_id)`
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(String, String), EmbyError> {
        let url = self.endpoint(&["Users", "authenticatebyname"])?;

        let body = json!({
            "Username": username,
            "Pw": password,
        });

        let response = self
            .client
            .post(url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbyError::Auth(format!("Login failed: {}", response.status())));
        }

        let auth_resp: AuthResponse = json_with_limit(response).await?;
        let token = auth_resp.access_token;
        let user_id = auth_resp.user.id;

        tracing::info!(user = %auth_resp.user.name, host = %self.host, "Logged in");
        self.set_credentials(token.clone(), user_id.clone());
        Ok((token, user_id))
    }

    /// Top-level library views of the current user
    pub async fn get_views(&self) -> Result<Vec<Item>, EmbyError> {
        let url = self.user_url(&["Views"])?;
        self.get_items_at(url).await
    }

    /// Items matching a query (children listings and searches)
    pub async fn get_items(&self, query: &ItemsQuery) -> Result<Vec<Item>, EmbyError> {
        let mut url = self.user_url(&["Items"])?;
        url.set_query(Some(&query.to_query_string()));
        self.get_items_at(url).await
    }

    /// Get a single item with full detail
    pub async fn get_item(&self, item_id: &str) -> Result<Item, EmbyError> {
        let mut url = self.user_url(&["Items", item_id])?;
        url.query_pairs_mut().append_pair("Fields", DEFAULT_FIELDS);

        let response = self
            .client
            .get(url)
            .headers(self.build_headers()?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(EmbyError::NotFound(item_id.to_string()));
        }

        let response = check_response(response)?;
        let item: Item = json_with_limit(response).await?;
        Ok(item)
    }

    /// Recursive search across the user's libraries
    pub async fn search(&self, term: &str, limit: Option<u32>) -> Result<Vec<Item>, EmbyError> {
        let query = ItemsQuery {
            recursive: true,
            include_item_types: ["Movie", "Series", "Episode", "BoxSet", "Video", "MusicVideo"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            sort_by: vec!["SortName".to_string()],
            search_term: Some(term.to_string()),
            limit,
            ..ItemsQuery::default()
        };
        self.get_items(&query).await
    }

    /// Store the resume position of an item for the current user
    pub async fn update_playback_position(&self, item_id: &str, position_ticks: i64) -> Result<(), EmbyError> {
        let url = self.user_url(&["Items", item_id, "UserData"])?;

        let body = json!({
            "PlaybackPositionTicks": position_ticks,
        });

        let response = self
            .client
            .post(url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;

        check_response(response)?;
        Ok(())
    }

    /// Get system information
    pub async fn get_system_info(&self) -> Result<SystemInfo, EmbyError> {
        let url = self.endpoint(&["System", "Info"])?;

        let response = self
            .client
            .get(url)
            .headers(self.build_headers()?)
            .send()
            .await?;

        let response = check_response(response)?;
        let info: SystemInfo = json_with_limit(response).await?;
        Ok(info)
    }

    /// Logout
    pub async fn logout(&self) -> Result<(), EmbyError> {
        let url = self.endpoint(&["Sessions", "Logout"])?;

        self.client
            .post(url)
            .headers(self.build_headers()?)
            .send()
            .await?;

        Ok(())
    }

    /// Get host URL
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Check if client has credentials
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.token.is_some() && self.user_id.is_some()
    }
}
