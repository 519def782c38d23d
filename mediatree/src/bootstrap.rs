//! Configuration loading and session setup

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use mediatree_core::{Config, EmbyItemSource, Session};
use mediatree_providers::emby::{build_http_client, DeviceInfo, EmbyClient};

/// Load configuration from a config file or environment variables
///
/// Config file search order:
/// 1. `--config` / MEDIATREE_CONFIG_PATH (explicit path)
/// 2. ./mediatree.yaml (current working directory)
/// 3. Fall back to environment variables only
pub fn load_config(explicit: Option<&str>) -> Result<Config> {
    let config_path = explicit
        .map(ToString::to_string)
        .filter(|p| std::path::Path::new(p).exists())
        .or_else(|| {
            let cwd = "mediatree.yaml";
            std::path::Path::new(cwd).exists().then(|| cwd.to_string())
        });

    if let Some(path) = config_path {
        eprintln!("Loading config from {path}");
        return Config::from_file(&path).with_context(|| format!("Failed to load {path}"));
    }

    if let Some(path) = explicit {
        eprintln!("Config file {path} not found, using environment variables");
    }
    Config::from_env().context("Failed to load config from environment")
}

/// How to authenticate against the server
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Existing access token
    Token { token: String, user_id: String },
    /// Username and password, exchanged for a token at startup
    Password { username: String, password: String },
}

/// Authenticated client plus the session built on top of it
pub struct Connection {
    pub client: EmbyClient,
    pub session: Arc<Session>,
    /// Whether the token was issued by this run and should be revoked on exit
    pub owns_token: bool,
}

/// Build an authenticated client for the configured server and open a session
pub async fn connect(config: &Config, credentials: Credentials) -> Result<Connection> {
    let http = build_http_client(config.http.connect_timeout(), config.http.request_timeout())?;
    let device = DeviceInfo {
        device: config.server.device_name.clone(),
        ..DeviceInfo::default()
    };
    let mut client = EmbyClient::new(config.server.url.as_str())?
        .with_http_client(http)
        .with_device(device);
    if let Some(prefix) = &config.server.api_prefix {
        client.set_api_prefix(prefix.as_str());
    }

    let owns_token = match credentials {
        Credentials::Token { token, user_id } => {
            client.set_credentials(token, user_id);
            false
        }
        Credentials::Password { username, password } => {
            let (_, user_id) = client
                .login(&username, &password)
                .await
                .with_context(|| format!("Login as {username} failed"))?;
            info!(user_id = %user_id, "Logged in");
            true
        }
    };

    match client.get_system_info().await {
        Ok(system) => info!(
            server = %system.server_name,
            version = %system.version,
            "Connected to media server"
        ),
        Err(e) => warn!("Could not read server info: {}", e),
    }

    let source = EmbyItemSource::new(client.clone()).with_search_limit(config.library.search_limit);
    let session = Arc::new(Session::new(Arc::new(source)));

    Ok(Connection {
        client,
        session,
        owns_token,
    })
}

impl Connection {
    /// Revoke the token if this run created it
    pub async fn close(self) {
        if !self.owns_token {
            return;
        }
        self.session.reset();
        if let Err(e) = self.client.logout().await {
            warn!("Logout failed: {}", e);
        }
    }
}
