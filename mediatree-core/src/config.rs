use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub library: LibraryConfig,
    pub logging: LoggingConfig,
}

/// Media server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the Emby or Jellyfin server
    pub url: String,
    /// API prefix (`/emby`, `/jellyfin`). Detected from the URL when unset.
    pub api_prefix: Option<String>,
    /// Device name reported in the authorization header
    pub device_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_prefix: None,
            device_name: "mediatree".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 10,
            request_timeout_seconds: 30,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Refresh a node's detail once when it is shown without overview or artwork
    pub enrich_on_display: bool,
    /// Maximum number of search hits per query
    pub search_limit: u32,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            enrich_on_display: true,
            search_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // MEDIATREE_SERVER__URL, MEDIATREE_LIBRARY__SEARCH_LIMIT, ...
        builder = builder.add_source(
            Environment::with_prefix("MEDIATREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Check the loaded values, reporting every problem at once
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.url.trim().is_empty() {
            errors.push("server.url must be set".to_string());
        } else if url::Url::parse(&self.server.url).is_err() {
            errors.push(format!("server.url is not a valid URL: {}", self.server.url));
        }
        if let Some(prefix) = &self.server.api_prefix {
            if !prefix.starts_with('/') {
                errors.push(format!("server.api_prefix must start with '/': {prefix}"));
            }
        }
        if self.server.device_name.trim().is_empty() {
            errors.push("server.device_name must not be empty".to_string());
        }
        if self.http.connect_timeout_seconds == 0 || self.http.request_timeout_seconds == 0 {
            errors.push("http timeouts must be greater than zero".to_string());
        }
        if self.library.search_limit == 0 {
            errors.push("library.search_limit must be greater than zero".to_string());
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!("logging.format must be 'json' or 'pretty': {}", self.logging.format));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> Config {
        Config {
            server: ServerConfig {
                url: "http://emby.local:8096".to_string(),
                ..ServerConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.server.url.is_empty());
        assert_eq!(config.server.device_name, "mediatree");
        assert_eq!(config.http.request_timeout(), Duration::from_secs(30));
        assert!(config.library.enrich_on_display);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  url: https://jellyfin.example.com\n  api_prefix: /jellyfin\nlibrary:\n  search_limit: 10"
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.server.url, "https://jellyfin.example.com");
        assert_eq!(config.server.api_prefix.as_deref(), Some("/jellyfin"));
        assert_eq!(config.library.search_limit, 10);
        assert!(config.library.enrich_on_display);
        assert_eq!(config.http.connect_timeout_seconds, 10);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::from_file("/nonexistent/mediatree.yaml").unwrap();
        assert_eq!(config.library.search_limit, 50);
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_errors() {
        let mut config = valid();
        config.server.url = String::new();
        config.server.api_prefix = Some("emby".to_string());
        config.library.search_limit = 0;
        config.logging.format = "xml".to_string();

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("server.url"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = valid();
        config.server.url = "not a url".to_string();
        assert!(config.validate().unwrap_err()[0].contains("not a valid URL"));
    }
}
