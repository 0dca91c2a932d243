use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE_WINDOW, MAX_PAGE_WINDOW};
use crate::version;

pub const DEFAULT_BASE_URL: &str = "https://api.oluwasetemi.dev";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Base URL of the catalog API
    pub base_url: String,

    /// Products requested per page
    pub limit: u32,

    /// Pages shown on each side of the current page
    pub page_window: u32,

    /// Upper bound for a single page request
    pub request_timeout: Duration,

    /// Image shown for products without a usable image reference
    pub placeholder_image: String,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: DEFAULT_LIMIT,
            page_window: DEFAULT_PAGE_WINDOW,
            request_timeout: DEFAULT_TIMEOUT,
            placeholder_image: String::new(),
            user_agent: format!("{}/{}", version::APP_NAME, version::VERSION),
        }
    }
}

/// On-disk configuration; every field is optional
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    /// Base URL of the catalog API, e.g. "https://api.example.com"
    pub base_url: Option<String>,

    /// Products requested per page
    pub limit: Option<u32>,

    /// Pages shown on each side of the current page
    pub page_window: Option<u32>,

    /// Request timeout as a human readable duration, e.g. "10s" or "1m 30s"
    pub request_timeout: Option<String>,

    /// Image shown for products without a usable image reference
    pub placeholder_image: Option<String>,

    /// User agent sent with every request
    pub user_agent: Option<String>,
}

impl Config {
    /// Build the configuration from defaults, a config file and the environment.
    ///
    /// An explicit `path` must exist; otherwise the default locations are
    /// searched and a missing file is not an error.
    pub async fn init(path: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = Self::default();

        let file_config = match path {
            Some(path) => Some(Self::load_file(path).await?),
            None => Self::load_from_default_locations().await?,
        };
        if let Some(file_config) = file_config {
            config.merge_with(file_config)?;
        }

        config.load_from_env();

        Ok(config)
    }

    /// Candidate config files in priority order
    pub fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.catalog.json"),
            PathBuf::from("./catalog.json"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("catalog").join("catalog.json"));
        }
        paths
    }

    async fn load_from_default_locations() -> Result<Option<FileConfig>> {
        for path in Self::default_locations() {
            if path.exists() {
                return Self::load_file(&path).await.map(Some);
            }
        }
        Ok(None)
    }

    /// Read and parse a config file
    pub async fn load_file(path: &Path) -> Result<FileConfig> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Overlay the fields present in a config file
    pub fn merge_with(&mut self, other: FileConfig) -> Result<()> {
        if let Some(base_url) = other.base_url {
            self.base_url = base_url;
        }
        if let Some(limit) = other.limit {
            self.limit = limit;
        }
        if let Some(page_window) = other.page_window {
            self.page_window = page_window;
        }
        if let Some(timeout) = other.request_timeout {
            self.request_timeout = humantime::parse_duration(&timeout)
                .with_context(|| format!("Invalid request_timeout '{}'", timeout))?;
        }
        if let Some(placeholder) = other.placeholder_image {
            self.placeholder_image = placeholder;
        }
        if let Some(user_agent) = other.user_agent {
            self.user_agent = user_agent;
        }
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("CATALOG_BASE_URL") {
            self.base_url = base_url;
        }

        if let Some(limit) = lookup("CATALOG_LIMIT") {
            match limit.parse() {
                Ok(limit) => self.limit = limit,
                Err(_) => warn!("Ignoring invalid CATALOG_LIMIT '{}'", limit),
            }
        }

        if let Some(window) = lookup("CATALOG_PAGE_WINDOW") {
            match window.parse() {
                Ok(window) => self.page_window = window,
                Err(_) => warn!("Ignoring invalid CATALOG_PAGE_WINDOW '{}'", window),
            }
        }

        if let Some(timeout) = lookup("CATALOG_TIMEOUT") {
            match humantime::parse_duration(&timeout) {
                Ok(timeout) => self.request_timeout = timeout,
                Err(e) => warn!("Ignoring invalid CATALOG_TIMEOUT '{}': {}", timeout, e),
            }
        }

        if let Some(placeholder) = lookup("CATALOG_PLACEHOLDER_IMAGE") {
            self.placeholder_image = placeholder;
        }

        if let Some(user_agent) = lookup("CATALOG_USER_AGENT") {
            self.user_agent = user_agent;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL '{}'", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "Base URL must use http or https, got '{}'",
                url.scheme()
            ));
        }

        if self.limit == 0 {
            return Err(anyhow::anyhow!("limit must be greater than 0"));
        }

        if self.page_window > MAX_PAGE_WINDOW {
            return Err(anyhow::anyhow!(
                "page window must be at most {}, got {}",
                MAX_PAGE_WINDOW,
                self.page_window
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(anyhow::anyhow!("request timeout must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.limit, 20);
        assert_eq!(config.page_window, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("catalog-browser/"));
        config.validate().unwrap();
    }

    #[test]
    fn test_merge_with_file() {
        let mut config = Config::default();
        config
            .merge_with(FileConfig {
                base_url: Some("http://localhost:8080".to_string()),
                limit: Some(12),
                request_timeout: Some("1m 30s".to_string()),
                ..FileConfig::default()
            })
            .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.limit, 12);
        assert_eq!(config.page_window, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_merge_rejects_bad_duration() {
        let mut config = Config::default();
        let result = config.merge_with(FileConfig {
            request_timeout: Some("soon".to_string()),
            ..FileConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CATALOG_BASE_URL", "https://shop.test"),
            ("CATALOG_LIMIT", "50"),
            ("CATALOG_PAGE_WINDOW", "not-a-number"),
            ("CATALOG_TIMEOUT", "250ms"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "https://shop.test");
        assert_eq!(config.limit, 50);
        assert_eq!(config.page_window, 2);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        config.limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.base_url = "ftp://files.test".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.page_window = MAX_PAGE_WINDOW;
        assert!(config.validate().is_ok());
        config.page_window = 1_000_000_000;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"limit": 8, "placeholder_image": "none.png"}}"#).unwrap();

        let file_config = Config::load_file(file.path()).await.unwrap();
        assert_eq!(file_config.limit, Some(8));
        assert_eq!(file_config.placeholder_image.as_deref(), Some("none.png"));
        assert_eq!(file_config.base_url, None);
    }

    #[tokio::test]
    async fn test_unknown_keys_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"limt": 8}}"#).unwrap();
        assert!(Config::load_file(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(Config::init(Some(&missing)).await.is_err());
    }
}
