//! Project Feed
//!
//! The browsing side of a hackathon project showcase:
//! - Project store holding the approved projects and optimistic likes
//! - Pure filter engine (tags, search, date range, status, sort)
//! - Feed controller turning both into a Loading/Ready/Empty list of cards
//! - HTTP transport for the projects API

pub mod feed;
pub mod identity;
pub mod notify;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use feed::{FeedController, FilterSpec, ProjectStore, SortMode};
use identity::{Identity, SessionIdentity};
use notify::{LogNotifier, Notifier};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use transport::{FeedTransport, HttpFeedTransport};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub api: ApiYamlConfig,
    pub viewer: ViewerYamlConfig,
    pub feed: FeedYamlConfig,
}

/// Projects API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiYamlConfig {
    pub base_url: String,
    /// Bearer token of the session, if any
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiYamlConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            token: None,
            timeout_secs: 10,
        }
    }
}

/// Who is browsing. No id means anonymous.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ViewerYamlConfig {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedYamlConfig {
    pub default_sort: String,
}

impl Default for FeedYamlConfig {
    fn default() -> Self {
        Self {
            default_sort: SortMode::default().to_string(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub http_timeout_secs: u64,
    pub viewer_id: Option<String>,
    /// Sort used when the feed query does not name one
    pub default_sort: SortMode,
}

impl Config {
    /// Load configuration from environment variables and `config.yaml` in CWD.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let default_sort = std::env::var("FEED_DEFAULT_SORT").unwrap_or(yaml.feed.default_sort);

        Ok(Self {
            api_base_url: std::env::var("FEED_API_URL").unwrap_or(yaml.api.base_url),
            api_token: std::env::var("FEED_API_TOKEN").ok().or(yaml.api.token),
            http_timeout_secs: std::env::var("FEED_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.api.timeout_secs),
            viewer_id: std::env::var("FEED_VIEWER_ID").ok().or(yaml.viewer.id),
            default_sort: SortMode::parse_or_default(&default_sort),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub transport: Arc<dyn FeedTransport>,
    pub notifier: Arc<dyn Notifier>,
    pub identity: Arc<dyn Identity>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the HTTP transport, log notifier and configured viewer.
    pub fn new(config: Config) -> Result<Self> {
        let transport = Arc::new(HttpFeedTransport::new(
            &config.api_base_url,
            config.api_token.clone(),
            config.http_timeout(),
        )?);
        let identity = Arc::new(SessionIdentity::from_config(config.viewer_id.as_deref()));

        Ok(Self {
            transport,
            notifier: Arc::new(LogNotifier),
            identity,
            config: Arc::new(config),
        })
    }

    /// A fresh feed session for the given page query string
    pub fn feed_controller(&self, query: &str) -> FeedController {
        let spec = FilterSpec::from_query_string_with_sort(query, self.config.default_sort);
        let store = ProjectStore::new(self.transport.clone(), self.notifier.clone());
        FeedController::new(store, self.identity.clone(), spec)
    }
}

// ============================================================================
// Tests
// ============================================================================
