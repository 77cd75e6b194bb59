//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default Appwrite API endpoint.
const DEFAULT_APPWRITE_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Movie catalog (TMDB) settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Search analytics store (Appwrite) settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// Search tuning.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Movie catalog configuration. The API token comes from `TMDB_API_TOKEN`.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Override for the TMDB v3 base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Analytics store configuration. The API key comes from `APPWRITE_API_KEY`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Appwrite API endpoint (including `/v1`).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Appwrite project ID.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Database holding the search counts collection.
    #[serde(default)]
    pub database_id: Option<String>,
    /// Search counts collection.
    #[serde(default)]
    pub collection_id: Option<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            project_id: None,
            database_id: None,
            collection_id: None,
        }
    }
}

fn default_endpoint() -> String {
    String::from(DEFAULT_APPWRITE_ENDPOINT)
}

/// Search tuning.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period in milliseconds before a typed query is searched.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Number of trending searches to show.
    #[serde(default = "default_trending_limit")]
    pub trending_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            trending_limit: default_trending_limit(),
        }
    }
}

const fn default_debounce_ms() -> u64 {
    500
}

const fn default_trending_limit() -> u32 {
    5
}

impl SearchConfig {
    /// Returns the debounce window.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}
