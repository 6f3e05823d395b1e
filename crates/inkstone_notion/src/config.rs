//! Configuration for the Notion client and adapter.
//!
//! Defaults cover everything except the API credential, which normally
//! arrives via `NOTION_API_KEY`. A TOML file can override any field and the
//! environment wins over the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NotionError, Result};

/// Environment variable holding the integration token.
pub const API_KEY_ENV: &str = "NOTION_API_KEY";
/// Environment variable holding the posts database id.
pub const POST_DATABASE_ENV: &str = "NOTION_POST_DATABASE_ID";
/// Environment variable holding the projects database id.
pub const PROJECT_DATABASE_ENV: &str = "NOTION_PROJECTS_DATABASE_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Bearer token for the integration.
    pub api_key: String,
    pub base_url: String,
    /// Listing page size. The API caps this at 100.
    pub page_size: usize,
    /// Bound on concurrent child-subtree fetches.
    pub child_fetch_concurrency: usize,
    pub request_timeout_secs: u64,
    /// Memoization window for page and database fetches.
    pub cache_ttl_secs: u64,
    pub post_database_id: Option<String>,
    pub project_database_id: Option<String>,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.notion.com".to_string(),
            page_size: 100,
            child_fetch_concurrency: 6,
            request_timeout_secs: 10,
            cache_ttl_secs: 300,
            post_database_id: None,
            project_database_id: None,
        }
    }
}

impl NotionConfig {
    /// Defaults plus whatever the process environment provides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load a TOML config file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| NotionError::Configuration {
            field: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|e| NotionError::Configuration {
            field: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.api_key = key;
            }
        }
        if let Ok(id) = std::env::var(POST_DATABASE_ENV) {
            if !id.is_empty() {
                self.post_database_id = Some(id);
            }
        }
        if let Ok(id) = std::env::var(PROJECT_DATABASE_ENV) {
            if !id.is_empty() {
                self.project_database_id = Some(id);
            }
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_sane() {
        let config = NotionConfig::default();
        assert_eq!(config.base_url, "https://api.notion.com");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert!(config.post_database_id.is_none());
    }

    #[test]
    fn toml_round_trip_keeps_overrides() {
        let raw = r#"
            api_key = "secret_abc"
            page_size = 50
            cache_ttl_secs = 60
        "#;
        let config: NotionConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.api_key, "secret_abc");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.cache_ttl_secs, 60);
        // Untouched fields keep their defaults.
        assert_eq!(config.child_fetch_concurrency, 6);
    }
}
