//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the server base URL, request timeout, page size, and the
//! last username used to sign up.
//!
//! Configuration is stored at `~/.config/feedreader/config.json`. The base URL
//! can be overridden with the `FEEDREADER_BASE_URL` environment variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "feedreader";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured base URL
pub const BASE_URL_ENV: &str = "FEEDREADER_BASE_URL";

/// Where the aggregator server listens by default
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Posts per page; matches the server's own default limit.
const DEFAULT_POSTS_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub last_username: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub posts_page_size: Option<u32>,
    /// Base URL from the environment; wins over `base_url` and is never saved
    #[serde(skip)]
    base_url_override: Option<String>,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Apply `FEEDREADER_BASE_URL` if it is set and non-empty
    pub fn apply_env_overrides(&mut self) {
        self.override_base_url(std::env::var(BASE_URL_ENV).ok());
    }

    fn override_base_url(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            debug!(%url, "Base URL overridden from environment");
            self.base_url_override = Some(url.trim().to_string());
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url_override
            .as_deref()
            .or(self.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn posts_page_size(&self) -> u32 {
        self.posts_page_size
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_POSTS_PAGE_SIZE)
    }

    /// `~/.config/feedreader/config.json` on Linux
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for log files
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
