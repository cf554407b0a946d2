//! Configuration types for the photo feed
//!
//! This module contains the feed configuration structure, its YAML
//! loaders, and validation of the invariants serde cannot express.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Feed configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the photo API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Page the first fetch starts from (1-based)
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Page ceiling; triggers stop once the counter reaches it
    #[serde(default = "default_max_page")]
    pub max_page: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            start_page: default_start_page(),
            max_page: default_max_page(),
            request_timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    crate::source::DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    30
}

fn default_start_page() -> u32 {
    1
}

fn default_max_page() -> u32 {
    5
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("picfeed/{}", env!("CARGO_PKG_VERSION"))
}

impl FeedConfig {
    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Validate invariants the type system cannot express
    pub fn validate(&self) -> Result<()> {
        if Url::parse(&self.base_url).is_err() {
            return Err(Error::config(format!(
                "base_url is not a valid URL: {}",
                self.base_url
            )));
        }
        if self.page_size == 0 {
            return Err(Error::config("page_size must be at least 1"));
        }
        if self.start_page == 0 {
            return Err(Error::config("start_page is 1-based and must be at least 1"));
        }
        if self.max_page < self.start_page {
            return Err(Error::config(format!(
                "max_page ({}) must not be below start_page ({})",
                self.max_page, self.start_page
            )));
        }
        Ok(())
    }
}

/// Load a feed configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FeedConfig> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(Error::Io)?;
    load_config_from_str(&content)
}

/// Load a feed configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<FeedConfig> {
    let config: FeedConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}
