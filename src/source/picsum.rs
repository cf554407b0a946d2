//! picsum.photos API client
//!
//! Implements `PhotoSource` against the public picsum.photos list
//! endpoint: `GET {base}/v2/list?page=N&limit=M` returning a JSON array
//! of photo objects.

use super::PhotoSource;
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::model::Photo;
use async_trait::async_trait;
use tracing::debug;

/// Base URL of the public picsum.photos API
pub const DEFAULT_BASE_URL: &str = "https://picsum.photos";

/// Path of the paginated list endpoint
const LIST_PATH: &str = "/v2/list";

/// Client for the picsum.photos list API
#[derive(Debug)]
pub struct PicsumClient {
    http: HttpClient,
}

impl PicsumClient {
    /// Create a client against the public picsum.photos API
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let config = HttpClientConfig::builder().base_url(base_url).build();
        Self {
            http: HttpClient::with_config(config),
        }
    }

    /// Create a client from a feed configuration
    pub fn from_config(config: &FeedConfig) -> Self {
        let http_config = HttpClientConfig::builder()
            .base_url(config.base_url.clone())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build();
        Self {
            http: HttpClient::with_config(http_config),
        }
    }
}

impl Default for PicsumClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhotoSource for PicsumClient {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Photo>> {
        let request = RequestConfig::new()
            .query("page", page.to_string())
            .query("limit", limit.to_string());

        let response = self.http.get_with_config(LIST_PATH, request).await?;
        let body = response.text().await?;

        let photos: Vec<Photo> = serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("photo list page {page}: {e}")))?;

        debug!("Fetched {} photos for page {}", photos.len(), page);
        Ok(photos)
    }
}
