//! Photo record model
//!
//! A `Photo` is one remotely hosted image as returned by the list endpoint.
//! The wire format is a JSON object with `id`, `author`, `url` and
//! `download_url` fields; anything else the API adds (width, height, ...)
//! is ignored.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use url::Url;

/// Fixed square size used for derived thumbnail URLs
pub const THUMBNAIL_SIZE: u32 = 256;

/// Base URL for per-photo thumbnail rendering
const THUMBNAIL_BASE: &str = "https://picsum.photos/id";

/// One photo record from the remote source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Photo {
    /// Unique identifier assigned by the remote source
    pub id: String,

    /// Display name of the photographer
    pub author: String,

    /// Canonical page URL (passthrough, unused by the feed logic)
    pub url: String,

    /// Raw path the download URL is derived from
    #[serde(rename = "download_url")]
    pub download_path: String,
}

impl Photo {
    /// Thumbnail URL, built deterministically from the id and a fixed size
    pub fn thumbnail_url(&self) -> Result<Url> {
        let raw = format!(
            "{THUMBNAIL_BASE}/{}/{size}/{size}.jpg",
            self.id,
            size = THUMBNAIL_SIZE
        );
        Ok(Url::parse(&raw)?)
    }

    /// Full-resolution download URL, parsed from the raw download path
    pub fn download_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.download_path)?)
    }
}
