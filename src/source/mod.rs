//! Photo source module
//!
//! Defines the `PhotoSource` trait the feed controller fetches through,
//! plus the picsum.photos implementation used by the CLI.

mod picsum;

pub use picsum::{PicsumClient, DEFAULT_BASE_URL};

use crate::error::Result;
use crate::model::Photo;
use async_trait::async_trait;

/// Core trait that photo backends implement
///
/// Pages are 1-based. Returning an empty vec means the source has no
/// records at this page; the caller treats that as end of data.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Fetch one page of photos with the given page size
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Photo>>;
}
