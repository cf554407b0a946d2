//! Feed state types
//!
//! The state object owned by the controller: accumulated photos,
//! pagination counters, and fetch statistics.

use crate::model::Photo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedPhase {
    /// No fetch in flight and the page counter is below the ceiling
    Idle,
    /// A fetch is in flight
    Fetching,
    /// The page counter has reached the configured ceiling
    Exhausted,
}

impl std::fmt::Display for FeedPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching => write!(f, "fetching"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Counters accumulated over the life of a controller
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedStats {
    /// Pages that returned at least one photo
    pub pages_fetched: u64,
    /// Total photos appended
    pub photos_fetched: u64,
    /// Pages that came back empty
    pub empty_pages: u64,
    /// Fetches that failed with a transport or decode error
    pub errors: u64,
    /// Completion time of the most recent fetch
    pub last_fetch_at: Option<DateTime<Utc>>,
}

/// Mutable pagination state owned by the controller
#[derive(Debug, Clone)]
pub struct FeedState {
    /// Accumulated photos in fetch order
    pub photos: Vec<Photo>,
    /// Current page counter (1-based)
    pub current_page: u32,
    /// Last page that returned records
    pub last_successful_page: u32,
    /// Page ceiling; triggers stop once the counter reaches it
    pub max_page: u32,
    /// Id of the most recently appended photo
    pub last_photo_id: Option<String>,
    /// Fetch statistics
    pub stats: FeedStats,
}

impl FeedState {
    /// Create a fresh state starting at the given page with a ceiling
    pub fn new(start_page: u32, max_page: u32) -> Self {
        Self {
            photos: Vec::new(),
            current_page: start_page,
            last_successful_page: start_page,
            max_page,
            last_photo_id: None,
            stats: FeedStats::default(),
        }
    }

    /// Derive the lifecycle phase given the in-flight flag
    pub fn phase(&self, fetching: bool) -> FeedPhase {
        if fetching {
            FeedPhase::Fetching
        } else if self.current_page >= self.max_page {
            FeedPhase::Exhausted
        } else {
            FeedPhase::Idle
        }
    }
}

/// Point-in-time copy of the controller state
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    /// Lifecycle phase at snapshot time
    pub phase: FeedPhase,
    /// Accumulated photos in fetch order
    pub photos: Vec<Photo>,
    /// Current page counter
    pub current_page: u32,
    /// Last page that returned records
    pub last_successful_page: u32,
    /// Page ceiling
    pub max_page: u32,
    /// Id of the most recently appended photo
    pub last_photo_id: Option<String>,
    /// Fetch statistics
    pub stats: FeedStats,
}
