//! Feed controller module
//!
//! Sequences page requests against a photo source, accumulates results,
//! and signals exhaustion. At most one fetch is in flight at a time; the
//! in-flight guard is released on every completion path.

mod state;

pub use state::{FeedPhase, FeedSnapshot, FeedStats};

use crate::config::FeedConfig;
use crate::model::Photo;
use crate::source::PhotoSource;
use chrono::Utc;
use state::FeedState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Infinite-scroll pagination controller
///
/// Owns the accumulated photos and the pagination counters, and fetches
/// through a [`PhotoSource`]. Cheap to clone; clones share state.
///
/// A fetch advances through three outcomes:
/// - non-empty page: photos are appended and the page is recorded as the
///   last successful one
/// - empty page: the page counter rolls back to the last successful page
/// - error: same rollback, and the error is logged
#[derive(Clone)]
pub struct FeedController {
    inner: Arc<Inner>,
}

struct Inner {
    /// Controller state behind a single lock
    state: RwLock<FeedState>,
    /// True while a fetch is in flight
    is_fetching: AtomicBool,
    /// Backend all page requests go through
    source: Arc<dyn PhotoSource>,
    /// Records requested per page
    page_size: u32,
}

/// Holds the in-flight flag for one fetch; dropping it releases the flag
struct FetchGuard {
    inner: Arc<Inner>,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.inner.is_fetching.store(false, Ordering::Release);
    }
}

impl FeedController {
    /// Create a controller with default configuration
    pub fn new(source: Arc<dyn PhotoSource>) -> Self {
        Self::with_config(source, &FeedConfig::default())
    }

    /// Create a controller with custom configuration
    pub fn with_config(source: Arc<dyn PhotoSource>, config: &FeedConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(FeedState::new(config.start_page, config.max_page)),
                is_fetching: AtomicBool::new(false),
                source,
                page_size: config.page_size,
            }),
        }
    }

    /// Kick off the first fetch if nothing has been loaded yet
    ///
    /// Returns the handle of the spawned fetch task, or `None` if photos
    /// are already present or a fetch is in flight.
    pub async fn load_initial(&self) -> Option<JoinHandle<()>> {
        let page = {
            let state = self.inner.state.read().await;
            if !state.photos.is_empty() {
                return None;
            }
            state.current_page
        };
        self.fetch_page(page)
    }

    /// React to a scroll event reporting the id nearest the boundary
    ///
    /// Issues a fetch for the next page only when all guards hold: the
    /// sentinel matches the last accumulated photo, no fetch is in
    /// flight, and the page counter is below the ceiling. Returns the
    /// spawned task handle, or `None` when any guard fails.
    pub async fn trigger_fetch_if_needed(&self, sentinel: &str) -> Option<JoinHandle<()>> {
        let (page, guard) = {
            let mut state = self.inner.state.write().await;

            if state.last_photo_id.as_deref() != Some(sentinel) {
                return None;
            }
            if state.current_page >= state.max_page {
                return None;
            }
            let guard = self.try_begin_fetch()?;
            state.current_page += 1;
            (state.current_page, guard)
        };
        Some(self.spawn_fetch(page, guard))
    }

    /// Fetch a specific page immediately, bypassing the scroll guards
    ///
    /// Still subject to the single-fetch rule: returns `None` when a
    /// fetch is already in flight.
    pub fn fetch_page(&self, page: u32) -> Option<JoinHandle<()>> {
        let guard = self.try_begin_fetch()?;
        Some(self.spawn_fetch(page, guard))
    }

    /// Raise the page ceiling
    ///
    /// Returns false and leaves the ceiling unchanged unless `new_max`
    /// is strictly greater than the current ceiling.
    pub async fn raise_page_limit(&self, new_max: u32) -> bool {
        let mut state = self.inner.state.write().await;
        if new_max <= state.max_page {
            return false;
        }
        info!("Raising page limit from {} to {}", state.max_page, new_max);
        state.max_page = new_max;
        true
    }

    /// Whether a fetch is currently in flight
    pub fn is_fetching(&self) -> bool {
        self.inner.is_fetching.load(Ordering::Acquire)
    }

    /// Copy of the accumulated photos in fetch order
    pub async fn photos(&self) -> Vec<Photo> {
        self.inner.state.read().await.photos.clone()
    }

    /// Id of the most recently appended photo
    pub async fn last_photo_id(&self) -> Option<String> {
        self.inner.state.read().await.last_photo_id.clone()
    }

    /// Current lifecycle phase
    pub async fn phase(&self) -> FeedPhase {
        let state = self.inner.state.read().await;
        state.phase(self.is_fetching())
    }

    /// Point-in-time copy of the full controller state
    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.inner.state.read().await;
        FeedSnapshot {
            phase: state.phase(self.is_fetching()),
            photos: state.photos.clone(),
            current_page: state.current_page,
            last_successful_page: state.last_successful_page,
            max_page: state.max_page,
            last_photo_id: state.last_photo_id.clone(),
            stats: state.stats.clone(),
        }
    }

    /// Fetch statistics
    pub async fn stats(&self) -> FeedStats {
        self.inner.state.read().await.stats.clone()
    }

    fn try_begin_fetch(&self) -> Option<FetchGuard> {
        if self
            .inner
            .is_fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        Some(FetchGuard {
            inner: Arc::clone(&self.inner),
        })
    }

    fn spawn_fetch(&self, page: u32, guard: FetchGuard) -> JoinHandle<()> {
        tokio::spawn(run_fetch(Arc::clone(&self.inner), page, guard))
    }
}

impl std::fmt::Debug for FeedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedController")
            .field("is_fetching", &self.is_fetching())
            .field("page_size", &self.inner.page_size)
            .finish_non_exhaustive()
    }
}

/// Execute one page fetch and apply the outcome to the state
///
/// All state mutations happen in a single critical section; the
/// in-flight guard is released only after they are visible.
async fn run_fetch(inner: Arc<Inner>, page: u32, guard: FetchGuard) {
    let result = inner.source.fetch_page(page, inner.page_size).await;

    let mut state = inner.state.write().await;
    match result {
        Ok(photos) if photos.is_empty() => {
            debug!(
                "Page {} came back empty, rolling back to page {}",
                page, state.last_successful_page
            );
            state.current_page = state.last_successful_page;
            state.stats.empty_pages += 1;
        }
        Ok(photos) => {
            debug!("Appending {} photos from page {}", photos.len(), page);
            state.last_photo_id = photos.last().map(|p| p.id.clone());
            state.stats.pages_fetched += 1;
            state.stats.photos_fetched += photos.len() as u64;
            state.photos.extend(photos);
            state.last_successful_page = page;
        }
        Err(e) => {
            warn!("Failed to fetch page {}: {}", page, e);
            state.current_page = state.last_successful_page;
            state.stats.errors += 1;
        }
    }
    state.stats.last_fetch_at = Some(Utc::now());

    // state updates must be visible before the guard is released
    drop(state);
    drop(guard);
}

#[cfg(test)]
mod tests;
