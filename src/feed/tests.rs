//! Tests for the feed controller

use super::*;
use crate::error::{Error, Result};
use crate::model::Photo;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::atomic::AtomicU32;
use test_case::test_case;
use tokio::sync::Notify;

/// Scripted outcome for a single page
enum PageScript {
    Records(Vec<Photo>),
    Empty,
    TransportError,
    DecodeError,
    /// Fails on the first attempt, returns records afterwards
    FlakyThenRecords(Vec<Photo>, AtomicBool),
}

/// In-memory source returning scripted outcomes per page
///
/// Unscripted pages come back empty, matching a source that has run out
/// of records.
struct ScriptedSource {
    pages: HashMap<u32, PageScript>,
    calls: AtomicU32,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
            calls: AtomicU32::new(0),
        }
    }

    fn with_page(mut self, page: u32, script: PageScript) -> Self {
        self.pages.insert(page, script);
        self
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoSource for ScriptedSource {
    async fn fetch_page(&self, page: u32, _limit: u32) -> Result<Vec<Photo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(&page) {
            Some(PageScript::Records(photos)) => Ok(photos.clone()),
            Some(PageScript::Empty) | None => Ok(Vec::new()),
            Some(PageScript::TransportError) => Err(Error::http_status(500, "scripted failure")),
            Some(PageScript::DecodeError) => Err(Error::decode("scripted bad payload")),
            Some(PageScript::FlakyThenRecords(photos, failed)) => {
                if failed.swap(true, Ordering::SeqCst) {
                    Ok(photos.clone())
                } else {
                    Err(Error::http_status(503, "scripted transient failure"))
                }
            }
        }
    }
}

/// Source that blocks on one page until the gate is notified
struct GatedSource {
    gate: Arc<Notify>,
    gated_page: u32,
    pages: HashMap<u32, Vec<Photo>>,
}

#[async_trait]
impl PhotoSource for GatedSource {
    async fn fetch_page(&self, page: u32, _limit: u32) -> Result<Vec<Photo>> {
        if page == self.gated_page {
            self.gate.notified().await;
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}

fn make_photos(first_index: u32, count: u32) -> Vec<Photo> {
    (first_index..first_index + count)
        .map(|i| Photo {
            id: format!("p{i}"),
            author: format!("Author {i}"),
            url: format!("https://example.com/photos/p{i}"),
            download_path: format!("https://example.com/download/p{i}"),
        })
        .collect()
}

/// A full page of 30 records, ids continuing from the previous page
fn full_page(page: u32) -> PageScript {
    PageScript::Records(make_photos((page - 1) * 30, 30))
}

fn controller(source: ScriptedSource) -> FeedController {
    FeedController::new(Arc::new(source))
}

fn controller_with_max(source: ScriptedSource, max_page: u32) -> FeedController {
    let config = FeedConfig {
        max_page,
        ..FeedConfig::default()
    };
    FeedController::with_config(Arc::new(source), &config)
}

fn ids(photos: &[Photo]) -> Vec<&str> {
    photos.iter().map(|p| p.id.as_str()).collect()
}

// ============================================================================
// Initial load and accumulation
// ============================================================================

#[tokio::test]
async fn test_initial_load_accumulates_first_page() {
    let feed = controller(ScriptedSource::new().with_page(1, full_page(1)));

    let handle = feed.load_initial().await.unwrap();
    handle.await.unwrap();

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.photos.len(), 30);
    assert_eq!(snapshot.photos[0].id, "p0");
    assert_eq!(snapshot.photos[29].id, "p29");
    assert_eq!(snapshot.last_photo_id, Some("p29".to_string()));
    assert_eq!(snapshot.current_page, 1);
    assert_eq!(snapshot.last_successful_page, 1);
    assert_eq!(snapshot.stats.pages_fetched, 1);
    assert_eq!(snapshot.stats.photos_fetched, 30);
    assert!(snapshot.stats.last_fetch_at.is_some());
    assert!(!feed.is_fetching());
}

#[tokio::test]
async fn test_initial_load_noop_when_photos_present() {
    let source = ScriptedSource::new().with_page(1, full_page(1));
    let feed = controller(source);

    feed.load_initial().await.unwrap().await.unwrap();
    assert!(feed.load_initial().await.is_none());
    assert_eq!(feed.photos().await.len(), 30);
}

#[tokio::test]
async fn test_trigger_fetches_next_page() {
    let feed = controller(
        ScriptedSource::new()
            .with_page(1, full_page(1))
            .with_page(2, full_page(2)),
    );

    feed.load_initial().await.unwrap().await.unwrap();

    let handle = feed.trigger_fetch_if_needed("p29").await.unwrap();
    handle.await.unwrap();

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.photos.len(), 60);
    assert_eq!(snapshot.photos[30].id, "p30");
    assert_eq!(snapshot.last_photo_id, Some("p59".to_string()));
    assert_eq!(snapshot.current_page, 2);
    assert_eq!(snapshot.last_successful_page, 2);
}

#[tokio::test]
async fn test_append_preserves_order_across_pages() {
    let feed = controller(
        ScriptedSource::new()
            .with_page(1, PageScript::Records(make_photos(0, 3)))
            .with_page(2, PageScript::Records(make_photos(3, 3))),
    );

    feed.load_initial().await.unwrap().await.unwrap();
    feed.trigger_fetch_if_needed("p2")
        .await
        .unwrap()
        .await
        .unwrap();

    let photos = feed.photos().await;
    assert_eq!(ids(&photos), vec!["p0", "p1", "p2", "p3", "p4", "p5"]);
}

// ============================================================================
// Trigger guards
// ============================================================================

#[tokio::test]
async fn test_trigger_sentinel_mismatch_is_noop() {
    let source = ScriptedSource::new().with_page(1, full_page(1));
    let feed = controller(source);

    feed.load_initial().await.unwrap().await.unwrap();

    // Sentinel reports a photo that is not the last one
    assert!(feed.trigger_fetch_if_needed("p5").await.is_none());

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.photos.len(), 30);
    assert_eq!(snapshot.current_page, 1);
    assert!(!feed.is_fetching());
}

#[tokio::test]
async fn test_trigger_before_any_load_is_noop() {
    let feed = controller(ScriptedSource::new());
    assert!(feed.trigger_fetch_if_needed("p0").await.is_none());
}

#[tokio::test]
async fn test_trigger_at_ceiling_is_noop() {
    let feed = controller_with_max(
        ScriptedSource::new()
            .with_page(1, full_page(1))
            .with_page(2, full_page(2)),
        2,
    );

    feed.load_initial().await.unwrap().await.unwrap();
    feed.trigger_fetch_if_needed("p29")
        .await
        .unwrap()
        .await
        .unwrap();

    // Counter is now at the ceiling; matching sentinel no longer triggers
    assert_eq!(feed.snapshot().await.current_page, 2);
    assert!(feed.trigger_fetch_if_needed("p59").await.is_none());
    assert_eq!(feed.phase().await, FeedPhase::Exhausted);
}

#[tokio::test]
async fn test_trigger_while_fetch_in_flight_is_noop() {
    let gate = Arc::new(Notify::new());
    let mut pages = HashMap::new();
    pages.insert(1, make_photos(0, 30));
    pages.insert(2, make_photos(30, 30));
    let source = GatedSource {
        gate: Arc::clone(&gate),
        gated_page: 2,
        pages,
    };
    let feed = FeedController::new(Arc::new(source));

    feed.load_initial().await.unwrap().await.unwrap();

    let in_flight = feed.trigger_fetch_if_needed("p29").await.unwrap();
    assert!(feed.is_fetching());
    assert_eq!(feed.phase().await, FeedPhase::Fetching);

    // Second trigger and direct fetch are both rejected while one is out
    assert!(feed.trigger_fetch_if_needed("p29").await.is_none());
    assert!(feed.fetch_page(3).is_none());

    gate.notify_one();
    in_flight.await.unwrap();

    assert!(!feed.is_fetching());
    assert_eq!(feed.photos().await.len(), 60);
}

#[tokio::test]
async fn test_concurrent_triggers_yield_single_fetch() {
    let gate = Arc::new(Notify::new());
    let mut pages = HashMap::new();
    pages.insert(1, make_photos(0, 30));
    pages.insert(2, make_photos(30, 30));
    let source = GatedSource {
        gate: Arc::clone(&gate),
        gated_page: 2,
        pages,
    };
    let feed = FeedController::new(Arc::new(source));

    feed.load_initial().await.unwrap().await.unwrap();

    let (first, second) = tokio::join!(
        feed.trigger_fetch_if_needed("p29"),
        feed.trigger_fetch_if_needed("p29"),
    );
    assert!(first.is_some() != second.is_some());

    gate.notify_one();
    first.or(second).unwrap().await.unwrap();

    // Only one append happened
    assert_eq!(feed.photos().await.len(), 60);
    assert_eq!(feed.snapshot().await.current_page, 2);
}

// ============================================================================
// Rollback on empty and on failure
// ============================================================================

#[tokio::test]
async fn test_empty_page_rolls_back_counter() {
    let feed = controller(
        ScriptedSource::new()
            .with_page(1, full_page(1))
            .with_page(2, full_page(2))
            .with_page(3, PageScript::Empty),
    );

    feed.load_initial().await.unwrap().await.unwrap();
    feed.trigger_fetch_if_needed("p29")
        .await
        .unwrap()
        .await
        .unwrap();
    feed.trigger_fetch_if_needed("p59")
        .await
        .unwrap()
        .await
        .unwrap();

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.current_page, 2);
    assert_eq!(snapshot.last_successful_page, 2);
    assert_eq!(snapshot.photos.len(), 60);
    assert_eq!(snapshot.stats.empty_pages, 1);
    assert!(!feed.is_fetching());
}

#[test_case(PageScript::TransportError; "transport error")]
#[test_case(PageScript::DecodeError; "decode error")]
#[tokio::test]
async fn test_failed_page_rolls_back_counter(script: PageScript) {
    let feed = controller(
        ScriptedSource::new()
            .with_page(1, full_page(1))
            .with_page(2, script),
    );

    feed.load_initial().await.unwrap().await.unwrap();
    feed.trigger_fetch_if_needed("p29")
        .await
        .unwrap()
        .await
        .unwrap();

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.current_page, 1);
    assert_eq!(snapshot.last_successful_page, 1);
    assert_eq!(snapshot.photos.len(), 30);
    assert_eq!(snapshot.stats.errors, 1);
    assert!(!feed.is_fetching());
}

#[tokio::test]
async fn test_failed_page_retried_on_next_trigger() {
    let feed = controller(
        ScriptedSource::new().with_page(1, full_page(1)).with_page(
            2,
            PageScript::FlakyThenRecords(make_photos(30, 30), AtomicBool::new(false)),
        ),
    );

    feed.load_initial().await.unwrap().await.unwrap();

    // First attempt at page 2 fails and rolls back
    feed.trigger_fetch_if_needed("p29")
        .await
        .unwrap()
        .await
        .unwrap();
    assert_eq!(feed.snapshot().await.current_page, 1);

    // Scrolling again retries the same page number
    feed.trigger_fetch_if_needed("p29")
        .await
        .unwrap()
        .await
        .unwrap();

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.current_page, 2);
    assert_eq!(snapshot.last_successful_page, 2);
    assert_eq!(snapshot.photos.len(), 60);
    assert_eq!(snapshot.stats.errors, 1);
}

#[tokio::test]
async fn test_end_of_data_triggers_stay_pinned() {
    let source = Arc::new(
        ScriptedSource::new()
            .with_page(1, full_page(1))
            .with_page(2, PageScript::Empty),
    );
    let feed = FeedController::new(Arc::clone(&source) as Arc<dyn PhotoSource>);

    feed.load_initial().await.unwrap().await.unwrap();

    for _ in 0..3 {
        feed.trigger_fetch_if_needed("p29")
            .await
            .unwrap()
            .await
            .unwrap();
        let snapshot = feed.snapshot().await;
        assert_eq!(snapshot.photos.len(), 30);
        assert_eq!(snapshot.current_page, 1);
    }

    assert_eq!(feed.stats().await.empty_pages, 3);
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn test_empty_rollback_at_ceiling_is_exhausted() {
    let feed = controller_with_max(
        ScriptedSource::new()
            .with_page(1, full_page(1))
            .with_page(2, full_page(2))
            .with_page(3, PageScript::Empty),
        2,
    );

    feed.load_initial().await.unwrap().await.unwrap();
    feed.trigger_fetch_if_needed("p29")
        .await
        .unwrap()
        .await
        .unwrap();

    // Force a fetch past the ceiling; the empty result pins the counter
    // back at the ceiling page
    feed.fetch_page(3).unwrap().await.unwrap();

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.current_page, 2);
    assert_eq!(snapshot.photos.len(), 60);
    assert_eq!(snapshot.stats.empty_pages, 1);
    assert_eq!(feed.phase().await, FeedPhase::Exhausted);
}

// ============================================================================
// Page limit
// ============================================================================

#[tokio::test]
async fn test_raise_page_limit() {
    let feed = controller(ScriptedSource::new());
    assert!(feed.raise_page_limit(8).await);
    assert_eq!(feed.snapshot().await.max_page, 8);
}

#[test_case(5; "equal to current")]
#[test_case(3; "below current")]
#[tokio::test]
async fn test_raise_page_limit_rejects_non_increase(new_max: u32) {
    let feed = controller(ScriptedSource::new());
    assert!(!feed.raise_page_limit(new_max).await);
    assert_eq!(feed.snapshot().await.max_page, 5);
}

#[tokio::test]
async fn test_raise_limit_reopens_exhausted_feed() {
    let feed = controller_with_max(
        ScriptedSource::new()
            .with_page(1, full_page(1))
            .with_page(2, full_page(2))
            .with_page(3, full_page(3)),
        2,
    );

    feed.load_initial().await.unwrap().await.unwrap();
    feed.trigger_fetch_if_needed("p29")
        .await
        .unwrap()
        .await
        .unwrap();

    assert_eq!(feed.phase().await, FeedPhase::Exhausted);
    assert!(feed.trigger_fetch_if_needed("p59").await.is_none());

    assert!(feed.raise_page_limit(4).await);
    assert_eq!(feed.phase().await, FeedPhase::Idle);

    feed.trigger_fetch_if_needed("p59")
        .await
        .unwrap()
        .await
        .unwrap();

    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.photos.len(), 90);
    assert_eq!(snapshot.current_page, 3);
}

// ============================================================================
// Phases and snapshots
// ============================================================================

#[tokio::test]
async fn test_phase_starts_idle() {
    let feed = controller(ScriptedSource::new());
    assert_eq!(feed.phase().await, FeedPhase::Idle);
    assert!(!feed.is_fetching());
}

#[test]
fn test_phase_display() {
    assert_eq!(FeedPhase::Idle.to_string(), "idle");
    assert_eq!(FeedPhase::Fetching.to_string(), "fetching");
    assert_eq!(FeedPhase::Exhausted.to_string(), "exhausted");
}

#[test]
fn test_state_phase_derivation() {
    let mut state = FeedState::new(1, 5);
    assert_eq!(state.phase(false), FeedPhase::Idle);
    assert_eq!(state.phase(true), FeedPhase::Fetching);

    state.current_page = 5;
    assert_eq!(state.phase(false), FeedPhase::Exhausted);
    assert_eq!(state.phase(true), FeedPhase::Fetching);
}

#[tokio::test]
async fn test_snapshot_serializes() {
    let feed = controller(ScriptedSource::new().with_page(1, full_page(1)));
    feed.load_initial().await.unwrap().await.unwrap();

    let value = serde_json::to_value(feed.snapshot().await).unwrap();
    assert_eq!(value["phase"], "idle");
    assert_eq!(value["current_page"], 1);
    assert_eq!(value["max_page"], 5);
    assert_eq!(value["photos"].as_array().unwrap().len(), 30);
    assert_eq!(value["last_photo_id"], "p29");
}

#[tokio::test]
async fn test_rejected_triggers_never_reach_the_source() {
    let source = Arc::new(ScriptedSource::new().with_page(1, full_page(1)));
    let feed = FeedController::new(Arc::clone(&source) as Arc<dyn PhotoSource>);

    feed.load_initial().await.unwrap().await.unwrap();
    assert!(feed.trigger_fetch_if_needed("p10").await.is_none());
    assert!(feed.trigger_fetch_if_needed("nope").await.is_none());

    // Only the initial load reached the source
    assert_eq!(source.calls(), 1);
    let snapshot = feed.snapshot().await;
    assert_eq!(snapshot.stats.pages_fetched, 1);
    assert_eq!(snapshot.stats.empty_pages, 0);
    assert_eq!(snapshot.stats.errors, 0);
}
