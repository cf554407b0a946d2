// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Picfeed
//!
//! A minimal, Rust-native engine for infinite-scroll photo feeds.
//!
//! ## Features
//!
//! - **Trigger-on-sentinel**: the next page is fetched only when the newest
//!   photo scrolls into view
//! - **Fixed page windows**: pages of 30 photos, appended in arrival order
//! - **Rollback on failure**: empty or failed pages rewind the page counter
//!   so a later scroll retries the same page
//! - **Page ceiling**: a configurable hard stop on pagination, raisable at
//!   runtime to let the user keep scrolling
//! - **Single-flight fetches**: at most one request in flight, with the
//!   guard released on every completion path
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use picfeed::{FeedController, PicsumClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = FeedController::new(Arc::new(PicsumClient::new()));
//!
//!     // Load the first page
//!     if let Some(handle) = controller.load_initial().await {
//!         let _ = handle.await;
//!     }
//!
//!     // Scroll: trigger the next page from the newest photo
//!     if let Some(id) = controller.last_photo_id().await {
//!         if let Some(handle) = controller.trigger_fetch_if_needed(&id).await {
//!             let _ = handle.await;
//!         }
//!     }
//!
//!     println!("{} photos", controller.photos().await.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         FeedController                         │
//! │  load_initial()  trigger_fetch_if_needed()  raise_page_limit() │
//! │  photos()  phase()  snapshot()                                 │
//! └────────────────────────────────────────────────────────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//! ┌───────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │   FeedState   │     │   PhotoSource    │     │   HttpClient   │
//! ├───────────────┤     ├──────────────────┤     ├────────────────┤
//! │ photos        │     │ PicsumClient     │     │ reqwest        │
//! │ page counters │     │ fetch_page(p, n) │     │ timeout, UA    │
//! │ stats         │     │                  │     │ status checks  │
//! └───────────────┘     └──────────────────┘     └────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Add docs before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the feed engine
pub mod error;

/// Photo model and thumbnail URLs
pub mod model;

/// HTTP client with timeouts and default headers
pub mod http;

/// Photo sources: the source trait and the Picsum API client
pub mod source;

/// Feed controller and pagination state machine
pub mod feed;

/// Configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, FeedConfig};
pub use feed::{FeedController, FeedPhase, FeedSnapshot, FeedStats};
pub use model::Photo;
pub use source::{PhotoSource, PicsumClient};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
