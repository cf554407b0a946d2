//! HTTP client module
//!
//! Thin transport layer over reqwest. Handles base URL joining, default
//! headers, per-request query parameters and timeouts, and maps non-success
//! statuses to typed errors.

mod client;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
