//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, FeedConfig};
use crate::error::Result;
use crate::feed::FeedController;
use crate::source::{PhotoSource, PicsumClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Fetch {
                pages,
                max_page,
                raise_limit,
                photos,
            } => self.fetch(*pages, *max_page, *raise_limit, *photos).await,
        }
    }

    /// Load configuration, applying CLI overrides
    fn load_feed_config(&self, max_page: Option<u32>) -> Result<FeedConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_config(path)?,
            None => FeedConfig::default(),
        };

        if let Some(ceiling) = max_page {
            config.max_page = ceiling;
            config.validate()?;
        }

        Ok(config)
    }

    /// Check connection to the photo API
    async fn check(&self) -> Result<()> {
        let config = self.load_feed_config(None)?;
        let client = PicsumClient::from_config(&config);

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Checking connection to {}", config.base_url)
            }
        }));

        match client.fetch_page(config.start_page, 1).await {
            Ok(photos) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": format!("Connection successful, fetched {} photo(s)", photos.len())
                    }
                }));
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection failed: {e}")
                    }
                }));
            }
        }

        Ok(())
    }

    /// Run a scroll session against the photo API
    ///
    /// Drives the controller the way a scrolling user would: load the first
    /// page, then keep triggering from the newest photo until the feed stops
    /// growing, the page ceiling is reached, or the requested rounds run out.
    async fn fetch(
        &self,
        pages: Option<u32>,
        max_page: Option<u32>,
        raise_limit: Option<u32>,
        photos: bool,
    ) -> Result<()> {
        let session_start = Instant::now();
        let config = self.load_feed_config(max_page)?;
        let source = Arc::new(PicsumClient::from_config(&config));
        let controller = FeedController::with_config(source, &config);

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Starting feed session against {}", config.base_url)
            }
        }));

        if let Some(handle) = controller.load_initial().await {
            let _ = handle.await;
        }

        let mut rounds = 0u32;
        let mut raised = false;
        loop {
            if let Some(limit) = pages {
                if rounds >= limit {
                    break;
                }
            }

            let Some(sentinel) = controller.last_photo_id().await else {
                break;
            };

            let before = controller.stats().await.pages_fetched;
            match controller.trigger_fetch_if_needed(&sentinel).await {
                Some(handle) => {
                    let _ = handle.await;
                    rounds += 1;
                    // A round that appends nothing means the feed ran dry or
                    // the fetch failed; a user would stop scrolling here.
                    if controller.stats().await.pages_fetched == before {
                        break;
                    }
                }
                None => {
                    let Some(new_max) = raise_limit.filter(|_| !raised) else {
                        break;
                    };
                    raised = true;
                    if !controller.raise_page_limit(new_max).await {
                        self.output_message(&json!({
                            "type": "LOG",
                            "log": {
                                "level": "WARN",
                                "message": format!("Page ceiling is already at or above {new_max}")
                            }
                        }));
                        break;
                    }
                    self.output_message(&json!({
                        "type": "LOG",
                        "log": {
                            "level": "INFO",
                            "message": format!("Raised page ceiling to {new_max}")
                        }
                    }));
                }
            }
        }

        if photos {
            let emitted_at = chrono::Utc::now().timestamp_millis();
            for photo in controller.photos().await {
                let thumbnail = photo.thumbnail_url().ok().map(|u| u.to_string());
                self.output_message(&json!({
                    "type": "RECORD",
                    "record": {
                        "data": photo,
                        "thumbnail": thumbnail,
                        "emitted_at": emitted_at
                    }
                }));
            }
        }

        let snapshot = controller.snapshot().await;
        let duration_ms = session_start.elapsed().as_millis() as u64;
        self.output_message(&json!({
            "type": "FEED_SUMMARY",
            "summary": {
                "phase": snapshot.phase,
                "photos": snapshot.photos.len(),
                "current_page": snapshot.current_page,
                "last_successful_page": snapshot.last_successful_page,
                "max_page": snapshot.max_page,
                "rounds": rounds,
                "duration_ms": duration_ms,
                "stats": snapshot.stats
            }
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
