//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Picfeed infinite-scroll photo feed CLI
#[derive(Parser, Debug)]
#[command(name = "picfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test connection to the photo API
    Check,

    /// Run a scroll session and print the accumulated feed
    Fetch {
        /// Scroll rounds after the initial load (empty = until the feed ends)
        #[arg(long)]
        pages: Option<u32>,

        /// Override the page ceiling from config
        #[arg(long)]
        max_page: Option<u32>,

        /// Raise the page ceiling to this value once the feed exhausts
        #[arg(long)]
        raise_limit: Option<u32>,

        /// Print every accumulated photo, not just the summary
        #[arg(long)]
        photos: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
