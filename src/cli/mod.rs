//! CLI module
//!
//! Command-line interface for driving the photo feed.
//!
//! # Commands
//!
//! - `check` - Test connection to the photo API
//! - `fetch` - Run a scroll session and print the accumulated feed

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
