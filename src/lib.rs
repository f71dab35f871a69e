//! standings - Leaderboard ingestion from shared spreadsheets
//!
//! Fetches a leaderboard published as a spreadsheet CSV export, tolerates
//! blocked or flaky hosts by falling back through relay endpoints, turns the
//! loosely formatted rows into ranked records and keeps a published snapshot
//! fresh on a timer.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`ingest`] - URL normalization, relay fallback fetching, the pipeline
//! - [`parser`] - CSV tokenizing, header detection, numeric coercion, file import
//! - [`leaderboard`] - Ordering policy and synthetic fallback data
//! - [`scheduler`] - Initial, periodic and manual refresh; the published snapshot
//! - [`server`] - Read-only HTTP API for the display layer
//! - [`media`] - Auxiliary media item import
//! - [`models`] - Core data structures and types
//! - [`metrics`] - Prometheus counters
//! - [`utils`] - Common utilities and domain errors
//!
//! # Example
//!
//! ```no_run
//! use standings::config::Config;
//! use standings::scheduler::RefreshScheduler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let scheduler = RefreshScheduler::from_config(&config)?;
//!     let snapshot = scheduler.initial_load().await;
//!     println!("{} records from {}", snapshot.dataset.len(), snapshot.dataset.source());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ingest;
pub mod leaderboard;
pub mod media;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod scheduler;
pub mod server;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{ClassifiedError, Error, ErrorCategory, Result};
    pub use crate::ingest::{FetchGateway, Pipeline, SheetSource};
    pub use crate::models::{Dataset, Record, SourceMode};
    pub use crate::scheduler::{Advisory, AdvisoryKind, RefreshScheduler, Snapshot};
}

// Direct re-exports for convenience
pub use models::{Dataset, Record, SourceMode};
