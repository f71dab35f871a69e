//! Unified error handling for the standings crate
//!
//! This module provides a unified error type that consolidates the pipeline's
//! domain errors into a single `Error` enum, while keeping the domain errors
//! usable on their own.
//!
//! # Architecture
//!
//! - [`ClassifiedError`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping the domain-specific errors
//!
//! The scheduler treats every category the same way at the pipeline boundary
//! ("ingestion failed"); the category only feeds logging, metrics labels and
//! API error bodies. File import errors stay as [`ImportError`] because the
//! import paths never pass through the pipeline.

use thiserror::Error;

pub use crate::scheduler::error::SchedulerError;
pub use crate::utils::error::{FetchError, ImportError, SchemaError};

/// Common trait for all standings error types
pub trait ClassifiedError: std::error::Error {
    /// Check if this error is recoverable (a later attempt may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Every fetch candidate failed or the deadline elapsed
    Network,
    /// A candidate served markup instead of CSV
    Content,
    /// Header row did not resolve the required columns
    Schema,
    /// Client setup or relay template errors
    Config,
    /// Scheduler lifecycle errors
    Scheduler,
}

impl ErrorCategory {
    /// Label used for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Content => "content",
            Self::Schema => "schema",
            Self::Config => "config",
            Self::Scheduler => "scheduler",
        }
    }
}

impl ClassifiedError for FetchError {
    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Client(_) | Self::InvalidTemplate(_))
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Markup => ErrorCategory::Content,
            Self::Client(_) | Self::InvalidTemplate(_) => ErrorCategory::Config,
            _ => ErrorCategory::Network,
        }
    }
}

impl ClassifiedError for SchemaError {
    fn is_recoverable(&self) -> bool {
        // The sheet owner may fix the header between refreshes
        true
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Schema
    }
}

impl ClassifiedError for SchedulerError {
    fn is_recoverable(&self) -> bool {
        SchedulerError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Scheduler
    }
}

/// Unified error type for the ingestion pipeline and scheduler
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch gateway errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Header/schema errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Scheduler errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

impl ClassifiedError for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Schema(e) => e.is_recoverable(),
            Self::Scheduler(e) => ClassifiedError::is_recoverable(e),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Schema(e) => e.category(),
            Self::Scheduler(e) => e.category(),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
