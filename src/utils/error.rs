//! Error types for the standings pipeline
//!
//! This module defines the domain error types raised by the fetch gateway,
//! the schema detector and the file import paths.

use thiserror::Error;

use crate::models::ColumnRole;

/// Errors that can occur while retrieving the remote CSV
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Transport-level failure for one candidate (DNS, connect, reset)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Candidate answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),

    /// Candidate answered 2xx but with a markup page instead of CSV
    #[error("HTML payload (not CSV)")]
    Markup,

    /// Response body could not be read to the end
    #[error("Body read error: {0}")]
    Body(String),

    /// Proxy template could not be used
    #[error("Invalid proxy template: {0}")]
    InvalidTemplate(String),

    /// Every candidate was tried and none was accepted
    #[error("All {attempts} fetch attempts failed; last error: {last}")]
    Exhausted {
        attempts: usize,
        last: Box<FetchError>,
    },

    /// The shared deadline elapsed before a candidate was accepted
    #[error("Fetch deadline of {deadline_ms}ms elapsed{}", last_suffix(.last))]
    DeadlineElapsed {
        deadline_ms: u64,
        last: Option<Box<FetchError>>,
    },
}

fn last_suffix(last: &Option<Box<FetchError>>) -> String {
    match last {
        Some(err) => format!("; last error: {err}"),
        None => String::new(),
    }
}

impl FetchError {
    /// Whether this is a gateway-level network failure (all candidates lost)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Exhausted { .. } | Self::DeadlineElapsed { .. })
    }

    /// Whether a candidate served markup instead of tabular data
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Markup)
    }

    /// The last per-candidate failure, when this is a gateway-level error
    pub fn last_failure(&self) -> Option<&FetchError> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::DeadlineElapsed { last, .. } => last.as_deref(),
            _ => None,
        }
    }
}

/// Errors raised when a header row does not describe a leaderboard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The payload contained no non-blank rows
    #[error("Empty sheet")]
    Empty,

    /// One or more required columns had no matching header
    #[error("Missing required columns: {}", format_roles(.missing))]
    MissingColumns { missing: Vec<ColumnRole> },
}

fn format_roles(roles: &[ColumnRole]) -> String {
    roles
        .iter()
        .map(ColumnRole::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from the user-supplied file import paths
#[derive(Error, Debug)]
pub enum ImportError {
    /// File could not be read
    #[error("Failed to read import file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON media manifest was malformed
    #[error("Invalid JSON media manifest: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_carries_last_reason() {
        let err = FetchError::Exhausted {
            attempts: 4,
            last: Box::new(FetchError::Status(503)),
        };
        assert!(err.is_network());
        assert_eq!(err.to_string(), "All 4 fetch attempts failed; last error: HTTP 503");
        assert!(matches!(err.last_failure(), Some(FetchError::Status(503))));
    }

    #[test]
    fn test_deadline_message() {
        let err = FetchError::DeadlineElapsed {
            deadline_ms: 8000,
            last: None,
        };
        assert_eq!(err.to_string(), "Fetch deadline of 8000ms elapsed");

        let err = FetchError::DeadlineElapsed {
            deadline_ms: 8000,
            last: Some(Box::new(FetchError::Markup)),
        };
        assert!(err.to_string().ends_with("last error: HTML payload (not CSV)"));
    }

    #[test]
    fn test_missing_columns_message() {
        let err = SchemaError::MissingColumns {
            missing: vec![ColumnRole::Username, ColumnRole::Wagered],
        };
        assert_eq!(err.to_string(), "Missing required columns: username, wagered");
    }
}
