//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// Operating mode has no remote source to refresh from
    NoRemoteSource,

    /// Timer task already started
    AlreadyRunning,

    /// Refresh interval is unusable
    InvalidInterval {
        secs: u64,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRemoteSource => write!(f, "no remote source configured"),
            Self::AlreadyRunning => write!(f, "Refresh timer is already running"),
            Self::InvalidInterval { secs } => {
                write!(f, "Invalid refresh interval '{}s'. Must be at least 1s", secs)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl SchedulerError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AlreadyRunning)
    }
}
