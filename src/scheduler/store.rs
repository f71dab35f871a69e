//! Published snapshot slot
//!
//! The display layer reads a single [`Snapshot`]: the current dataset plus
//! an optional advisory. The slot is a `watch` channel, so every update
//! replaces the whole value and readers never see a half-applied refresh.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::Dataset;

// ============================================================================
// Advisory
// ============================================================================

/// Why the display layer should show a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// The first load failed and generated data is on display
    SyntheticFallback,
    /// A periodic refresh failed; the previous dataset is still shown
    RefreshFailed,
    /// A manual refresh failed; the previous dataset is still shown
    ManualRefreshFailed,
}

impl AdvisoryKind {
    /// User-facing notice text
    pub fn message(&self) -> &'static str {
        match self {
            Self::SyntheticFallback => "Could not reach the remote sheet. Showing generated data.",
            Self::RefreshFailed => "Auto-refresh failed (still showing last data).",
            Self::ManualRefreshFailed => {
                "Failed to refresh from sheet. Check the URL and sharing settings."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SyntheticFallback => "synthetic_fallback",
            Self::RefreshFailed => "refresh_failed",
            Self::ManualRefreshFailed => "manual_refresh_failed",
        }
    }
}

impl fmt::Display for AdvisoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notice attached to the published snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Advisory {
    pub fn new(kind: AdvisoryKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            raised_at: Utc::now(),
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// What the display layer reads
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub dataset: Arc<Dataset>,
    pub advisory: Option<Advisory>,
}

impl Snapshot {
    fn new(dataset: Dataset, advisory: Option<Advisory>) -> Self {
        Self {
            dataset: Arc::new(dataset),
            advisory,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Owner of the single published snapshot
#[derive(Debug)]
pub struct DatasetStore {
    sender: watch::Sender<Snapshot>,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore {
    /// Create a store holding an empty dataset
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Snapshot::new(Dataset::empty(), None));
        Self { sender }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    /// Receive every future snapshot replacement
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    /// Replace the dataset and clear any advisory
    pub fn publish(&self, dataset: Dataset) -> Snapshot {
        self.replace(Snapshot::new(dataset, None))
    }

    /// Replace the dataset and attach an advisory in one step
    pub fn publish_with_advisory(&self, dataset: Dataset, kind: AdvisoryKind) -> Snapshot {
        self.replace(Snapshot::new(dataset, Some(Advisory::new(kind))))
    }

    /// Keep the dataset, set the advisory
    pub fn raise(&self, kind: AdvisoryKind) -> Snapshot {
        self.sender.send_modify(|snapshot| {
            snapshot.advisory = Some(Advisory::new(kind));
        });
        self.snapshot()
    }

    fn replace(&self, snapshot: Snapshot) -> Snapshot {
        self.sender.send_replace(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, SourceMode};

    fn remote(names: &[&str]) -> Dataset {
        let records = names
            .iter()
            .enumerate()
            .map(|(i, name)| Record::new(i as u32 + 1, *name, 100.0))
            .collect();
        Dataset::new(records, SourceMode::Remote)
    }

    #[test]
    fn test_starts_empty() {
        let store = DatasetStore::new();
        let snapshot = store.snapshot();
        assert!(snapshot.dataset.is_empty());
        assert!(snapshot.advisory.is_none());
    }

    #[test]
    fn test_raise_keeps_dataset() {
        let store = DatasetStore::new();
        store.publish(remote(&["alice", "bob"]));

        let snapshot = store.raise(AdvisoryKind::RefreshFailed);
        assert_eq!(snapshot.dataset.len(), 2);
        assert_eq!(
            snapshot.advisory.map(|a| a.kind),
            Some(AdvisoryKind::RefreshFailed)
        );
    }

    #[test]
    fn test_publish_clears_advisory() {
        let store = DatasetStore::new();
        store.raise(AdvisoryKind::ManualRefreshFailed);
        store.publish(remote(&["carol"]));
        assert!(store.snapshot().advisory.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_replacement() {
        let store = DatasetStore::new();
        let mut receiver = store.subscribe();

        store.publish(remote(&["alice"]));
        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow().dataset.records()[0].username, "alice");
    }

    #[test]
    fn test_advisory_messages() {
        assert!(AdvisoryKind::SyntheticFallback.message().contains("generated data"));
        assert!(AdvisoryKind::RefreshFailed.message().starts_with("Auto-refresh failed"));
        let json = serde_json::to_string(&Advisory::new(AdvisoryKind::RefreshFailed)).unwrap();
        assert!(json.contains("\"refresh_failed\""));
    }
}
