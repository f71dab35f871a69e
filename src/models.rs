// Core data structures for the standings pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single tokenized CSV row: unprocessed string cells in source order
pub type RawRow = Vec<String>;

/// One ranked leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String, // Always "u_{rank}"
    pub rank: u32,
    pub username: String,
    pub wagered: f64,
}

impl Record {
    /// Build a record, deriving its id from the rank
    pub fn new(rank: u32, username: impl Into<String>, wagered: f64) -> Self {
        Self {
            id: Self::id_for_rank(rank),
            rank,
            username: username.into(),
            wagered,
        }
    }

    /// Deterministic id for a rank
    pub fn id_for_rank(rank: u32) -> String {
        format!("u_{rank}")
    }

    /// Placeholder username used when the source leaves the cell blank
    pub fn placeholder_name(rank: u32) -> String {
        format!("player_{rank:03}")
    }

    /// Copy of this record moved to a different rank (id follows the rank)
    #[must_use]
    pub fn with_rank(&self, rank: u32) -> Self {
        Self::new(rank, self.username.clone(), self.wagered)
    }
}

/// Provenance of a dataset
///
/// Drives the ordering policy applied by the assembler and whether the
/// dataset counts as "real" data for advisory purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Fetched directly from the spreadsheet export
    Remote,
    /// Fetched through one of the relay endpoints
    Proxied,
    /// Loaded from a user-supplied file
    Imported,
    /// Produced by the fallback generator
    Synthetic,
}

impl SourceMode {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Proxied => "proxied",
            Self::Imported => "imported",
            Self::Synthetic => "synthetic",
        }
    }

    /// Whether the source's own rank column is authoritative
    pub fn trusts_source_rank(&self) -> bool {
        !matches!(self, Self::Synthetic)
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic column roles a leaderboard header must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    Rank,
    Username,
    Wagered,
}

impl ColumnRole {
    /// All roles in header-resolution order
    pub fn all() -> [Self; 3] {
        [Self::Rank, Self::Username, Self::Wagered]
    }

    /// Accepted header names (lower-case) for this role
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Rank => &["rank", "place", "position"],
            Self::Username => &["username", "user", "player", "name"],
            Self::Wagered => &["wagered", "wager", "amount", "total"],
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Username => "username",
            Self::Wagered => "wagered",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header positions of each role; `None` means the role was not found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub rank: Option<usize>,
    pub username: Option<usize>,
    pub wagered: Option<usize>,
}

impl ColumnMapping {
    /// Index for a role
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Rank => self.rank,
            ColumnRole::Username => self.username,
            ColumnRole::Wagered => self.wagered,
        }
    }

    /// Roles that could not be resolved
    pub fn missing(&self) -> Vec<ColumnRole> {
        ColumnRole::all()
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    /// Fully resolved positions, if every role was found
    pub fn resolved(&self) -> Option<ResolvedColumns> {
        Some(ResolvedColumns {
            rank: self.rank?,
            username: self.username?,
            wagered: self.wagered?,
        })
    }
}

/// A mapping where every role has a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub rank: usize,
    pub username: usize,
    pub wagered: usize,
}

/// Atomic snapshot of ranked records
///
/// A dataset is never edited after construction; refreshes build a new one
/// and replace the published value wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
    source: SourceMode,
    refreshed_at: DateTime<Utc>,
}

impl Dataset {
    /// Wrap already-ordered records, stamping the current time
    pub fn new(records: Vec<Record>, source: SourceMode) -> Self {
        Self {
            records,
            source,
            refreshed_at: Utc::now(),
        }
    }

    /// Empty placeholder used before the first load completes
    pub fn empty() -> Self {
        Self::new(Vec::new(), SourceMode::Synthetic)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn source(&self) -> SourceMode {
        self.source
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Top `n` entries (the podium)
    pub fn top(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    /// Compare contents while ignoring the refresh timestamp
    pub fn same_contents(&self, other: &Dataset) -> bool {
        self.source == other.source && self.records == other.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_follows_rank() {
        let record = Record::new(7, "alice", 10.0);
        assert_eq!(record.id, "u_7");

        let moved = record.with_rank(2);
        assert_eq!(moved.id, "u_2");
        assert_eq!(moved.username, "alice");
        assert_eq!(record.rank, 7);
    }

    #[test]
    fn test_placeholder_name_padding() {
        assert_eq!(Record::placeholder_name(4), "player_004");
        assert_eq!(Record::placeholder_name(1234), "player_1234");
    }

    #[test]
    fn test_column_mapping_missing() {
        let mapping = ColumnMapping {
            rank: Some(0),
            username: None,
            wagered: Some(2),
        };
        assert_eq!(mapping.missing(), vec![ColumnRole::Username]);
        assert!(mapping.resolved().is_none());
    }

    #[test]
    fn test_source_mode_serde() {
        let json = serde_json::to_string(&SourceMode::Proxied).unwrap();
        assert_eq!(json, "\"proxied\"");
        assert!(SourceMode::Remote.trusts_source_rank());
        assert!(!SourceMode::Synthetic.trusts_source_rank());
    }

    #[test]
    fn test_dataset_top() {
        let dataset = Dataset::new(
            vec![Record::new(1, "a", 3.0), Record::new(2, "b", 2.0)],
            SourceMode::Remote,
        );
        assert_eq!(dataset.top(3).len(), 2);
        assert_eq!(dataset.top(1)[0].username, "a");
    }
}
