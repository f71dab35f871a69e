//! Leaderboard assembly
//!
//! Applies the ordering policy that matches a dataset's provenance:
//!
//! | Source | Order | Rank |
//! |--------|-------|------|
//! | remote, proxied, imported | ascending source rank (stable) | kept from source |
//! | synthetic | descending wagered (stable) | rewritten to 1..n |
//!
//! Externally supplied rankings are authoritative; generated data has to be
//! made self-consistent.

pub mod fallback;

pub use fallback::FallbackGenerator;

use tracing::debug;

use crate::models::{Dataset, Record, SourceMode};

/// Order records for their source and wrap them as a dataset
pub fn assemble(records: Vec<Record>, source: SourceMode) -> Dataset {
    let ordered = if source.trusts_source_rank() {
        order_by_source_rank(records)
    } else {
        order_by_wager(records)
    };

    Dataset::new(ordered, source)
}

/// Stable ascending sort on the source rank
///
/// When a rank appears more than once only its first occurrence in source
/// order is kept, so published ranks stay unique.
pub fn order_by_source_rank(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by_key(|r| r.rank);

    let before = records.len();
    records.dedup_by_key(|r| r.rank);
    if records.len() < before {
        debug!(dropped = before - records.len(), "Dropped rows with duplicate rank");
    }

    records
}

/// Stable descending sort on wagered, renumbering ranks from 1
pub fn order_by_wager(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by(|a, b| b.wagered.total_cmp(&a.wagered));

    records
        .iter()
        .enumerate()
        .map(|(i, record)| record.with_rank(i as u32 + 1))
        .collect()
}
