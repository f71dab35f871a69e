//! Leaderboard file import
//!
//! The upload path reads `rank,username,wagered` positionally from each line.
//! Unlike the network path it does not use the quote-aware tokenizer: a
//! quoted username containing a comma will split into the wrong columns.

use std::path::Path;

use tracing::{debug, info};

use super::coerce::build_record;
use crate::leaderboard;
use crate::models::{Dataset, Record, SourceMode};
use crate::utils::error::ImportError;

/// Whether the first line names the columns rather than holding data
fn is_header_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("rank") && lower.contains("user")
}

/// Digits and dots only; an empty remainder counts as zero
fn coerce_import_amount(raw: &str) -> f64 {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return 0.0;
    }
    digits.parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse uploaded CSV text into records in file order
pub fn parse_import(text: &str) -> Vec<Record> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .collect();

    let data_lines = match lines.first() {
        Some(first) if is_header_line(first) => &lines[1..],
        _ => &lines[..],
    };

    let mut records = Vec::with_capacity(data_lines.len());
    for (i, line) in data_lines.iter().enumerate() {
        let mut parts = line.split(',');
        let rank_cell = parts.next().unwrap_or("").trim();
        let user_cell = parts.next().unwrap_or("").trim();
        let amount_cell = parts.next().unwrap_or("0");

        let rank = if rank_cell.is_empty() {
            (i + 1) as f64
        } else {
            rank_cell.parse::<f64>().unwrap_or(f64::NAN)
        };
        let username = (!user_cell.is_empty()).then_some(user_cell);

        match build_record(rank, username, coerce_import_amount(amount_cell)) {
            Some(record) => records.push(record),
            None => debug!(line = i + 1, "Discarding unusable import line"),
        }
    }

    records
}

/// Parse uploaded text and order it as an imported dataset
pub fn import_text(text: &str) -> Dataset {
    let records = parse_import(text);
    leaderboard::assemble(records, SourceMode::Imported)
}

/// Read a file from disk and import it
///
/// # Errors
///
/// Returns `ImportError::Io` if the file cannot be read
pub fn import_file(path: &Path) -> Result<Dataset, ImportError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let dataset = import_text(&text);

    info!(
        path = %path.display(),
        records = dataset.len(),
        "Imported leaderboard file"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_detection() {
        assert!(is_header_line("Rank,Username,Wagered"));
        assert!(is_header_line("rank,user"));
        assert!(!is_header_line("1,alice,100"));
        assert!(!is_header_line("place,player,total"));
    }

    #[test]
    fn test_parse_with_header() {
        let records = parse_import("rank,username,wagered\r\n2,bob,$500\r\n1,alice,1,000\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], Record::new(2, "bob", 500.0));
        // naive split: "1,000" loses everything after the first comma
        assert_eq!(records[1], Record::new(1, "alice", 1.0));
    }

    #[test]
    fn test_parse_without_header_uses_positions() {
        let records = parse_import("1,alice,10\n,bob,20\n\n");
        assert_eq!(records[1].rank, 2);
        assert_eq!(records[1].username, "bob");
    }

    #[test]
    fn test_missing_cells_fall_back() {
        let records = parse_import("7");
        assert_eq!(records, vec![Record::new(7, "player_007", 0.0)]);
    }

    #[test]
    fn test_non_numeric_rank_discarded() {
        let records = parse_import("abc,alice,10\n3,carol,5");
        assert_eq!(records, vec![Record::new(3, "carol", 5.0)]);
    }

    #[test]
    fn test_quoted_fields_are_not_understood() {
        let records = parse_import("1,\"Doe, Jane\",100");
        assert_eq!(records[0].username, "\"Doe");
        assert_eq!(records[0].wagered, 0.0);
    }

    #[test]
    fn test_import_text_sorted_by_rank() {
        let dataset = import_text("3,c,1\n1,a,1\n2,b,1");
        let ranks: Vec<u32> = dataset.records().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(dataset.source(), SourceMode::Imported);
    }
}
