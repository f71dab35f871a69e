//! CSV parsing and record extraction
//!
//! This module turns spreadsheet-export text into typed leaderboard records:
//!
//! - [`csv`] - quote-aware tokenizer
//! - [`schema`] - header row to column mapping
//! - [`coerce`] - raw cells to [`Record`]s
//! - [`import`] - the positional file-upload path

pub mod coerce;
pub mod csv;
pub mod import;
pub mod schema;

pub use coerce::{coerce_number, coerce_rows};
pub use csv::tokenize;
pub use import::{import_file, import_text, parse_import};
pub use schema::{detect_columns, resolve_columns};

use crate::models::Record;
use crate::utils::error::SchemaError;

/// Tokenize, detect the header and coerce all data rows
///
/// Records come back in source order; ordering policy is applied later by
/// the assembler.
///
/// # Errors
///
/// Returns `SchemaError::Empty` for a payload with no non-blank rows and
/// `SchemaError::MissingColumns` when the header lacks a required role
pub fn parse_leaderboard(text: &str) -> Result<Vec<Record>, SchemaError> {
    let rows = tokenize(text);
    let (header, data) = rows.split_first().ok_or(SchemaError::Empty)?;

    let columns = resolve_columns(header)?;
    Ok(coerce_rows(data, columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leaderboard() {
        let records = parse_leaderboard("rank,username,wagered\n1,alice,1000\n2,bob,500\n").unwrap();
        assert_eq!(
            records,
            vec![Record::new(1, "alice", 1000.0), Record::new(2, "bob", 500.0)]
        );
    }

    #[test]
    fn test_parse_leaderboard_empty() {
        assert_eq!(parse_leaderboard(" \n\n"), Err(SchemaError::Empty));
    }

    #[test]
    fn test_header_only() {
        assert!(parse_leaderboard("Place,Name,Amount").unwrap().is_empty());
    }
}
