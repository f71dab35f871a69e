//! Record coercion from raw CSV cells
//!
//! Converts data rows into typed [`Record`]s using a resolved column mapping.
//! Rows that cannot yield a usable rank or wager are dropped silently;
//! spreadsheets routinely carry notes, subtotals and half-filled lines.

use tracing::debug;

use crate::models::{RawRow, Record, ResolvedColumns};

/// Parse a number after stripping everything but digits, `.` and `-`
///
/// Returns `NaN` when nothing parseable remains, so callers can test with
/// `is_finite`.
///
/// # Examples
///
/// ```
/// use standings::parser::coerce::coerce_number;
///
/// assert_eq!(coerce_number("$1,234.50"), 1234.5);
/// assert!(!coerce_number("n/a").is_finite());
/// ```
pub fn coerce_number(raw: &str) -> f64 {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    digits.parse::<f64>().unwrap_or(f64::NAN)
}

/// Convert a numeric rank into a positive integer rank
pub fn integral_rank(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

/// Assemble a record from already-coerced values, or `None` to discard the row
pub fn build_record(rank: f64, username: Option<&str>, wagered: f64) -> Option<Record> {
    let rank = integral_rank(rank)?;
    if !wagered.is_finite() || wagered < 0.0 {
        return None;
    }

    let username = match username {
        Some(name) => name.to_string(),
        None => Record::placeholder_name(rank),
    };

    Some(Record::new(rank, username, wagered))
}

/// Coerce every data row (everything after the header) into records
///
/// `position` is the 1-based index among data rows and stands in for the
/// rank when the rank cell is blank.
pub fn coerce_rows(rows: &[RawRow], columns: ResolvedColumns) -> Vec<Record> {
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let position = i + 1;

        let rank = match non_blank(row, columns.rank) {
            Some(cell) => coerce_number(cell),
            None => position as f64,
        };
        let wagered = non_blank(row, columns.wagered).map_or(0.0, coerce_number);
        let username = non_blank(row, columns.username);

        match build_record(rank, username, wagered) {
            Some(record) => records.push(record),
            None => debug!(position, rank, wagered, "Discarding unusable row"),
        }
    }

    records
}

/// Trimmed cell content, or `None` when the cell is missing or whitespace
fn non_blank(row: &RawRow, index: usize) -> Option<&str> {
    row.get(index).map(|cell| cell.trim()).filter(|cell| !cell.is_empty())
}
