//! Quote-aware CSV tokenizer
//!
//! Turns raw spreadsheet-export text into rows of raw string cells. The
//! scanner has two states: outside quotes, `,` ends a field and `\n` ends a
//! row; inside quotes, everything is literal except `""` (an escaped quote)
//! and a lone `"` (which closes the quoted section). Carriage returns
//! outside quotes are dropped, so CRLF and LF inputs tokenize identically.

use std::mem::take;

use crate::models::RawRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Unquoted,
    Quoted,
}

/// Tokenize CSV text into rows, dropping rows that are entirely blank
///
/// An unterminated quote is not an error: the remaining input becomes the
/// content of the open field. The final row is flushed even without a
/// trailing newline.
///
/// # Examples
///
/// ```
/// use standings::parser::csv::tokenize;
///
/// let rows = tokenize("rank,name\n1,\"Doe, Jane\"\n");
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1][1], "Doe, Jane");
/// ```
pub fn tokenize(text: &str) -> Vec<RawRow> {
    let mut rows = Vec::new();
    let mut row: RawRow = Vec::new();
    let mut field = String::new();
    let mut state = ScanState::Unquoted;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            ScanState::Quoted => match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => state = ScanState::Unquoted,
                _ => field.push(ch),
            },
            ScanState::Unquoted => match ch {
                '"' => state = ScanState::Quoted,
                ',' => row.push(take(&mut field)),
                '\n' => {
                    row.push(take(&mut field));
                    rows.push(take(&mut row));
                }
                '\r' => {}
                _ => field.push(ch),
            },
        }
    }

    row.push(field);
    rows.push(row);

    rows.retain(|r| !is_blank_row(r));
    rows
}

/// A row is blank when all of its cells joined together are whitespace
fn is_blank_row(row: &RawRow) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &[&str]) -> RawRow {
        row.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_rows() {
        let rows = tokenize("a,b,c\n1,2,3");
        assert_eq!(rows, vec![cells(&["a", "b", "c"]), cells(&["1", "2", "3"])]);
    }

    #[test]
    fn test_quoted_comma_and_newline_stay_in_one_field() {
        let rows = tokenize("rank,username\n1,\"smith, john\nthe second\"\n2,bob\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], cells(&["1", "smith, john\nthe second"]));
        assert_eq!(rows[2], cells(&["2", "bob"]));
    }

    #[test]
    fn test_escaped_quotes() {
        let rows = tokenize("\"say \"\"hi\"\"\",x");
        assert_eq!(rows, vec![cells(&["say \"hi\"", "x"])]);
    }

    #[test]
    fn test_crlf_matches_lf() {
        assert_eq!(tokenize("a,b\r\n1,2\r\n"), tokenize("a,b\n1,2\n"));
    }

    #[test]
    fn test_carriage_return_inside_quotes_is_literal() {
        let rows = tokenize("\"a\r\nb\",c");
        assert_eq!(rows, vec![cells(&["a\r\nb", "c"])]);
    }

    #[test]
    fn test_blank_rows_removed() {
        let rows = tokenize("a,b\n\n , \n1,2\n\n");
        assert_eq!(rows, vec![cells(&["a", "b"]), cells(&["1", "2"])]);
    }

    #[test]
    fn test_unterminated_quote_keeps_remaining_text() {
        let rows = tokenize("a,\"unclosed, still\nhere");
        assert_eq!(rows, vec![cells(&["a", "unclosed, still\nhere"])]);
    }

    #[test]
    fn test_final_row_without_newline() {
        let rows = tokenize("1,alice,1000");
        assert_eq!(rows, vec![cells(&["1", "alice", "1000"])]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("\n\r\n").is_empty());
    }

    #[test]
    fn test_trailing_empty_field_kept() {
        let rows = tokenize("1,alice,\n");
        assert_eq!(rows, vec![cells(&["1", "alice", ""])]);
    }
}
