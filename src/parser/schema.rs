//! Header-based schema detection
//!
//! Resolves each [`ColumnRole`] to a column index by matching trimmed,
//! lower-cased header cells against the role's alias table.

use crate::models::{ColumnMapping, ColumnRole, ResolvedColumns};
use crate::utils::error::SchemaError;

/// Map a header row to column positions without failing
///
/// The first header cell matching a role's alias wins.
pub fn detect_columns(header: &[String]) -> ColumnMapping {
    let normalized: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

    let find = |role: ColumnRole| {
        normalized
            .iter()
            .position(|cell| role.aliases().contains(&cell.as_str()))
    };

    ColumnMapping {
        rank: find(ColumnRole::Rank),
        username: find(ColumnRole::Username),
        wagered: find(ColumnRole::Wagered),
    }
}

/// Resolve all required columns or fail with the roles that are missing
///
/// # Errors
///
/// Returns `SchemaError::MissingColumns` when any role has no matching header
pub fn resolve_columns(header: &[String]) -> Result<ResolvedColumns, SchemaError> {
    let mapping = detect_columns(header);
    mapping.resolved().ok_or_else(|| SchemaError::MissingColumns {
        missing: mapping.missing(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aliases_case_insensitive() {
        let resolved = resolve_columns(&header(&["Rank", "Player", "Total"])).unwrap();
        assert_eq!(
            resolved,
            ResolvedColumns {
                rank: 0,
                username: 1,
                wagered: 2
            }
        );
    }

    #[test]
    fn test_missing_wagered_alias() {
        let err = resolve_columns(&header(&["Rank", "Player"])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                missing: vec![ColumnRole::Wagered]
            }
        );
    }

    #[test]
    fn test_cells_are_trimmed_and_extra_columns_ignored() {
        let resolved =
            resolve_columns(&header(&["  country ", " WAGER ", "Position", " name"])).unwrap();
        assert_eq!(resolved.rank, 2);
        assert_eq!(resolved.username, 3);
        assert_eq!(resolved.wagered, 1);
    }

    #[test]
    fn test_partial_matches_do_not_count() {
        let mapping = detect_columns(&header(&["ranking", "usernames", "amount"]));
        assert_eq!(mapping.rank, None);
        assert_eq!(mapping.username, None);
        assert_eq!(mapping.wagered, Some(2));
    }

    #[test]
    fn test_first_match_wins() {
        let mapping = detect_columns(&header(&["user", "name", "place", "rank", "total"]));
        assert_eq!(mapping.username, Some(0));
        assert_eq!(mapping.rank, Some(2));
    }
}
