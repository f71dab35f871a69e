//! Spreadsheet URL normalization
//!
//! Sheet links get shared in many shapes: `/edit#gid=...`, `/view?gid=...`,
//! `/export?format=csv`, or with the document id only in a query parameter.
//! This module rewrites all of them into the one export-as-CSV form the fetch
//! gateway requests, and passes anything it does not recognise through
//! untouched.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Document id from `/spreadsheets/d/{id}`
static DOC_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/spreadsheets/d/([^/]+)").unwrap());

/// Tab id inside a fragment such as `#gid=0` or `#gid=12&range=A1`
static FRAGMENT_GID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"gid=([0-9]+)").unwrap());

/// Identifiers pulled out of a spreadsheet link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetIds {
    /// Spreadsheet document id
    pub doc_id: String,
    /// Tab id, when the link names one
    pub gid: Option<String>,
}

impl SheetIds {
    /// Canonical export URL for these ids
    pub fn export_url(&self) -> Option<String> {
        let mut out = Url::parse(&format!(
            "https://docs.google.com/spreadsheets/d/{}/export",
            self.doc_id
        ))
        .ok()?;

        {
            let mut query = out.query_pairs_mut();
            query.append_pair("format", "csv");
            if let Some(gid) = &self.gid {
                query.append_pair("gid", gid);
            }
        }

        Some(out.to_string())
    }
}

/// Whether a parsed URL points at the spreadsheet host and path shape
fn is_sheet_url(url: &Url) -> bool {
    let host_matches = url.host_str().is_some_and(|h| h.contains("google"));
    host_matches && url.path().contains("/spreadsheets")
}

/// Extract document and tab ids from a spreadsheet link
///
/// The tab id comes from the `gid` query parameter first and the URL
/// fragment second.
///
/// # Examples
///
/// ```
/// use standings::ingest::url::extract_sheet_ids;
///
/// let ids = extract_sheet_ids("https://docs.google.com/spreadsheets/d/abc123/edit#gid=42").unwrap();
/// assert_eq!(ids.doc_id, "abc123");
/// assert_eq!(ids.gid.as_deref(), Some("42"));
/// ```
pub fn extract_sheet_ids(input: &str) -> Option<SheetIds> {
    let url = Url::parse(input).ok()?;
    if !is_sheet_url(&url) {
        return None;
    }

    let query_param = |name: &str| {
        url.query_pairs()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    };

    let doc_id = DOC_ID_REGEX
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| query_param("id"))?;

    let gid = query_param("gid").or_else(|| {
        url.fragment()
            .and_then(|frag| FRAGMENT_GID_REGEX.captures(frag))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    });

    Some(SheetIds { doc_id, gid })
}

/// Canonicalize a spreadsheet link into its CSV export URL
///
/// Never fails: unparseable input, foreign hosts and links without a
/// document id come back unchanged.
///
/// # Examples
///
/// ```
/// use standings::ingest::url::normalize_sheet_url;
///
/// assert_eq!(
///     normalize_sheet_url("https://docs.google.com/spreadsheets/d/abc/edit?gid=7"),
///     "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=7"
/// );
/// assert_eq!(normalize_sheet_url("not a url"), "not a url");
/// ```
pub fn normalize_sheet_url(input: &str) -> String {
    extract_sheet_ids(input)
        .and_then(|ids| ids.export_url())
        .unwrap_or_else(|| input.to_string())
}
