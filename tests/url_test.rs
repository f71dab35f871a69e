//! Integration tests for sheet link normalization and relay templates

use standings::ingest::url::{extract_sheet_ids, normalize_sheet_url};
use standings::ingest::ProxyTemplate;

const EXPORT: &str = "https://docs.google.com/spreadsheets/d/abc123/export?format=csv";

/// Test the common link shapes normalize to one export URL
#[test]
fn test_link_variants() {
    let test_cases = vec![
        (
            "https://docs.google.com/spreadsheets/d/abc123/edit#gid=42",
            format!("{EXPORT}&gid=42"),
        ),
        (
            "https://docs.google.com/spreadsheets/d/abc123/edit?usp=sharing",
            EXPORT.to_string(),
        ),
        (
            "https://docs.google.com/spreadsheets/d/abc123/view?gid=9#gid=42",
            format!("{EXPORT}&gid=9"),
        ),
        (
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=5",
            format!("{EXPORT}&gid=5"),
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(normalize_sheet_url(input), expected, "input: {input}");
    }
}

/// Test anything that is not a sheet link is returned unchanged
#[test]
fn test_passthrough() {
    for input in [
        "not a url",
        "",
        "https://example.com/data.csv",
        "https://drive.google.com/file/d/abc/view",
    ] {
        assert_eq!(normalize_sheet_url(input), input);
    }
}

/// Test normalization is idempotent
#[test]
fn test_idempotent() {
    let once = normalize_sheet_url("https://docs.google.com/spreadsheets/d/abc123/edit#gid=1");
    assert_eq!(normalize_sheet_url(&once), once);
}

/// Test id extraction exposes both parts
#[test]
fn test_extract_ids() {
    let ids = extract_sheet_ids("https://docs.google.com/spreadsheets/d/abc123/edit#gid=77").unwrap();
    assert_eq!(ids.doc_id, "abc123");
    assert_eq!(ids.gid.as_deref(), Some("77"));
}

/// Test relay templates wrap the normalized URL
#[test]
fn test_relay_wraps_export_url() {
    let target = normalize_sheet_url("https://docs.google.com/spreadsheets/d/abc123/edit#gid=42");
    let relays = ProxyTemplate::defaults();

    let built: Vec<String> = relays.iter().map(|r| r.build(&target)).collect();
    assert_eq!(built[0], format!("https://cors.isomorphic-git.org/{target}"));
    assert!(built[1].starts_with("https://api.allorigins.win/raw?url=https%3A%2F%2Fdocs.google.com"));
    assert!(built[1].contains("gid%3D42"));
    assert!(built[2].ends_with(&target));
}
