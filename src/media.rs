//! Media item import
//!
//! Independent of the leaderboard: a list of display items (videos, clips,
//! images) loaded from a JSON manifest or a small CSV file.
//!
//! JSON: an array of `{type, title, url, thumb}`, or an object holding that
//! array under `items` or `data`. CSV: `type,title,url,thumb` lines with an
//! optional header. Unknown types become images, missing titles become
//! `Item <n>`, and items without a URL are dropped.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::utils::error::ImportError;

const EMBED_PREFIX: &str = "https://www.youtube.com/embed/";

/// How a media item is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Youtube,
    Mp4,
    Image,
}

impl MediaKind {
    /// Lenient parse; anything unrecognised is an image
    pub fn from_label(label: &str) -> Self {
        match label {
            "youtube" => Self::Youtube,
            "mp4" => Self::Mp4,
            _ => Self::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Mp4 => "mp4",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One display item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// 1-based position in the source file
    pub id: usize,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

impl MediaItem {
    /// URL to hand to a player; YouTube links become embed links
    pub fn playable_url(&self) -> String {
        match self.kind {
            MediaKind::Youtube => to_embed_url(&self.url),
            _ => self.url.clone(),
        }
    }
}

fn default_title(position: usize) -> String {
    format!("Item {position}")
}

/// Parse media items, choosing the format by file extension
///
/// # Errors
///
/// Returns `ImportError::Json` when a `.json` file is not valid JSON
pub fn parse_media(file_name: &str, text: &str) -> Result<Vec<MediaItem>, ImportError> {
    if file_name.to_lowercase().ends_with(".json") {
        parse_media_json(text)
    } else {
        Ok(parse_media_csv(text))
    }
}

/// Parse a JSON media manifest
///
/// # Errors
///
/// Returns `ImportError::Json` when the text is not valid JSON
pub fn parse_media_json(text: &str) -> Result<Vec<MediaItem>, ImportError> {
    let root: Value = serde_json::from_str(text)?;

    let entries = match &root {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("items")
            .or_else(|| map.get("data"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    let field = |entry: &Value, key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);

    Ok(entries
        .iter()
        .enumerate()
        .map(|(i, entry)| MediaItem {
            id: i + 1,
            title: field(entry, "title").unwrap_or_else(|| default_title(i + 1)),
            kind: MediaKind::from_label(&field(entry, "type").unwrap_or_default()),
            url: field(entry, "url").unwrap_or_default(),
            thumb: field(entry, "thumb"),
        })
        .filter(|item| !item.url.is_empty())
        .collect())
}

/// Parse `type,title,url,thumb` lines
pub fn parse_media_csv(text: &str) -> Vec<MediaItem> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .collect();

    let has_header = lines
        .first()
        .is_some_and(|first| first.to_lowercase().contains("type"));
    let data = if has_header { &lines[1..] } else { &lines[..] };

    data.iter()
        .enumerate()
        .map(|(i, line)| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            let part = |n: usize| parts.get(n).copied().filter(|s| !s.is_empty());

            MediaItem {
                id: i + 1,
                title: part(1).map_or_else(|| default_title(i + 1), str::to_string),
                kind: MediaKind::from_label(part(0).unwrap_or_default()),
                url: part(2).unwrap_or_default().to_string(),
                thumb: part(3).map(str::to_string),
            }
        })
        .filter(|item| !item.url.is_empty())
        .collect()
}

/// Read and parse a media file
///
/// # Errors
///
/// Returns `ImportError::Io` if the file cannot be read and
/// `ImportError::Json` for a malformed JSON manifest
pub fn import_media_file(path: &Path) -> Result<Vec<MediaItem>, ImportError> {
    let text = std::fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let items = parse_media(&name, &text)?;
    info!(file = %path.display(), items = items.len(), "Imported media items");
    Ok(items)
}

/// Convert a YouTube watch, shorts or short link to its embed form
///
/// Anything else is returned unchanged.
///
/// # Examples
///
/// ```
/// use standings::media::to_embed_url;
///
/// assert_eq!(
///     to_embed_url("https://youtu.be/abc123"),
///     "https://www.youtube.com/embed/abc123"
/// );
/// assert_eq!(to_embed_url("not a url"), "not a url");
/// ```
pub fn to_embed_url(input: &str) -> String {
    let Ok(parsed) = Url::parse(input) else {
        return input.to_string();
    };
    let host = parsed.host_str().unwrap_or_default();

    let id = if host.contains("youtube.com") {
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let short_id = match segments.as_slice() {
            ["shorts", id, ..] => Some((*id).to_string()),
            _ => None,
        };
        short_id.or_else(|| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
        })
    } else if host.contains("youtu.be") {
        parsed
            .path()
            .strip_prefix('/')
            .map(str::to_string)
    } else {
        None
    };

    match id.filter(|id| !id.is_empty()) {
        Some(id) => format!("{EMBED_PREFIX}{id}"),
        None => input.to_string(),
    }
}
