use anyhow::{Context, Result};
use std::path::Path;

use standings::media::import_media_file;
use standings::parser::import::import_file;

use super::fetch::{print_json, print_table};

/// Import a leaderboard CSV file and print the assembled result
pub fn import(path: &Path, json: bool, limit: Option<usize>) -> Result<()> {
    let dataset = import_file(path)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    if json {
        print_json(&dataset, limit)
    } else {
        println!("Imported {}", path.display());
        println!();
        print_table(&dataset, limit);
        Ok(())
    }
}

/// Import a media manifest and print the items
pub fn media(path: &Path, json: bool) -> Result<()> {
    let items = import_media_file(path)
        .with_context(|| format!("Media import failed for {}. Use JSON array or CSV: type,title,url,thumb", path.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&items).context("Failed to serialize media items")?
        );
        return Ok(());
    }

    println!("Media items ({})", items.len());
    println!("=================");
    for item in &items {
        println!("  {:>3}. [{}] {}", item.id, item.kind, item.title);
        println!("       {}", item.playable_url());
        if let Some(thumb) = &item.thumb {
            println!("       thumb: {thumb}");
        }
    }
    Ok(())
}
