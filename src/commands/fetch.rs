use anyhow::{Context, Result};
use std::sync::Arc;

use standings::config::Config;
use standings::ingest::{normalize_sheet_url, FetchGateway, Pipeline};
use standings::models::Dataset;
use standings::utils::{format_usd, truncate_text};

/// Width of the username column in table output
const NAME_WIDTH: usize = 24;

/// One-shot ingestion; fails the process when the source cannot be read
pub async fn fetch(config: Config, url: Option<String>, json: bool, limit: Option<usize>) -> Result<()> {
    let url = url.unwrap_or_else(|| config.source.url.clone());

    let gateway =
        FetchGateway::from_config(&config.source).context("Failed to create fetch gateway")?;
    let pipeline = Pipeline::new(url, Arc::new(gateway));

    if !json {
        println!("Fetching leaderboard");
        println!("====================");
        println!("  URL: {}", pipeline.export_url());
        println!("  Relays: {}", config.source.proxies.len());
        println!();
    }

    let dataset = pipeline
        .run()
        .await
        .context("Failed to ingest leaderboard")?;

    if json {
        print_json(&dataset, limit)?;
    } else {
        print_table(&dataset, limit);
    }

    Ok(())
}

/// Print the canonical export URL for a link
pub fn normalize(url: &str) -> Result<()> {
    println!("{}", normalize_sheet_url(url));
    Ok(())
}

pub(crate) fn print_json(dataset: &Dataset, limit: Option<usize>) -> Result<()> {
    let records = match limit {
        Some(n) => dataset.top(n),
        None => dataset.records(),
    };

    let output = serde_json::json!({
        "source": dataset.source(),
        "refreshed_at": dataset.refreshed_at(),
        "total": dataset.len(),
        "records": records,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize dataset")?
    );
    Ok(())
}

pub(crate) fn print_table(dataset: &Dataset, limit: Option<usize>) {
    let records = match limit {
        Some(n) => dataset.top(n),
        None => dataset.records(),
    };

    println!("{:>5}  {:<NAME_WIDTH$}  {:>18}", "Rank", "Username", "Wagered");
    println!("{:-<5}  {:-<NAME_WIDTH$}  {:->18}", "", "", "");
    for record in records {
        println!(
            "{:>5}  {:<NAME_WIDTH$}  {:>18}",
            record.rank,
            truncate_text(&record.username, NAME_WIDTH),
            format_usd(record.wagered)
        );
    }

    println!();
    println!(
        "{} records ({}), refreshed {}",
        dataset.len(),
        dataset.source(),
        dataset.refreshed_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
}
