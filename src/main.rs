use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use standings::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "standings",
    version,
    about = "Leaderboard ingestion from shared spreadsheets with relay fallback and scheduled refresh",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file; environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the leaderboard once
    Fetch {
        /// Sheet link overriding the configured source
        #[arg(short, long)]
        url: Option<String>,

        /// Print JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,

        /// Only print the top N records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the CSV export URL for a sheet link
    Normalize {
        /// Sheet link in any supported form
        url: String,
    },

    /// Import a leaderboard CSV file (rank,username,wagered)
    Import {
        /// CSV file path
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,

        /// Only print the top N records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Import media items from a JSON or CSV file
    Media {
        /// JSON or CSV file path
        file: PathBuf,

        /// Print JSON instead of a list
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Serve the leaderboard snapshot over HTTP with periodic refresh
    Serve {
        /// Bind address overriding the configured one (host:port)
        #[arg(short, long)]
        bind: Option<String>,

        /// Refresh interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// Serve generated data only
        #[arg(long, default_value = "false")]
        synthetic: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::debug!("standings starting");

    match cli.command {
        Commands::Fetch { url, json, limit } => {
            tracing::info!(url = ?url, json = %json, "Starting fetch command");
            commands::fetch(config, url, json, limit).await?;
        }

        Commands::Normalize { url } => {
            commands::normalize(&url)?;
        }

        Commands::Import { file, json, limit } => {
            tracing::info!(file = %file.display(), "Starting import command");
            commands::import(&file, json, limit)?;
        }

        Commands::Media { file, json } => {
            tracing::info!(file = %file.display(), "Starting media command");
            commands::media(&file, json)?;
        }

        Commands::Serve {
            bind,
            interval,
            synthetic,
        } => {
            tracing::info!(
                bind = ?bind,
                interval = ?interval,
                synthetic = %synthetic,
                "Starting serve command"
            );
            commands::serve(
                config,
                commands::ServeParams {
                    bind,
                    interval_secs: interval,
                    synthetic,
                },
            )
            .await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("standings=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("standings={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
