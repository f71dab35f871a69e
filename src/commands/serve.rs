use anyhow::{Context, Result};

use standings::config::{Config, DataMode};
use standings::metrics;
use standings::scheduler::RefreshScheduler;
use standings::server::SnapshotServer;

// ============================================================================
// Snapshot Server Implementation
// ============================================================================

/// Overrides applied on top of the loaded configuration
pub struct ServeParams {
    pub bind: Option<String>,
    pub interval_secs: Option<u64>,
    pub synthetic: bool,
}

/// Run the scheduler and the snapshot API until Ctrl+C
pub async fn serve(mut config: Config, params: ServeParams) -> Result<()> {
    if let Some(bind) = params.bind {
        config.server.bind_address = bind;
    }
    if let Some(secs) = params.interval_secs {
        config.refresh.interval_secs = secs;
    }
    if params.synthetic {
        config.source.mode = DataMode::Synthetic;
    }
    config.validate().context("Invalid configuration")?;

    if let Err(e) = metrics::init_metrics() {
        tracing::warn!("Metrics initialization failed: {}", e);
    }

    println!("Starting Leaderboard Server");
    println!("===========================");
    println!("  Mode: {:?}", config.source.mode);
    if config.source.mode == DataMode::Remote {
        println!("  Source: {}", config.source.url);
        println!("  Refresh every: {}s", config.refresh.interval_secs);
        println!("  Fetch deadline: {}s", config.source.fetch_deadline_secs);
        println!("  Relays: {}", config.source.proxies.len());
    }
    println!();

    let scheduler =
        RefreshScheduler::from_config(&config).context("Failed to create refresh scheduler")?;

    let snapshot = scheduler.initial_load().await;
    println!(
        "Initial load: {} records ({})",
        snapshot.dataset.len(),
        snapshot.dataset.source()
    );
    if let Some(advisory) = &snapshot.advisory {
        println!("  Notice: {}", advisory.message);
    }

    scheduler.start().context("Failed to start refresh timer")?;

    let server = SnapshotServer::new(&config.server, scheduler.clone())
        .context("Failed to create snapshot server")?;

    println!();
    println!("API Endpoints:");
    println!("  GET  /api/health       - Health check");
    println!("  GET  /api/leaderboard  - Current snapshot (?limit=N)");
    println!("  POST /api/refresh      - Refresh from the sheet now");
    println!("  POST /api/import       - Replace data with CSV body");
    println!("  GET  /metrics          - Prometheus metrics endpoint");
    println!();
    println!("Listening on http://{}", server.bind_address());
    println!("Press Ctrl+C to stop.\n");

    // Start with graceful shutdown
    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                }
                Err(e) => {
                    tracing::error!("Failed to wait for Ctrl+C: {}", e);
                }
            }
        })
        .await?;

    scheduler.stop().await;

    println!("Leaderboard server stopped.");
    Ok(())
}
