//! Prometheus metrics for the ingestion pipeline
//!
//! This module provides metrics tracking for:
//! - Pipeline runs by trigger and outcome, with duration
//! - Fetch attempts by candidate kind and outcome
//! - Size of the published dataset
//! - Snapshot API requests
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all pipeline metrics
struct PipelineMetrics {
    pipeline_runs: CounterVec,
    pipeline_duration: HistogramVec,
    fetch_attempts: CounterVec,
    published_records: Gauge,
    api_requests: CounterVec,
}

/// Global storage for pipeline metrics
static PIPELINE_METRICS: OnceLock<PipelineMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// If metric registration fails, errors are logged and subsequent
/// metric operations become no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = standings::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    // Prevent double initialization
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = PipelineMetrics {
        pipeline_runs: register_counter_vec!(
            "standings_pipeline_runs_total",
            "Total ingestion pipeline runs by trigger and outcome",
            &["trigger", "outcome"]
        )?,
        pipeline_duration: register_histogram_vec!(
            "standings_pipeline_duration_seconds",
            "Ingestion pipeline duration in seconds",
            &["trigger"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0]
        )?,
        fetch_attempts: register_counter_vec!(
            "standings_fetch_attempts_total",
            "Total fetch attempts by candidate kind and outcome",
            &["candidate", "outcome"]
        )?,
        published_records: register_gauge!(
            "standings_published_records",
            "Number of records in the published dataset"
        )?,
        api_requests: register_counter_vec!(
            "standings_api_requests_total",
            "Total API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
    };

    PIPELINE_METRICS
        .set(metrics)
        .map_err(|_| "Pipeline metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    PIPELINE_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a finished pipeline run
pub fn record_pipeline_run(trigger: &str, outcome: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.pipeline_runs.with_label_values(&[trigger, outcome]).inc();
    }
}

/// Record one fetch candidate attempt
pub fn record_fetch_attempt(candidate: &str, outcome: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.fetch_attempts.with_label_values(&[candidate, outcome]).inc();
    }
}

/// Set the published record count
pub fn set_published_records(count: usize) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.published_records.set(count as f64);
    }
}

/// Record API request
pub fn record_api_request(endpoint: &str, status: u16) {
    let Some(m) = PIPELINE_METRICS.get() else {
        return;
    };

    let status_str = status.to_string();
    m.api_requests
        .with_label_values(&[endpoint, &status_str])
        .inc();
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start a pipeline timer (returns a timer handle)
pub fn start_pipeline_timer(trigger: &str) -> MetricsTimer {
    match PIPELINE_METRICS.get() {
        Some(m) => MetricsTimer::new(m.pipeline_duration.with_label_values(&[trigger]).start_timer()),
        None => MetricsTimer::noop(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_init_and_encode() {
        init_metrics().unwrap();
        assert!(metrics_initialized());

        // Second call is a no-op
        assert!(init_metrics().is_ok());

        record_pipeline_run("manual", "success");
        record_fetch_attempt("direct", "accepted");
        set_published_records(25);
        record_api_request("/api/leaderboard", 200);
        drop(start_pipeline_timer("manual"));

        let output = encode_metrics().unwrap();
        assert!(output.contains("standings_pipeline_runs_total"));
        assert!(output.contains("standings_fetch_attempts_total"));
        assert!(output.contains("standings_published_records"));
    }
}
