//! REST API handlers for the snapshot server
//!
//! This module defines the API routes and handlers for the display layer.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClassifiedError, Error};
use crate::metrics;
use crate::models::{Record, SourceMode};
use crate::parser::import::import_text;
use crate::scheduler::{Advisory, Snapshot};

use super::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            category: None,
        }
    }

    /// Build from a crate error, keeping its category
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            category: Some(err.category().as_str().to_string()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub source: SourceMode,
    pub records: usize,
    pub refresh_timer: bool,
}

/// Leaderboard snapshot as served to the display layer
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub source: SourceMode,
    pub refreshed_at: DateTime<Utc>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
    pub records: Vec<Record>,
}

impl SnapshotResponse {
    /// Build from a snapshot, keeping at most `limit` records
    pub fn from_snapshot(snapshot: &Snapshot, limit: Option<usize>) -> Self {
        let dataset = &snapshot.dataset;
        let records = match limit {
            Some(n) => dataset.top(n),
            None => dataset.records(),
        };

        Self {
            source: dataset.source(),
            refreshed_at: dataset.refreshed_at(),
            total: dataset.len(),
            advisory: snapshot.advisory.clone(),
            records: records.to_vec(),
        }
    }
}

impl From<&Snapshot> for SnapshotResponse {
    fn from(snapshot: &Snapshot) -> Self {
        Self::from_snapshot(snapshot, None)
    }
}

/// Leaderboard query parameters
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/api/health", get(health_check))
        // Leaderboard endpoints
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/refresh", post(refresh_now))
        .route("/api/import", post(import_csv))
        // Metrics endpoint
        .route("/metrics", get(metrics_text))
        .with_state(state)
}

// ============================================================================
// Health Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();
    let snapshot = state.scheduler.snapshot();

    metrics::record_api_request("/api/health", 200);
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime,
        source: snapshot.dataset.source(),
        records: snapshot.dataset.len(),
        refresh_timer: state.scheduler.is_running(),
    }))
}

// ============================================================================
// Leaderboard Handlers
// ============================================================================

/// Current published snapshot
async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> impl IntoResponse {
    let snapshot = state.scheduler.snapshot();

    metrics::record_api_request("/api/leaderboard", 200);
    Json(ApiResponse::success(SnapshotResponse::from_snapshot(
        &snapshot,
        query.limit,
    )))
}

/// Manual refresh
async fn refresh_now(State(state): State<AppState>) -> Response {
    match state.scheduler.trigger_now().await {
        Ok(snapshot) => {
            metrics::record_api_request("/api/refresh", 200);
            Json(ApiResponse::success(SnapshotResponse::from(&snapshot))).into_response()
        }
        Err(e) => {
            let status = match e {
                Error::Scheduler(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_GATEWAY,
            };
            metrics::record_api_request("/api/refresh", status.as_u16());
            (status, Json(ErrorResponse::from_error(&e))).into_response()
        }
    }
}

/// Replace the leaderboard with uploaded CSV text
async fn import_csv(State(state): State<AppState>, body: String) -> Response {
    if body.trim().is_empty() {
        metrics::record_api_request("/api/import", 400);
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("CSV body is empty. Expected: rank,username,wagered")),
        )
            .into_response();
    }

    let snapshot = state.scheduler.publish_imported(import_text(&body));

    metrics::record_api_request("/api/import", 200);
    Json(ApiResponse::success(SnapshotResponse::from(&snapshot))).into_response()
}

// ============================================================================
// Metrics Handler
// ============================================================================

/// Prometheus text exposition
async fn metrics_text() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

// ============================================================================
// Tests
// ============================================================================
