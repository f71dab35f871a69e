//! Snapshot HTTP server
//!
//! Exposes the published leaderboard read-only to the display layer, plus
//! manual refresh and CSV import triggers.
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/api/health` | liveness and current source |
//! | GET | `/api/leaderboard` | current snapshot (`?limit=N`) |
//! | POST | `/api/refresh` | manual refresh; 502 when the source fails |
//! | POST | `/api/import` | replace data with CSV from the body |
//! | GET | `/metrics` | Prometheus exposition |

pub mod api;

pub use api::create_router;

use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::scheduler::RefreshScheduler;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Refresh scheduler owning the published snapshot
    pub scheduler: RefreshScheduler,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(scheduler: RefreshScheduler) -> Self {
        Self {
            scheduler,
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Snapshot Server
// ============================================================================

/// HTTP front for a refresh scheduler
pub struct SnapshotServer {
    bind_address: SocketAddr,
    state: AppState,
}

impl SnapshotServer {
    /// Create a new server
    pub fn new(config: &ServerConfig, scheduler: RefreshScheduler) -> Result<Self, ServerError> {
        let bind_address = config
            .bind_address
            .parse()
            .map_err(|_| ServerError::ConfigError(format!("bad bind address '{}'", config.bind_address)))?;

        Ok(Self {
            bind_address,
            state: AppState::new(scheduler),
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        create_router(self.state.clone())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();

        tracing::info!("Starting snapshot server on {}", self.bind_address);

        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Snapshot server shutdown complete");
        Ok(())
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::FallbackGenerator;

    #[test]
    fn test_server_creation() {
        let scheduler = RefreshScheduler::synthetic(FallbackGenerator::new(3));
        let server = SnapshotServer::new(&ServerConfig::default(), scheduler).unwrap();
        assert_eq!(server.bind_address().port(), 8080);
    }

    #[test]
    fn test_bad_bind_address() {
        let scheduler = RefreshScheduler::synthetic(FallbackGenerator::new(3));
        let config = ServerConfig {
            bind_address: "localhost".to_string(),
        };
        assert!(matches!(
            SnapshotServer::new(&config, scheduler),
            Err(ServerError::ConfigError(_))
        ));
    }
}
