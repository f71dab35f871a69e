//! Configuration management for the standings service
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::ingest::proxy::ProxyTemplate;

/// Spreadsheet used when nothing else is configured
pub const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/18ogZDflEflZrl2KYxr4ZlfXwOwoOV2itOTsHVO3Udyo/export?format=csv&gid=2077816179";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote source configuration
    pub source: SourceConfig,

    /// Refresh timer configuration
    pub refresh: RefreshConfig,

    /// Synthetic data configuration
    pub fallback: FallbackConfig,

    /// HTTP API configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Where the leaderboard comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Fetch from the configured spreadsheet
    #[default]
    Remote,
    /// Serve generated data only
    Synthetic,
}

impl std::str::FromStr for DataMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "synthetic" => Ok(Self::Synthetic),
            other => anyhow::bail!("unknown data mode '{other}' (expected remote or synthetic)"),
        }
    }
}

/// Remote source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Spreadsheet link in any supported form
    pub url: String,

    /// Operating mode
    pub mode: DataMode,

    /// Relay templates tried after the direct request
    pub proxies: Vec<ProxyTemplate>,

    /// Deadline for one fetch across all candidates, in seconds
    pub fetch_deadline_secs: u64,

    /// User agent string
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_SOURCE_URL),
            mode: DataMode::Remote,
            proxies: ProxyTemplate::defaults(),
            fetch_deadline_secs: 8,
            user_agent: format!("standings/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SourceConfig {
    /// Get fetch deadline as Duration
    #[must_use]
    pub fn fetch_deadline(&self) -> Duration {
        Duration::from_secs(self.fetch_deadline_secs)
    }
}

/// Refresh timer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between periodic refreshes
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60 * 60,
        }
    }
}

impl RefreshConfig {
    /// Get refresh interval as Duration
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Synthetic data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Number of generated rows
    pub size: usize,

    /// Seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            size: crate::leaderboard::fallback::DEFAULT_SIZE,
            seed: None,
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, host:port
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("127.0.0.1:8080"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparseable variables keep their defaults, except for the
    /// proxy list and mode, which are rejected when malformed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("STANDINGS_SOURCE_URL") {
            config.source.url = url;
        }

        if let Ok(mode) = std::env::var("STANDINGS_MODE") {
            config.source.mode = mode.parse().context("Invalid STANDINGS_MODE")?;
        }

        if let Ok(proxies) = std::env::var("STANDINGS_PROXIES") {
            config.source.proxies = proxies
                .split_whitespace()
                .map(ProxyTemplate::new)
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Invalid STANDINGS_PROXIES")?;
        }

        if let Some(secs) = env_parse("STANDINGS_FETCH_DEADLINE") {
            config.source.fetch_deadline_secs = secs;
        }

        if let Ok(agent) = std::env::var("STANDINGS_USER_AGENT") {
            config.source.user_agent = agent;
        }

        if let Some(secs) = env_parse("STANDINGS_REFRESH_INTERVAL") {
            config.refresh.interval_secs = secs;
        }

        if let Some(size) = env_parse("STANDINGS_FALLBACK_SIZE") {
            config.fallback.size = size;
        }

        config.fallback.seed = env_parse("STANDINGS_FALLBACK_SEED");

        if let Ok(bind) = std::env::var("STANDINGS_BIND_ADDRESS") {
            config.server.bind_address = bind;
        }

        if let Ok(level) = std::env::var("STANDINGS_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(format) = std::env::var("STANDINGS_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.source.mode == DataMode::Remote && self.source.url.trim().is_empty() {
            anyhow::bail!("source.url must be set in remote mode");
        }

        if self.source.fetch_deadline_secs == 0 {
            anyhow::bail!("fetch_deadline_secs must be greater than 0");
        }

        if self.refresh.interval_secs == 0 {
            anyhow::bail!("interval_secs must be greater than 0");
        }

        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("bind_address '{}' is not host:port", self.server.bind_address);
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be text or json");
        }

        Ok(())
    }
}
