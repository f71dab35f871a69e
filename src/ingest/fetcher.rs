//! HTTP fetch gateway with relay fallback
//!
//! This module retrieves the exported CSV from the spreadsheet host. Direct
//! requests are often blocked, so the gateway falls back to a fixed list of
//! relay endpoints:
//! - Candidates are tried strictly one after another
//! - A single deadline covers the whole call, not each candidate
//! - A 2xx response is rejected when its body is an HTML page
//! - Body decoding honours the response charset and strips a BOM

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, USER_AGENT},
    Client, Response,
};
use tracing::{debug, info, warn};

use super::proxy::ProxyTemplate;
use crate::config::SourceConfig;
use crate::metrics;
use crate::models::SourceMode;
use crate::utils::error::FetchError;
use crate::utils::{extract_domain, truncate_text};

/// Lower-case prefixes that identify an HTML page masquerading as data
const MARKUP_PREFIXES: &[&str] = &["<!doctype html", "<html"];

/// How many leading characters are inspected by the markup sniff
const SNIFF_CHARS: usize = 64;

/// Default deadline for one gateway call
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(8);

/// Which candidate served a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// The normalized URL itself
    Direct,
    /// The relay at this index of the template list
    Relay(usize),
}

impl Candidate {
    /// Label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Relay(_) => "relay",
        }
    }

    /// Provenance of data served by this candidate
    pub fn source_mode(&self) -> SourceMode {
        match self {
            Self::Direct => SourceMode::Remote,
            Self::Relay(_) => SourceMode::Proxied,
        }
    }
}

/// Accepted response text and the candidate that served it
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    pub body: String,
    pub candidate: Candidate,
}

/// Sequential multi-endpoint fetcher
pub struct FetchGateway {
    /// HTTP client shared by all candidates
    client: Client,

    /// Relay templates, tried after the direct URL
    proxies: Vec<ProxyTemplate>,

    /// Deadline for the whole candidate sequence
    deadline: Duration,

    /// User agent sent with every request
    user_agent: String,
}

impl FetchGateway {
    /// Create a gateway with the default relays and deadline
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the HTTP client cannot be created
    pub fn new() -> Result<Self, FetchError> {
        Self::with_proxies(ProxyTemplate::defaults(), DEFAULT_DEADLINE)
    }

    /// Create a gateway with custom relays and deadline
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the HTTP client cannot be created
    pub fn with_proxies(proxies: Vec<ProxyTemplate>, deadline: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().gzip(true).build()?;

        Ok(Self {
            client,
            proxies,
            deadline,
            user_agent: format!("standings/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Create a gateway from the source section of the configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the HTTP client cannot be created
    pub fn from_config(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut gateway = Self::with_proxies(config.proxies.clone(), config.fetch_deadline())?;
        gateway.user_agent = config.user_agent.clone();
        Ok(gateway)
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Ordered candidate URLs for a target: direct first, then each relay
    pub fn candidates(&self, target: &str) -> Vec<(Candidate, String)> {
        std::iter::once((Candidate::Direct, target.to_string()))
            .chain(
                self.proxies
                    .iter()
                    .enumerate()
                    .map(|(i, proxy)| (Candidate::Relay(i), proxy.build(target))),
            )
            .collect()
    }

    /// Fetch CSV text for an already-normalized URL
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Exhausted` when every candidate failed and
    /// `FetchError::DeadlineElapsed` when the deadline ran out first; both
    /// carry the last per-candidate failure.
    pub async fn fetch_csv(&self, url: &str) -> Result<FetchedPayload, FetchError> {
        let candidates = self.candidates(url);
        let mut last_error = None;

        let outcome = tokio::time::timeout(
            self.deadline,
            self.try_candidates(&candidates, &mut last_error),
        )
        .await;

        match outcome {
            Ok(Some(payload)) => {
                info!(
                    candidate = payload.candidate.kind(),
                    bytes = payload.body.len(),
                    "Fetched CSV payload"
                );
                Ok(payload)
            }
            Ok(None) => Err(FetchError::Exhausted {
                attempts: candidates.len(),
                last: Box::new(
                    last_error.unwrap_or_else(|| FetchError::Transport("no candidates".into())),
                ),
            }),
            Err(_) => {
                warn!(deadline_ms = self.deadline.as_millis() as u64, "Fetch deadline elapsed");
                Err(FetchError::DeadlineElapsed {
                    deadline_ms: self.deadline.as_millis() as u64,
                    last: last_error.map(Box::new),
                })
            }
        }
    }

    /// Walk the candidates in order, stopping at the first accepted payload
    async fn try_candidates(
        &self,
        candidates: &[(Candidate, String)],
        last_error: &mut Option<FetchError>,
    ) -> Option<FetchedPayload> {
        for (candidate, url) in candidates {
            let host = extract_domain(url).unwrap_or_else(|_| truncate_text(url, 40));
            debug!(candidate = candidate.kind(), host = %host, "Trying fetch candidate");

            match self.attempt(url).await {
                Ok(body) => {
                    metrics::record_fetch_attempt(candidate.kind(), "accepted");
                    return Some(FetchedPayload {
                        body,
                        candidate: *candidate,
                    });
                }
                Err(e) => {
                    metrics::record_fetch_attempt(candidate.kind(), failure_label(&e));
                    warn!(candidate = candidate.kind(), host = %host, error = %e, "Fetch candidate rejected");
                    *last_error = Some(e);
                }
            }
        }

        None
    }

    /// One request against one candidate
    async fn attempt(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(self.build_headers())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = self.decode_response(response).await?;
        if looks_like_markup(&text) {
            return Err(FetchError::Markup);
        }

        Ok(text)
    }

    /// Read the body and decode it using the response charset
    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(decode_bytes(&bytes, &content_type))
    }

    /// Build request headers
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(agent) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, agent);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/csv,text/plain;q=0.9,*/*;q=0.8"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        headers
    }
}

/// Metrics label for a rejected candidate
fn failure_label(error: &FetchError) -> &'static str {
    match error {
        FetchError::Status(_) => "status",
        FetchError::Markup => "markup",
        FetchError::Body(_) => "body",
        _ => "transport",
    }
}

/// Decode a body with the charset named in `content_type`, defaulting to UTF-8
///
/// A leading byte-order mark overrides the declared charset and is removed.
/// Malformed sequences become U+FFFD; they never reject the payload.
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> String {
    let encoding = content_type
        .to_lowercase()
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset=").map(str::to_string))
        .next()
        .and_then(|label| Encoding::for_label(label.trim_matches('"').as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = used.name(), "Body had malformed byte sequences, replaced");
    }

    text.into_owned()
}

/// Content sniff: does the body start like an HTML document?
pub fn looks_like_markup(text: &str) -> bool {
    let head: String = text.trim().chars().take(SNIFF_CHARS).collect::<String>().to_lowercase();
    MARKUP_PREFIXES.iter().any(|prefix| head.starts_with(prefix))
}
