//! Remote ingestion: URL canonicalization, fetching and the end-to-end pipeline
//!
//! - [`url`] - spreadsheet link normalization
//! - [`proxy`] - relay URL templates
//! - [`fetcher`] - sequential multi-candidate fetch under one deadline
//!
//! [`Pipeline`] chains them with the parser and the assembler:
//! normalize → fetch → tokenize → detect header → coerce → assemble.

pub mod fetcher;
pub mod proxy;
pub mod url;

pub use fetcher::{Candidate, FetchGateway, FetchedPayload};
pub use proxy::ProxyTemplate;
pub use self::url::normalize_sheet_url;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;
use crate::leaderboard;
use crate::models::{Dataset, SourceMode};
use crate::parser;
use crate::utils::error::FetchError;

/// Anything that can turn a normalized URL into CSV text
///
/// The fetch gateway is the production implementation; tests substitute
/// canned sources.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_csv(&self, url: &str) -> std::result::Result<FetchedPayload, FetchError>;
}

#[async_trait]
impl SheetSource for FetchGateway {
    async fn fetch_csv(&self, url: &str) -> std::result::Result<FetchedPayload, FetchError> {
        FetchGateway::fetch_csv(self, url).await
    }
}

/// Build a dataset from CSV text already in hand
///
/// # Errors
///
/// Returns `Error::Schema` when the text has no usable header
pub fn ingest_text(text: &str, source: SourceMode) -> Result<Dataset> {
    let records = parser::parse_leaderboard(text)?;
    Ok(leaderboard::assemble(records, source))
}

/// One configured remote source and the means to fetch it
#[derive(Clone)]
pub struct Pipeline {
    source_url: String,
    source: Arc<dyn SheetSource>,
}

impl Pipeline {
    /// Create a pipeline for a source URL
    pub fn new(source_url: impl Into<String>, source: Arc<dyn SheetSource>) -> Self {
        Self {
            source_url: source_url.into(),
            source,
        }
    }

    /// The URL as configured
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The URL actually requested
    pub fn export_url(&self) -> String {
        normalize_sheet_url(&self.source_url)
    }

    /// Run the full pipeline once
    ///
    /// # Errors
    ///
    /// Returns `Error::Fetch` if no candidate produced CSV in time and
    /// `Error::Schema` if the payload lacks a usable header
    pub async fn run(&self) -> Result<Dataset> {
        let url = self.export_url();
        debug!(url = %url, "Running ingestion pipeline");

        let payload = self.source.fetch_csv(&url).await?;
        let dataset = ingest_text(&payload.body, payload.candidate.source_mode())?;

        info!(
            source = %dataset.source(),
            records = dataset.len(),
            "Ingestion pipeline completed"
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::utils::error::SchemaError;

    struct CannedSource {
        body: &'static str,
        candidate: Candidate,
    }

    #[async_trait]
    impl SheetSource for CannedSource {
        async fn fetch_csv(&self, url: &str) -> std::result::Result<FetchedPayload, FetchError> {
            assert!(url.contains("/export?format=csv"));
            Ok(FetchedPayload {
                body: self.body.to_string(),
                candidate: self.candidate,
            })
        }
    }

    #[tokio::test]
    async fn test_pipeline_remote() {
        let source = Arc::new(CannedSource {
            body: "rank,username,wagered\n1,alice,1000\n2,bob,500\n",
            candidate: Candidate::Direct,
        });
        let pipeline = Pipeline::new("https://docs.google.com/spreadsheets/d/abc/edit", source);

        let dataset = pipeline.run().await.unwrap();
        assert_eq!(dataset.source(), SourceMode::Remote);
        assert_eq!(dataset.records()[0].username, "alice");
        assert_eq!(dataset.records()[1].username, "bob");
    }

    #[tokio::test]
    async fn test_pipeline_proxied_schema_error() {
        let source = Arc::new(CannedSource {
            body: "Rank,Player\n1,alice\n",
            candidate: Candidate::Relay(1),
        });
        let pipeline = Pipeline::new("https://docs.google.com/spreadsheets/d/abc/edit", source);

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::MissingColumns { .. })));
    }

    #[test]
    fn test_ingest_text_idempotent() {
        let text = "place,name,amount\n2,b,5\n1,a,9\n";
        let first = ingest_text(text, SourceMode::Remote).unwrap();
        let second = ingest_text(text, SourceMode::Remote).unwrap();
        assert!(first.same_contents(&second));
    }
}
