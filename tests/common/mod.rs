//! Common test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use standings::ingest::{Candidate, FetchGateway, FetchedPayload, Pipeline, ProxyTemplate, SheetSource};
use standings::leaderboard::FallbackGenerator;
use standings::scheduler::RefreshScheduler;
use standings::utils::error::FetchError;

/// Small leaderboard in spreadsheet-export form
pub const SAMPLE_CSV: &str = "Rank,Player,Total\n1,alice,\"$12,500.00\"\n2,bob,\"$9,000\"\n3,carol,750\n";

/// A second version of the sample, as after a sheet edit
pub const UPDATED_CSV: &str = "Rank,Player,Total\n1,bob,20000\n2,alice,15000\n";

/// Refresh interval used by scheduler tests
pub const INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Sheet link used as the configured source
pub const SHEET_LINK: &str = "https://docs.google.com/spreadsheets/d/test-doc/edit#gid=7";

/// Gateway with a single relay on the mock server
pub fn gateway_for(mock_uri: &str, deadline: Duration) -> FetchGateway {
    let relay = ProxyTemplate::new(format!("{mock_uri}/relay?url={{url_encoded}}")).unwrap();
    FetchGateway::with_proxies(vec![relay], deadline).unwrap()
}

/// Source that replays scripted outcomes, then repeats the last one
pub struct ScriptedSource {
    script: Mutex<VecDeque<Option<&'static str>>>,
    last: Mutex<Option<&'static str>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    /// `Some(csv)` succeeds with that body, `None` fails
    pub fn new(script: Vec<Option<&'static str>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SheetSource for ScriptedSource {
    async fn fetch_csv(&self, _url: &str) -> Result<FetchedPayload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            match script.pop_front() {
                Some(step) => {
                    *last = step;
                    step
                }
                None => *last,
            }
        };

        match step {
            Some(body) => Ok(FetchedPayload {
                body: body.to_string(),
                candidate: Candidate::Direct,
            }),
            None => Err(FetchError::Exhausted {
                attempts: 4,
                last: Box::new(FetchError::Status(503)),
            }),
        }
    }
}

/// Scheduler over a scripted source with a seeded 3-row fallback
pub fn scheduler_with(source: Arc<ScriptedSource>) -> RefreshScheduler {
    let pipeline = Pipeline::new(SHEET_LINK, source);
    RefreshScheduler::new(pipeline, INTERVAL, FallbackGenerator::new(3).with_seed(1)).unwrap()
}
