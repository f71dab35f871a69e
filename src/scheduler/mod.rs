//! Refresh scheduling
//!
//! The [`RefreshScheduler`] drives the ingestion pipeline on three occasions
//! and decides what gets published when a run fails:
//!
//! | Occasion | On success | On failure |
//! |----------|------------|------------|
//! | initial load | publish, clear advisory | publish synthetic data + `SyntheticFallback` |
//! | periodic timer | publish, clear advisory | keep dataset + `RefreshFailed` |
//! | manual trigger | publish, clear advisory | keep dataset + `ManualRefreshFailed`, error returned |
//!
//! Synthetic data is only ever generated by the initial load. Manual and
//! periodic runs are not coalesced; whichever finishes last wins.
//!
//! # Modules
//!
//! - [`store`] - the published snapshot slot
//! - [`error`] - scheduler lifecycle errors
//!
//! # Example
//!
//! ```ignore
//! use standings::config::Config;
//! use standings::scheduler::RefreshScheduler;
//!
//! let scheduler = RefreshScheduler::from_config(&Config::default())?;
//! let snapshot = scheduler.initial_load().await;
//! scheduler.start()?;
//!
//! let mut updates = scheduler.subscribe();
//! while updates.changed().await.is_ok() {
//!     println!("{} rows", updates.borrow().dataset.len());
//! }
//! ```

pub mod error;
pub mod store;

pub use error::{SchedulerError, SchedulerResult};
pub use store::{Advisory, AdvisoryKind, DatasetStore, Snapshot};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{Config, DataMode};
use crate::error::{ClassifiedError, Result};
use crate::ingest::{FetchGateway, Pipeline};
use crate::leaderboard::FallbackGenerator;
use crate::metrics;
use crate::models::Dataset;

/// Default refresh interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// What caused a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Initial,
    Periodic,
    Manual,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Periodic => "periodic",
            Self::Manual => "manual",
        }
    }

    /// Advisory raised when a run from this trigger fails
    pub fn failure_advisory(&self) -> AdvisoryKind {
        match self {
            Self::Initial => AdvisoryKind::SyntheticFallback,
            Self::Periodic => AdvisoryKind::RefreshFailed,
            Self::Manual => AdvisoryKind::ManualRefreshFailed,
        }
    }
}

/// Running timer task and its stop signal
struct TimerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

struct Inner {
    /// `None` in synthetic operating mode
    pipeline: Option<Pipeline>,
    fallback: FallbackGenerator,
    interval: Duration,
    store: DatasetStore,
    timer: Mutex<Option<TimerHandle>>,
}

impl Inner {
    /// Run the pipeline once, publishing on success and raising on failure
    async fn refresh(&self, trigger: RefreshTrigger) -> Result<Snapshot> {
        let Some(pipeline) = &self.pipeline else {
            return Err(SchedulerError::NoRemoteSource.into());
        };

        let timer = metrics::start_pipeline_timer(trigger.as_str());
        let outcome = pipeline.run().await;
        drop(timer);

        match outcome {
            Ok(dataset) => {
                metrics::record_pipeline_run(trigger.as_str(), "success");
                Ok(self.publish(dataset, trigger))
            }
            Err(e) => {
                metrics::record_pipeline_run(trigger.as_str(), "failure");
                // the initial load publishes its fallback and advisory together
                if trigger == RefreshTrigger::Initial {
                    warn!(
                        category = e.category().as_str(),
                        error = %e,
                        "Initial load failed"
                    );
                } else {
                    warn!(
                        trigger = trigger.as_str(),
                        category = e.category().as_str(),
                        error = %e,
                        "Refresh failed, keeping previous data"
                    );
                    self.store.raise(trigger.failure_advisory());
                }
                Err(e)
            }
        }
    }

    fn publish(&self, dataset: Dataset, trigger: RefreshTrigger) -> Snapshot {
        info!(
            trigger = trigger.as_str(),
            source = %dataset.source(),
            records = dataset.len(),
            "Publishing dataset"
        );
        metrics::set_published_records(dataset.len());
        self.store.publish(dataset)
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<TimerHandle>> {
        self.timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owner of the refresh timer and the published snapshot
#[derive(Clone)]
pub struct RefreshScheduler {
    inner: Arc<Inner>,
}

impl RefreshScheduler {
    /// Create a scheduler refreshing from a remote pipeline
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidInterval` for a zero interval
    pub fn new(
        pipeline: Pipeline,
        interval: Duration,
        fallback: FallbackGenerator,
    ) -> SchedulerResult<Self> {
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval { secs: 0 });
        }
        Ok(Self::build(Some(pipeline), interval, fallback))
    }

    /// Create a scheduler that only ever serves generated data
    pub fn synthetic(fallback: FallbackGenerator) -> Self {
        Self::build(None, DEFAULT_INTERVAL, fallback)
    }

    /// Create a scheduler from the application configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the interval
    /// is invalid
    pub fn from_config(config: &Config) -> Result<Self> {
        let fallback = FallbackGenerator::from_config(&config.fallback);

        match config.source.mode {
            DataMode::Synthetic => Ok(Self::synthetic(fallback)),
            DataMode::Remote => {
                let gateway = FetchGateway::from_config(&config.source)?;
                let pipeline = Pipeline::new(config.source.url.clone(), Arc::new(gateway));
                Ok(Self::new(pipeline, config.refresh.interval(), fallback)?)
            }
        }
    }

    fn build(pipeline: Option<Pipeline>, interval: Duration, fallback: FallbackGenerator) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline,
                fallback,
                interval,
                store: DatasetStore::new(),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.inner.pipeline.is_none()
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.inner.store.snapshot()
    }

    /// Receive every future snapshot replacement
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.store.subscribe()
    }

    /// First load; always publishes something
    ///
    /// Any failure is absorbed: generated data is published with a
    /// `SyntheticFallback` advisory.
    pub async fn initial_load(&self) -> Snapshot {
        if self.is_synthetic() {
            let dataset = self.inner.fallback.generate();
            return self.inner.publish(dataset, RefreshTrigger::Initial);
        }

        match self.inner.refresh(RefreshTrigger::Initial).await {
            Ok(snapshot) => snapshot,
            Err(_) => {
                let dataset = self.inner.fallback.generate();
                info!(records = dataset.len(), "Publishing generated fallback data");
                metrics::set_published_records(dataset.len());
                self.inner
                    .store
                    .publish_with_advisory(dataset, RefreshTrigger::Initial.failure_advisory())
            }
        }
    }

    /// Refresh on request
    ///
    /// # Errors
    ///
    /// Returns the pipeline error after raising `ManualRefreshFailed`, or
    /// `SchedulerError::NoRemoteSource` in synthetic mode
    pub async fn trigger_now(&self) -> Result<Snapshot> {
        self.inner.refresh(RefreshTrigger::Manual).await
    }

    /// Publish a dataset that did not come from the pipeline (file import)
    ///
    /// Clears any advisory, like a successful refresh.
    pub fn publish_imported(&self, dataset: Dataset) -> Snapshot {
        info!(records = dataset.len(), source = %dataset.source(), "Publishing imported dataset");
        metrics::set_published_records(dataset.len());
        self.inner.store.publish(dataset)
    }

    /// Start the periodic timer
    ///
    /// The first tick fires one full interval after the call. In synthetic
    /// mode no timer is started.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::AlreadyRunning` if the timer is active
    pub fn start(&self) -> SchedulerResult<()> {
        if self.is_synthetic() {
            debug!("Synthetic mode, refresh timer not started");
            return Ok(());
        }

        let mut timer = self.inner.lock_timer();
        if timer.as_ref().is_some_and(|t| !t.task.is_finished()) {
            return Err(SchedulerError::AlreadyRunning);
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_timer(Arc::clone(&self.inner), shutdown_rx));
        *timer = Some(TimerHandle { shutdown, task });

        info!(interval_secs = self.inner.interval.as_secs(), "Refresh timer started");
        Ok(())
    }

    /// Stop the periodic timer and wait for it to exit
    ///
    /// A periodic refresh already in flight is abandoned without publishing.
    pub async fn stop(&self) {
        let handle = self.inner.lock_timer().take();

        if let Some(TimerHandle { shutdown, task }) = handle {
            let _ = shutdown.send(true);
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Refresh timer task ended abnormally");
                }
            }
            info!("Refresh timer stopped");
        }
    }

    /// Whether the periodic timer is active
    pub fn is_running(&self) -> bool {
        self.inner
            .lock_timer()
            .as_ref()
            .is_some_and(|t| !t.task.is_finished())
    }
}

/// Periodic refresh loop
async fn run_timer(inner: Arc<Inner>, mut shutdown: watch::Receiver<bool>) {
    let period = inner.interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!("Periodic refresh tick");
                let stopped = tokio::select! {
                    _ = inner.refresh(RefreshTrigger::Periodic) => false,
                    _ = shutdown.changed() => true,
                };
                if stopped {
                    debug!("Refresh abandoned on shutdown");
                    break;
                }
            }
            _ = shutdown.changed() => {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{Candidate, FetchedPayload, SheetSource};
    use crate::models::SourceMode;
    use crate::utils::error::FetchError;
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl SheetSource for FailingSource {
        async fn fetch_csv(&self, _url: &str) -> std::result::Result<FetchedPayload, FetchError> {
            Err(FetchError::Exhausted {
                attempts: 1,
                last: Box::new(FetchError::Status(500)),
            })
        }
    }

    struct FixedSource;

    #[async_trait]
    impl SheetSource for FixedSource {
        async fn fetch_csv(&self, _url: &str) -> std::result::Result<FetchedPayload, FetchError> {
            Ok(FetchedPayload {
                body: "rank,username,wagered\n1,alice,10\n".to_string(),
                candidate: Candidate::Direct,
            })
        }
    }

    struct SlowSource;

    #[async_trait]
    impl SheetSource for SlowSource {
        async fn fetch_csv(&self, url: &str) -> std::result::Result<FetchedPayload, FetchError> {
            tokio::time::sleep(Duration::from_secs(60 * 60)).await;
            FixedSource.fetch_csv(url).await
        }
    }

    fn scheduler_with(source: Arc<dyn SheetSource>) -> RefreshScheduler {
        let pipeline = Pipeline::new("https://docs.google.com/spreadsheets/d/x/edit", source);
        RefreshScheduler::new(pipeline, DEFAULT_INTERVAL, FallbackGenerator::new(3)).unwrap()
    }

    #[test]
    fn test_trigger_advisories() {
        assert_eq!(
            RefreshTrigger::Initial.failure_advisory(),
            AdvisoryKind::SyntheticFallback
        );
        assert_eq!(
            RefreshTrigger::Manual.failure_advisory(),
            AdvisoryKind::ManualRefreshFailed
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        let pipeline = Pipeline::new("https://x.test", Arc::new(FixedSource));
        let result = RefreshScheduler::new(pipeline, Duration::ZERO, FallbackGenerator::default());
        assert!(matches!(result, Err(SchedulerError::InvalidInterval { .. })));
    }

    #[tokio::test]
    async fn test_initial_failure_publishes_fallback() {
        let scheduler = scheduler_with(Arc::new(FailingSource));
        let snapshot = scheduler.initial_load().await;

        assert_eq!(snapshot.dataset.source(), SourceMode::Synthetic);
        assert_eq!(snapshot.dataset.len(), 3);
        assert_eq!(
            snapshot.advisory.map(|a| a.kind),
            Some(AdvisoryKind::SyntheticFallback)
        );
    }

    #[tokio::test]
    async fn test_initial_success_has_no_advisory() {
        let scheduler = scheduler_with(Arc::new(FixedSource));
        let snapshot = scheduler.initial_load().await;

        assert_eq!(snapshot.dataset.source(), SourceMode::Remote);
        assert!(snapshot.advisory.is_none());
    }

    #[tokio::test]
    async fn test_synthetic_mode() {
        let scheduler = RefreshScheduler::synthetic(FallbackGenerator::new(5));
        let snapshot = scheduler.initial_load().await;
        assert_eq!(snapshot.dataset.len(), 5);
        assert!(snapshot.advisory.is_none());

        scheduler.start().unwrap();
        assert!(!scheduler.is_running());

        let err = scheduler.trigger_now().await.unwrap_err();
        assert_eq!(err.to_string(), "Scheduler error: no remote source configured");
    }

    #[tokio::test]
    async fn test_initial_failure_publishes_once() {
        let scheduler = scheduler_with(Arc::new(FailingSource));

        let result = scheduler.inner.refresh(RefreshTrigger::Initial).await;
        assert!(result.is_err());
        // no advisory over the empty placeholder dataset
        let snapshot = scheduler.snapshot();
        assert!(snapshot.dataset.is_empty());
        assert!(snapshot.advisory.is_none());

        let snapshot = scheduler.initial_load().await;
        assert_eq!(snapshot.dataset.len(), 3);
        assert_eq!(
            snapshot.advisory.map(|a| a.kind),
            Some(AdvisoryKind::SyntheticFallback)
        );
    }

    #[tokio::test]
    async fn test_periodic_failure_raises() {
        let scheduler = scheduler_with(Arc::new(FailingSource));

        let _ = scheduler.inner.refresh(RefreshTrigger::Periodic).await;
        assert_eq!(
            scheduler.snapshot().advisory.map(|a| a.kind),
            Some(AdvisoryKind::RefreshFailed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_abandons_in_flight_refresh() {
        let scheduler = scheduler_with(Arc::new(SlowSource));
        let started = Instant::now();

        scheduler.start().unwrap();
        // tick fires at one interval; the fetch would take another
        tokio::time::sleep(DEFAULT_INTERVAL + Duration::from_secs(1)).await;
        scheduler.stop().await;

        assert!(started.elapsed() < DEFAULT_INTERVAL * 2);
        assert!(!scheduler.is_running());
        assert!(scheduler.snapshot().dataset.is_empty());
    }

    #[tokio::test]
    async fn test_start_twice() {
        let scheduler = scheduler_with(Arc::new(FixedSource));
        scheduler.start().unwrap();
        assert!(matches!(scheduler.start(), Err(SchedulerError::AlreadyRunning)));

        scheduler.stop().await;
        assert!(!scheduler.is_running());
    }
}
