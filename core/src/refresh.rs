use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::index::RelevanceIndex;
use crate::published::PublishedState;
use crate::RawRecord;
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Source of fresh records. Each call returns a detached batch; any error is
/// retried on the next tick.
pub trait Ingest: Send + Sync + 'static {
    fn ingest(&self) -> impl Future<Output = anyhow::Result<Vec<RawRecord>>> + Send;
}

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub interval: Duration,
    /// Consecutive failures after which failures are logged at error level.
    pub escalate_after: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(300), escalate_after: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    pub phase: RefreshPhase,
    pub consecutive_failures: u32,
    pub successful_refreshes: u64,
    pub last_error: Option<String>,
    pub last_success_at: Option<String>,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            phase: RefreshPhase::Idle,
            consecutive_failures: 0,
            successful_refreshes: 0,
            last_error: None,
            last_success_at: None,
        }
    }
}

/// Cheap read handle on the coordinator's status.
#[derive(Debug, Clone, Default)]
pub struct RefreshMonitor(Arc<Mutex<RefreshStatus>>);

impl RefreshMonitor {
    pub fn status(&self) -> RefreshStatus { self.0.lock().clone() }
}

/// Periodically ingests, rebuilds and publishes a new snapshot.
pub struct RefreshCoordinator<I> {
    source: I,
    state: PublishedState,
    config: RefreshConfig,
    monitor: RefreshMonitor,
}

impl<I: Ingest> RefreshCoordinator<I> {
    pub fn new(source: I, state: PublishedState, config: RefreshConfig) -> Self {
        Self { source, state, config, monitor: RefreshMonitor::default() }
    }

    pub fn monitor(&self) -> RefreshMonitor { self.monitor.clone() }

    /// One refresh attempt. On success returns the published generation; on
    /// failure the published state is left untouched.
    pub async fn tick(&mut self) -> Result<u64> {
        self.monitor.0.lock().phase = RefreshPhase::Refreshing;
        let outcome = self.refresh_once().await;

        let mut status = self.monitor.0.lock();
        status.phase = RefreshPhase::Idle;
        match &outcome {
            Ok(_) => {
                status.consecutive_failures = 0;
                status.successful_refreshes += 1;
                status.last_error = None;
                status.last_success_at = time::OffsetDateTime::now_utc().format(&Rfc3339).ok();
            }
            Err(e) => {
                status.consecutive_failures += 1;
                status.last_error = Some(e.to_string());
            }
        }
        outcome
    }

    async fn refresh_once(&self) -> Result<u64> {
        let raw = self.source.ingest().await.map_err(Error::Ingest)?;
        let fetched = raw.len();
        let (corpus, index, dropped) = tokio::task::spawn_blocking(move || {
            let (corpus, report) = Corpus::from_raw(raw);
            let index = RelevanceIndex::build(&corpus)?;
            Ok::<_, Error>((corpus, index, report.dropped))
        })
        .await
        .map_err(|e| Error::Build(format!("index build task failed: {e}")))??;

        let num_docs = corpus.len();
        let num_terms = index.num_terms();
        let generation = self.state.publish(corpus, index)?;
        tracing::info!(generation, fetched, dropped, num_docs, num_terms, "published refreshed corpus");
        Ok(generation)
    }

    /// Refresh on every interval tick, forever. The first tick fires immediately.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                let consecutive_failures = self.monitor.status().consecutive_failures;
                if consecutive_failures >= self.config.escalate_after {
                    tracing::error!(consecutive_failures, error = %e, "refresh failed; still serving previous corpus");
                } else {
                    tracing::warn!(consecutive_failures, error = %e, "refresh failed; will retry next tick");
                }
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
