//! Single-flight refresh coordination.
//!
//! The coordinator is the only writer of the [`SnapshotStore`]. It moves
//! between `Idle` and `Fetching`; any trigger that arrives while a fetch is
//! running is dropped. A snapshot is installed only when the feed returns at
//! least one record, so a failed refresh leaves the previous snapshot in place.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cache::SnapshotStore;
use crate::feed::StockFeed;
use crate::retry::RetryConfig;
use crate::{Snapshot, SnapshotError};

/// What caused a refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    Timer,
    Manual,
    ColdStart,
    Warmup,
}

impl RefreshTrigger {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Manual => "manual",
            Self::ColdStart => "cold_start",
            Self::Warmup => "warmup",
        }
    }
}

impl Display for RefreshTrigger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    Idle,
    Fetching,
}

/// Result of a fire-and-forget trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new fetch was started in the background.
    Started,
    /// A fetch was already running; this trigger was dropped.
    Coalesced,
}

/// Result of a refresh cycle run by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Installed { records: usize, pages_failed: u32 },
    Failed(SnapshotError),
    /// Another cycle was already in flight; nothing was run.
    Coalesced,
}

impl RefreshOutcome {
    pub const fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

/// Lifetime counters of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshCounters {
    pub succeeded: u64,
    pub failed: u64,
    pub coalesced: u64,
}

struct CoordinatorInner {
    feed: Arc<dyn StockFeed>,
    store: SnapshotStore,
    in_flight: AtomicBool,
    /// Bumped after every finished cycle, once `in_flight` is cleared.
    completed: watch::Sender<u64>,
    succeeded: AtomicU64,
    failed: AtomicU64,
    coalesced: AtomicU64,
}

/// Releases the single-flight flag and wakes waiters when dropped, including
/// when the owning future is cancelled.
struct FlightGuard {
    inner: Arc<CoordinatorInner>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.store(false, Ordering::Release);
        self.inner
            .completed
            .send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

/// Cloneable handle to the refresh state machine.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl RefreshCoordinator {
    pub fn new(feed: Arc<dyn StockFeed>, store: SnapshotStore) -> Self {
        let (completed, _) = watch::channel(0_u64);
        Self {
            inner: Arc::new(CoordinatorInner {
                feed,
                store,
                in_flight: AtomicBool::new(false),
                completed,
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
            }),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }

    pub fn state(&self) -> RefreshState {
        if self.inner.in_flight.load(Ordering::Acquire) {
            RefreshState::Fetching
        } else {
            RefreshState::Idle
        }
    }

    pub fn counters(&self) -> RefreshCounters {
        RefreshCounters {
            succeeded: self.inner.succeeded.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            coalesced: self.inner.coalesced.load(Ordering::Relaxed),
        }
    }

    /// Fire-and-forget trigger. Must be called from within a tokio runtime.
    pub fn trigger(&self, trigger: RefreshTrigger) -> TriggerOutcome {
        match self.try_begin() {
            Some(guard) => {
                let coordinator = self.clone();
                tokio::spawn(async move {
                    coordinator.run_cycle(guard, trigger).await;
                });
                TriggerOutcome::Started
            }
            None => {
                self.record_coalesced(trigger);
                TriggerOutcome::Coalesced
            }
        }
    }

    /// Run a cycle on the caller's task, or report `Coalesced` when one is
    /// already running.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> RefreshOutcome {
        match self.try_begin() {
            Some(guard) => self.run_cycle(guard, trigger).await,
            None => {
                self.record_coalesced(trigger);
                RefreshOutcome::Coalesced
            }
        }
    }

    /// Resolve once no cycle is in flight.
    pub async fn wait_idle(&self) {
        let mut completed = self.inner.completed.subscribe();
        while self.inner.in_flight.load(Ordering::Acquire) {
            if completed.changed().await.is_err() {
                return;
            }
        }
    }

    /// Current snapshot, fetching only when none was ever installed.
    ///
    /// The cold-start fetch runs on its own task and every cold-start caller
    /// waits for it, so dropping one caller does not abort the shared fetch.
    pub async fn ensure_snapshot(&self) -> Result<Arc<Snapshot>, SnapshotError> {
        if let Some(snapshot) = self.inner.store.get().await {
            return Ok(snapshot);
        }

        // Subscribe before probing the flag so a completion cannot slip between.
        let mut completed = self.inner.completed.subscribe();
        match self.try_begin() {
            Some(guard) => {
                if let Some(snapshot) = self.inner.store.get().await {
                    return Ok(snapshot);
                }
                info!("snapshot store is empty; fetching on cold start");
                let coordinator = self.clone();
                tokio::spawn(async move {
                    coordinator.run_cycle(guard, RefreshTrigger::ColdStart).await;
                });
            }
            None => debug!("cold start waiting for in-flight refresh"),
        }

        // A completion from an earlier cycle can arrive first; keep waiting
        // while a cycle is still running and nothing has been installed.
        loop {
            if completed.changed().await.is_err() {
                break;
            }
            if self.inner.store.is_present().await
                || !self.inner.in_flight.load(Ordering::Acquire)
            {
                break;
            }
        }

        self.inner
            .store
            .get()
            .await
            .ok_or(SnapshotError::ColdStartUnavailable)
    }

    /// Startup load retried with backoff. Leaves the store empty when every
    /// attempt fails; queries then cold-start and the timer keeps retrying.
    pub async fn warm_up(&self, policy: &RetryConfig) -> RefreshOutcome {
        let attempts = policy.attempts();
        let mut last = RefreshOutcome::Coalesced;

        for attempt in 0..attempts {
            let outcome = self.refresh(RefreshTrigger::Warmup).await;
            match &outcome {
                RefreshOutcome::Installed { .. } => return outcome,
                RefreshOutcome::Coalesced => {
                    self.wait_idle().await;
                    if self.inner.store.is_present().await {
                        return outcome;
                    }
                }
                RefreshOutcome::Failed(error) => {
                    warn!(attempt = attempt + 1, attempts, %error, "warm-up refresh failed");
                }
            }
            last = outcome;

            if attempt + 1 < attempts {
                tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
            }
        }

        warn!(attempts, "warm-up exhausted; first query will pay the cold start");
        last
    }

    fn try_begin(&self) -> Option<FlightGuard> {
        self.inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                inner: Arc::clone(&self.inner),
            })
    }

    fn record_coalesced(&self, trigger: RefreshTrigger) {
        self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
        debug!(%trigger, "refresh already in flight; trigger dropped");
    }

    async fn run_cycle(&self, guard: FlightGuard, trigger: RefreshTrigger) -> RefreshOutcome {
        let run_id = Uuid::new_v4();
        let span = info_span!("refresh", %run_id, %trigger);

        async move {
            let started = Instant::now();
            let outcome = match self.inner.feed.fetch_all().await {
                Ok(report) if !report.is_empty() => {
                    let pages_failed = report.pages_failed;
                    match Snapshot::new(report.records) {
                        Ok(snapshot) => {
                            let installed = self.inner.store.set(snapshot).await;
                            RefreshOutcome::Installed {
                                records: installed.len(),
                                pages_failed,
                            }
                        }
                        Err(error) => RefreshOutcome::Failed(error.into()),
                    }
                }
                Ok(report) => RefreshOutcome::Failed(SnapshotError::EmptyFetch {
                    pages: report.pages,
                    pages_failed: report.pages_failed,
                }),
                Err(error) => RefreshOutcome::Failed(error),
            };

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &outcome {
                RefreshOutcome::Installed {
                    records,
                    pages_failed,
                } => {
                    self.inner.succeeded.fetch_add(1, Ordering::Relaxed);
                    info!(records, pages_failed, elapsed_ms, "snapshot installed");
                }
                RefreshOutcome::Failed(error) => {
                    self.inner.failed.fetch_add(1, Ordering::Relaxed);
                    error!(code = error.code(), %error, elapsed_ms, "refresh failed; keeping previous snapshot");
                }
                RefreshOutcome::Coalesced => {}
            }

            drop(guard);
            outcome
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("state", &self.state())
            .field("counters", &self.counters())
            .finish_non_exhaustive()
    }
}
