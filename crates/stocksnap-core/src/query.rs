//! Read-side operations over the current snapshot.
//!
//! [`StockService`] is the outward-facing API. Every query reads the
//! snapshot held in the store and never triggers upstream I/O, except the
//! cold-start path when no snapshot has ever been installed. Stale snapshots
//! are served as-is.
//!
//! The pure helpers ([`find_symbol`], [`search_records`], [`top_by_market_cap`],
//! [`batch_lookup`]) operate on a record slice and are exposed for callers
//! that already hold a [`Snapshot`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::{SnapshotStore, StoreStats};
use crate::config::{RefreshConfig, SnapshotConfig};
use crate::feed::{PagedFetcher, StockFeed};
use crate::refresh::{
    RefreshCoordinator, RefreshCounters, RefreshOutcome, RefreshState, RefreshTrigger,
    TriggerOutcome,
};
use crate::scheduler::{RefreshScheduler, SchedulerHandle};
use crate::{Snapshot, SnapshotError, StockRecord, ValidationError};

/// Limit applied by callers that do not pass one to [`StockService::search`].
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
/// Count applied by callers that do not pass one to [`StockService::top_by_market_cap`].
pub const DEFAULT_TOP_COUNT: usize = 30;

/// Store state plus refresh bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    #[serde(flatten)]
    pub store: StoreStats,
    pub refreshing: bool,
    pub refreshes: RefreshCounters,
}

/// Query facade over a refresh coordinator and its store.
#[derive(Debug, Clone)]
pub struct StockService {
    coordinator: RefreshCoordinator,
    refresh: RefreshConfig,
}

impl StockService {
    pub fn new(feed: Arc<dyn StockFeed>, refresh: RefreshConfig) -> Self {
        let store = SnapshotStore::new(refresh.ttl);
        Self {
            coordinator: RefreshCoordinator::new(feed, store),
            refresh,
        }
    }

    /// Production wiring: a reqwest-backed [`PagedFetcher`].
    pub fn from_config(config: SnapshotConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let fetcher = PagedFetcher::with_reqwest(config.feed)?;
        Ok(Self::new(Arc::new(fetcher), config.refresh))
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn refresh_config(&self) -> &RefreshConfig {
        &self.refresh
    }

    /// Startup warm-up followed by the periodic timer.
    pub async fn start(&self) -> (RefreshOutcome, SchedulerHandle) {
        let outcome = self.coordinator.warm_up(&self.refresh.warmup).await;
        let handle = RefreshScheduler::spawn(self.coordinator.clone(), self.refresh.period);
        (outcome, handle)
    }

    /// Timer only, without the warm-up.
    pub fn spawn_scheduler(&self, period: Duration) -> SchedulerHandle {
        RefreshScheduler::spawn(self.coordinator.clone(), period)
    }

    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, SnapshotError> {
        self.coordinator.ensure_snapshot().await
    }

    pub async fn lookup(&self, symbol: &str) -> Result<Option<StockRecord>, SnapshotError> {
        let snapshot = self.snapshot().await?;
        Ok(find_symbol(snapshot.records(), symbol).cloned())
    }

    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StockRecord>, SnapshotError> {
        let needle = query.trim();
        if needle.is_empty() {
            return Err(SnapshotError::invalid_request("search query must not be empty"));
        }
        if limit == 0 {
            return Err(SnapshotError::invalid_request("search limit must be positive"));
        }

        let snapshot = self.snapshot().await?;
        let matches = search_records(snapshot.records(), needle, limit);
        debug!(query = needle, limit, matches = matches.len(), "search");
        Ok(matches)
    }

    pub async fn top_by_market_cap(&self, count: usize) -> Result<Vec<StockRecord>, SnapshotError> {
        let snapshot = self.snapshot().await?;
        Ok(top_by_market_cap(snapshot.records(), count))
    }

    /// Found records in input order. Unknown symbols are omitted.
    pub async fn batch<S>(&self, symbols: &[S]) -> Result<Vec<StockRecord>, SnapshotError>
    where
        S: AsRef<str>,
    {
        if symbols.is_empty() {
            return Err(SnapshotError::invalid_request("batch requires at least one symbol"));
        }

        let snapshot = self.snapshot().await?;
        let found = batch_lookup(snapshot.records(), symbols);
        debug!(requested = symbols.len(), found = found.len(), "batch lookup");
        Ok(found)
    }

    /// Fire-and-forget refresh; coalesced when one is already running.
    pub fn refresh_now(&self) -> TriggerOutcome {
        self.coordinator.trigger(RefreshTrigger::Manual)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        CacheStats {
            store: self.coordinator.store().stats().await,
            refreshing: self.coordinator.state() == RefreshState::Fetching,
            refreshes: self.coordinator.counters(),
        }
    }

    /// Drop the snapshot; the next query cold-starts.
    pub async fn clear(&self) {
        self.coordinator.store().clear().await;
    }
}

/// Exact, case-insensitive symbol match. First match wins.
pub fn find_symbol<'a>(records: &'a [StockRecord], symbol: &str) -> Option<&'a StockRecord> {
    records.iter().find(|record| record.symbol.matches(symbol))
}

/// Case-insensitive substring match on symbol or company name, in snapshot
/// order, truncated to `limit`.
pub fn search_records(records: &[StockRecord], query: &str, limit: usize) -> Vec<StockRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| record.matches_query(&needle))
        .take(limit)
        .cloned()
        .collect()
}

/// Records sorted by market cap descending. The sort is stable, so ties keep
/// snapshot order.
pub fn top_by_market_cap(records: &[StockRecord], count: usize) -> Vec<StockRecord> {
    if count == 0 {
        return Vec::new();
    }

    let mut ranked = records.iter().collect::<Vec<_>>();
    ranked.sort_by(|left, right| right.market_cap.total_cmp(&left.market_cap));
    ranked.into_iter().take(count).cloned().collect()
}

pub fn batch_lookup<S>(records: &[StockRecord], symbols: &[S]) -> Vec<StockRecord>
where
    S: AsRef<str>,
{
    symbols
        .iter()
        .filter_map(|symbol| find_symbol(records, symbol.as_ref()).cloned())
        .collect()
}
