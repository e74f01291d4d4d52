//! In-memory snapshot store.
//!
//! Holds at most one [`Snapshot`] behind an `Arc`. Replacement swaps the
//! `Arc`, so a reader either sees the complete previous snapshot or the
//! complete new one. Entries never expire on their own: the TTL only decides
//! whether a snapshot is reported as fresh.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::{Snapshot, UtcDateTime};

#[derive(Debug)]
struct CacheInner {
    current: Option<Arc<Snapshot>>,
    ttl: Duration,
}

/// Point-in-time view of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub present: bool,
    pub record_count: usize,
    pub captured_at: Option<UtcDateTime>,
    pub ttl_seconds: u64,
    /// Advisory only; stale snapshots are still served.
    pub fresh: bool,
    pub age_seconds: Option<u64>,
}

/// Thread-safe holder of the current snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl SnapshotStore {
    /// Create an empty store with a fixed TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner { current: None, ttl })),
        }
    }

    /// Create an empty store with a default TTL of one minute.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(60))
    }

    /// Current snapshot, stale or not. Never performs I/O.
    pub async fn get(&self) -> Option<Arc<Snapshot>> {
        let store = self.inner.read().await;
        store.current.clone()
    }

    /// Atomically replace the whole snapshot.
    pub async fn set(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut store = self.inner.write().await;
        store.current = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Drop the snapshot; the next query cold-starts.
    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.current = None;
    }

    pub async fn is_present(&self) -> bool {
        let store = self.inner.read().await;
        store.current.is_some()
    }

    /// Whether a snapshot exists and is younger than the TTL.
    pub async fn is_fresh(&self) -> bool {
        let store = self.inner.read().await;
        store
            .current
            .as_ref()
            .map(|snapshot| snapshot.is_fresh(store.ttl))
            .unwrap_or(false)
    }

    pub async fn ttl(&self) -> Duration {
        let store = self.inner.read().await;
        store.ttl
    }

    pub async fn stats(&self) -> StoreStats {
        let store = self.inner.read().await;
        let ttl_seconds = whole_seconds_rounded_up(store.ttl);
        match &store.current {
            Some(snapshot) => StoreStats {
                present: true,
                record_count: snapshot.len(),
                captured_at: Some(snapshot.timestamp()),
                ttl_seconds,
                fresh: snapshot.is_fresh(store.ttl),
                age_seconds: Some(snapshot.age().as_secs()),
            },
            None => StoreStats {
                present: false,
                record_count: 0,
                captured_at: None,
                ttl_seconds,
                fresh: false,
                age_seconds: None,
            },
        }
    }
}

/// Sub-second TTLs are valid, so they report as one second rather than zero.
fn whole_seconds_rounded_up(ttl: Duration) -> u64 {
    ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0))
}
