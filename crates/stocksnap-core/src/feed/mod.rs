//! Upstream feed: paginated retrieval plus per-page normalization.
//!
//! [`StockFeed`] is the seam the refresh coordinator depends on.
//! [`PagedFetcher`] is the production implementation backed by an
//! [`HttpClient`](crate::HttpClient).

mod fetcher;
pub mod normalizer;

use std::future::Future;
use std::pin::Pin;

use crate::{SnapshotError, StockRecord};

pub use fetcher::PagedFetcher;
pub use normalizer::{normalize_page, normalize_row, NormalizedPage, RawStockRow};

/// Outcome of one complete multi-page fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    /// Concatenated records of every page that succeeded, in upstream order.
    pub records: Vec<StockRecord>,
    pub pages: u32,
    pub pages_failed: u32,
    /// Records dropped by normalization or as duplicate symbols.
    pub records_skipped: usize,
}

impl FetchReport {
    /// Report for a single successful page holding `records`.
    pub fn from_records(records: Vec<StockRecord>) -> Self {
        Self {
            records,
            pages: 1,
            pages_failed: 0,
            records_skipped: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Source of complete stock lists.
///
/// Implementations must isolate page failures: an `Ok` report with zero
/// records is the "everything failed" outcome, `Err` is reserved for
/// failures outside individual pages.
pub trait StockFeed: Send + Sync {
    fn fetch_all<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<FetchReport, SnapshotError>> + Send + 'a>>;
}
