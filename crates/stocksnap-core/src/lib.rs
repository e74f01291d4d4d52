//! # Stocksnap Core
//!
//! In-memory reference data for the listed-stock universe.
//!
//! ## Overview
//!
//! This crate keeps one complete snapshot of roughly two thousand stocks in
//! memory and answers every query from it:
//!
//! - **Paged fetcher** pulling the screener feed page by page
//! - **Normalizer** turning loose upstream rows into [`StockRecord`]s
//! - **Snapshot store** holding the current [`Snapshot`] with an advisory TTL
//! - **Refresh coordinator** guaranteeing at most one fetch in flight
//! - **Scheduler** firing periodic refreshes
//! - **Query surface** for lookup, search, ranking and batch lookup
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Snapshot store and store statistics |
//! | [`config`] | Feed, TTL and refresh configuration (`STOCKSNAP_*`) |
//! | [`domain`] | Domain models (Symbol, StockRecord, Snapshot) |
//! | [`error`] | Core error types |
//! | [`feed`] | Paged fetcher, normalizer and the `StockFeed` seam |
//! | [`http_client`] | HTTP client abstraction |
//! | [`query`] | `StockService` and pure query helpers |
//! | [`refresh`] | Single-flight refresh coordinator |
//! | [`retry`] | Backoff for the startup warm-up |
//! | [`scheduler`] | Periodic refresh timer |
//! | [`throttling`] | Page request pacing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stocksnap_core::{SnapshotConfig, StockService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = StockService::from_config(SnapshotConfig::from_env()?)?;
//!     let (_warmup, scheduler) = service.start().await;
//!
//!     if let Some(stock) = service.lookup("aapl").await? {
//!         println!("{} trades at ${:.2}", stock.company_name, stock.price);
//!     }
//!
//!     scheduler.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │  CLI / Caller   │────▶│  StockService    │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │ read / cold start
//!                                  ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ RefreshScheduler│────▶│ Refresh          │
//! │ (interval)      │     │ Coordinator      │
//! └─────────────────┘     └───┬──────────┬───┘
//!                             │          │ set
//!                             ▼          ▼
//!                 ┌──────────────┐  ┌──────────────┐
//!                 │ PagedFetcher │  │ SnapshotStore│
//!                 │ + Normalizer │  │ (Arc swap)   │
//!                 └──────┬───────┘  └──────────────┘
//!                        ▼
//!                 ┌──────────────┐
//!                 │ HttpClient   │
//!                 │ (reqwest)    │
//!                 └──────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Page level failures are isolated inside the fetcher. Callers only see
//! [`SnapshotError`]:
//!
//! ```rust
//! use stocksnap_core::SnapshotError;
//!
//! fn describe(error: &SnapshotError) -> &'static str {
//!     match error {
//!         SnapshotError::ColdStartUnavailable => "try again shortly",
//!         SnapshotError::InvalidRequest(_) => "fix the request",
//!         _ => "internal failure",
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod http_client;
pub mod query;
pub mod refresh;
pub mod retry;
pub mod scheduler;
pub mod throttling;

// Caching
pub use cache::{SnapshotStore, StoreStats};

// Configuration
pub use config::{FeedConfig, RefreshConfig, SnapshotConfig, DEFAULT_FEED_URL};

// Domain models
pub use domain::{Snapshot, StockRecord, Symbol, UtcDateTime};

// Error types
pub use error::{NormalizationError, PageError, SnapshotError, ValidationError};

// Feed pipeline
pub use feed::{FetchReport, NormalizedPage, PagedFetcher, RawStockRow, StockFeed};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Query surface
pub use query::{CacheStats, StockService, DEFAULT_SEARCH_LIMIT, DEFAULT_TOP_COUNT};

// Refresh coordination
pub use refresh::{
    RefreshCoordinator, RefreshCounters, RefreshOutcome, RefreshState, RefreshTrigger,
    TriggerOutcome,
};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Scheduling
pub use scheduler::{RefreshScheduler, SchedulerHandle};

// Throttling
pub use throttling::PageThrottle;
