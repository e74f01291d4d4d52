//! CLI argument definitions for stocksnap.
//!
//! Every command runs against an in-process snapshot service: one-shot
//! queries cold-start it with a single upstream fetch, `stats` and `watch`
//! go through the startup warm-up.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Look up one symbol |
//! | `search` | Substring search on symbol and company name |
//! | `trending` | Largest companies by market cap |
//! | `batch` | Look up several symbols at once |
//! | `stats` | Snapshot and refresh statistics |
//! | `watch` | Run the periodic refresh and report each period |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--ttl-secs` | `60` | Snapshot TTL |
//! | `--refresh-secs` | `60` | Refresh period |
//! | `--timeout-ms` | `10000` | Per-page request timeout |
//! | `--pages` | `4` | Pages fetched per refresh |
//! | `--page-size` | `500` | Records requested per page |
//!
//! Unset options fall back to the `STOCKSNAP_*` environment, then to the
//! built-in defaults.
//!
//! # Examples
//!
//! ```bash
//! stocksnap quote AAPL
//! stocksnap search apple --limit 5 --pretty
//! stocksnap trending --limit 10
//! stocksnap watch --refresh-secs 30 --iterations 4
//! ```

use clap::{Args, Parser, Subcommand};

/// stocksnap - in-memory stock reference data
#[derive(Debug, Parser)]
#[command(
    name = "stocksnap",
    author,
    version,
    about = "Stock reference data served from an in-memory snapshot",
    long_about = "stocksnap fetches the listed-stock screener in pages, keeps one complete \
snapshot in memory and answers lookups, searches and rankings from it.\n\
\n\
Use 'stocksnap <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Snapshot TTL in seconds (advisory freshness only).
    #[arg(long, global = true)]
    pub ttl_secs: Option<u64>,

    /// Periodic refresh interval in seconds.
    #[arg(long, global = true)]
    pub refresh_secs: Option<u64>,

    /// Per-page upstream timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Number of screener pages fetched per refresh.
    #[arg(long, global = true)]
    pub pages: Option<u32>,

    /// Records requested per screener page.
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a single symbol (case-insensitive).
    ///
    /// # Examples
    ///
    ///   stocksnap quote AAPL
    ///   stocksnap quote brk.b --pretty
    Quote(QuoteArgs),

    /// Search symbols and company names.
    ///
    /// # Examples
    ///
    ///   stocksnap search apple
    ///   stocksnap search corp --limit 3
    Search(SearchArgs),

    /// List the largest companies by market cap.
    Trending(TrendingArgs),

    /// Look up several symbols; unknown symbols are reported as warnings.
    Batch(BatchArgs),

    /// Warm the snapshot and print cache statistics.
    Stats,

    /// Keep the snapshot refreshed and log statistics every period.
    ///
    /// Runs until Ctrl-C, or for `--iterations` periods.
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Market symbol (e.g., AAPL).
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive fragment of a symbol or company name.
    pub query: String,

    /// Maximum number of results to return.
    #[arg(long, default_value_t = stocksnap_core::DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct TrendingArgs {
    /// Number of companies to return.
    #[arg(long, default_value_t = stocksnap_core::DEFAULT_TOP_COUNT)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// One or more market symbols.
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many refresh periods.
    #[arg(long)]
    pub iterations: Option<u32>,
}
