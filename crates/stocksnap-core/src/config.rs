//! Runtime configuration for the feed, the cache and the refresh schedule.
//!
//! Defaults reproduce the production screener setup (four pages of 500
//! stocks, one minute TTL and refresh period). Every value can be overridden
//! through `STOCKSNAP_*` environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `STOCKSNAP_FEED_URL` | [`FeedConfig::endpoint`] |
//! | `STOCKSNAP_PAGES` | [`FeedConfig::pages`] |
//! | `STOCKSNAP_PAGE_SIZE` | [`FeedConfig::page_size`] |
//! | `STOCKSNAP_TIMEOUT_MS` | [`FeedConfig::request_timeout`] |
//! | `STOCKSNAP_PAGES_PER_SECOND` | [`FeedConfig::pages_per_second`] |
//! | `STOCKSNAP_TTL_SECS` | [`RefreshConfig::ttl`] |
//! | `STOCKSNAP_REFRESH_SECS` | [`RefreshConfig::period`] |
//! | `STOCKSNAP_WARMUP_RETRIES` | [`RefreshConfig::warmup`] retries |

use std::str::FromStr;
use std::time::Duration;

use crate::retry::RetryConfig;
use crate::ValidationError;

pub const DEFAULT_FEED_URL: &str = "https://stockanalysis.com/api/screener/s/f";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_REFERER: &str = "https://stockanalysis.com/list/nasdaq-stocks/";

/// Upstream request shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub endpoint: String,
    /// Number of pages requested per refresh (1-based on the wire).
    pub pages: u32,
    pub page_size: u32,
    /// Comma separated screener column list.
    pub columns: String,
    pub sort_metric: String,
    pub sort_order: String,
    pub index: String,
    pub user_agent: String,
    pub referer: String,
    pub request_timeout: Duration,
    /// Pacing quota for page requests; also the burst size.
    pub pages_per_second: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from(DEFAULT_FEED_URL),
            pages: 4,
            page_size: 500,
            columns: String::from("s,n,marketCap,price,change,changep,revenue"),
            sort_metric: String::from("s"),
            sort_order: String::from("asc"),
            index: String::from("stocks"),
            user_agent: String::from(DEFAULT_USER_AGENT),
            referer: String::from(DEFAULT_REFERER),
            request_timeout: Duration::from_secs(10),
            pages_per_second: 4,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.endpoint.trim().is_empty() {
            return Err(ValidationError::InvalidConfigValue {
                field: "endpoint",
                value: self.endpoint.clone(),
            });
        }
        non_zero("pages", u64::from(self.pages))?;
        non_zero("page_size", u64::from(self.page_size))?;
        non_zero("request_timeout", self.request_timeout.as_millis() as u64)?;
        non_zero("pages_per_second", u64::from(self.pages_per_second))?;
        Ok(())
    }

    /// Upper bound of records a full fetch can return.
    pub const fn capacity(&self) -> usize {
        self.pages as usize * self.page_size as usize
    }
}

/// Cache lifetime and refresh cadence. The two durations are independent.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshConfig {
    pub ttl: Duration,
    pub period: Duration,
    /// Retry policy of the startup warm-up refresh.
    pub warmup: RetryConfig,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            period: Duration::from_secs(60),
            warmup: RetryConfig::default(),
        }
    }
}

impl RefreshConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_zero("ttl", self.ttl.as_millis() as u64)?;
        non_zero("period", self.period.as_millis() as u64)?;
        Ok(())
    }
}

/// Complete subsystem configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotConfig {
    pub feed: FeedConfig,
    pub refresh: RefreshConfig,
}

impl SnapshotConfig {
    /// Defaults overlaid with `STOCKSNAP_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values produced by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("STOCKSNAP_FEED_URL") {
            config.feed.endpoint = endpoint;
        }
        if let Some(pages) = parse_var(&lookup, "STOCKSNAP_PAGES", "pages")? {
            config.feed.pages = pages;
        }
        if let Some(size) = parse_var(&lookup, "STOCKSNAP_PAGE_SIZE", "page_size")? {
            config.feed.page_size = size;
        }
        if let Some(ms) = parse_var(&lookup, "STOCKSNAP_TIMEOUT_MS", "request_timeout")? {
            config.feed.request_timeout = Duration::from_millis(ms);
        }
        if let Some(rate) =
            parse_var(&lookup, "STOCKSNAP_PAGES_PER_SECOND", "pages_per_second")?
        {
            config.feed.pages_per_second = rate;
        }
        if let Some(secs) = parse_var(&lookup, "STOCKSNAP_TTL_SECS", "ttl")? {
            config.refresh.ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "STOCKSNAP_REFRESH_SECS", "period")? {
            config.refresh.period = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_var(&lookup, "STOCKSNAP_WARMUP_RETRIES", "warmup")? {
            config.refresh.warmup.max_retries = retries;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.feed.validate()?;
        self.refresh.validate()
    }
}

fn parse_var<F, T>(
    lookup: &F,
    key: &str,
    field: &'static str,
) -> Result<Option<T>, ValidationError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ValidationError::InvalidConfigValue { field, value: raw }),
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::ZeroConfigValue { field });
    }
    Ok(())
}
