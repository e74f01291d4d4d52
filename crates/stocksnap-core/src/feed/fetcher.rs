use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::feed::normalizer::{normalize_page, NormalizedPage};
use crate::feed::{FetchReport, StockFeed};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::throttling::PageThrottle;
use crate::{PageError, SnapshotError, ValidationError};

/// Sequential paginated screener client.
#[derive(Clone)]
pub struct PagedFetcher {
    config: FeedConfig,
    http_client: Arc<dyn HttpClient>,
    throttle: PageThrottle,
}

impl PagedFetcher {
    pub fn new(config: FeedConfig, http_client: Arc<dyn HttpClient>) -> Result<Self, ValidationError> {
        config.validate()?;
        let throttle = PageThrottle::per_second(config.pages_per_second);
        Ok(Self {
            config,
            http_client,
            throttle,
        })
    }

    /// Fetcher backed by the production reqwest transport.
    pub fn with_reqwest(config: FeedConfig) -> Result<Self, ValidationError> {
        Self::new(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Request for a 1-based page index. Only `p` varies between pages.
    pub fn page_request(&self, page: u32) -> HttpRequest {
        let config = &self.config;
        HttpRequest::get(&config.endpoint)
            .with_header("User-Agent", &config.user_agent)
            .with_header("Accept", "application/json")
            .with_header("Referer", &config.referer)
            .with_query("m", &config.sort_metric)
            .with_query("s", &config.sort_order)
            .with_query("c", &config.columns)
            .with_query("cn", config.page_size.to_string())
            .with_query("p", page.to_string())
            .with_query("i", &config.index)
            .with_timeout_ms(config.request_timeout.as_millis() as u64)
    }

    /// Fetch and normalize a single page.
    pub async fn fetch_page(&self, page: u32) -> Result<NormalizedPage, PageError> {
        self.throttle.acquire().await;

        let request = self.page_request(page);
        debug!(page, url = %request.full_url(), "requesting screener page");

        let timeout = self.config.request_timeout;
        let response = tokio::time::timeout(timeout, self.http_client.execute(request))
            .await
            .map_err(|_| PageError::Timeout {
                page,
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|source| {
                if source.is_timeout() {
                    PageError::Timeout {
                        page,
                        timeout_ms: timeout.as_millis() as u64,
                    }
                } else {
                    PageError::Transport { page, source }
                }
            })?;

        if !response.is_success() {
            return Err(PageError::Status {
                page,
                status: response.status,
            });
        }

        let payload: Value =
            serde_json::from_str(&response.body).map_err(|error| PageError::Decode {
                page,
                message: error.to_string(),
            })?;

        let rows = payload
            .get("data")
            .and_then(|data| data.get("data"))
            .and_then(Value::as_array)
            .ok_or(PageError::MissingData { page })?;

        Ok(normalize_page(rows))
    }

    async fn fetch_pages(&self) -> FetchReport {
        let started = Instant::now();
        let pages = self.config.pages;
        let mut report = FetchReport {
            records: Vec::with_capacity(self.config.capacity()),
            pages,
            pages_failed: 0,
            records_skipped: 0,
        };
        let mut seen = HashSet::with_capacity(self.config.capacity());

        for page in 1..=pages {
            match self.fetch_page(page).await {
                Ok(normalized) => {
                    for error in &normalized.errors {
                        debug!(page, %error, "skipping screener record");
                    }
                    if !normalized.errors.is_empty() {
                        warn!(
                            page,
                            skipped = normalized.errors.len(),
                            "screener page contained unusable records"
                        );
                    }
                    report.records_skipped += normalized.errors.len();

                    let mut accepted = 0_usize;
                    for record in normalized.records {
                        if seen.insert(record.symbol.as_str().to_ascii_uppercase()) {
                            report.records.push(record);
                            accepted += 1;
                        } else {
                            debug!(page, symbol = %record.symbol, "dropping duplicate symbol");
                            report.records_skipped += 1;
                        }
                    }
                    debug!(page, pages, records = accepted, "screener page fetched");
                }
                Err(error) => {
                    report.pages_failed += 1;
                    warn!(page, pages, %error, "screener page failed; continuing with remaining pages");
                }
            }
        }

        info!(
            records = report.records.len(),
            pages,
            pages_failed = report.pages_failed,
            skipped = report.records_skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "screener fetch finished"
        );
        report
    }
}

impl StockFeed for PagedFetcher {
    fn fetch_all<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<FetchReport, SnapshotError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.fetch_pages().await) })
    }
}

impl std::fmt::Debug for PagedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
