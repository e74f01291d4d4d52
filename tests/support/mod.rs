//! Fakes shared by the behavior suites.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use stocksnap_core::{
    FeedConfig, FetchReport, HttpClient, HttpError, HttpRequest, HttpResponse, RefreshConfig,
    RetryConfig, SnapshotError, StockFeed, StockRecord, Symbol,
};
use tokio::sync::Semaphore;

pub fn record(symbol: &str, name: &str, market_cap: f64) -> StockRecord {
    StockRecord {
        symbol: Symbol::parse(symbol).expect("valid symbol"),
        company_name: name.to_owned(),
        price: 10.0,
        change: 0.1,
        percent_change: 1.0,
        market_cap,
        revenue: 0.0,
    }
}

/// `count` distinct synthetic records, `S0000`, `S0001`, ...
pub fn universe(count: usize) -> Vec<StockRecord> {
    (0..count)
        .map(|i| record(&format!("S{i:04}"), &format!("Synthetic {i}"), i as f64))
        .collect()
}

pub fn screener_row(symbol: &str, name: &str, market_cap: f64) -> Value {
    json!({
        "s": symbol,
        "n": name,
        "marketCap": market_cap,
        "price": 12.5,
        "change": -0.25,
        "changep": -1.96,
        "revenue": 1_000_000.0
    })
}

/// Screener rows for one page, numbered from `(page - 1) * size`.
pub fn screener_rows(page: u32, size: usize) -> Vec<Value> {
    let start = (page as usize - 1) * size;
    (start..start + size)
        .map(|i| screener_row(&format!("S{i:04}"), &format!("Synthetic {i}"), i as f64))
        .collect()
}

pub fn screener_body(rows: Vec<Value>) -> String {
    json!({ "status": 200, "data": { "data": rows } }).to_string()
}

pub fn feed_config(pages: u32, page_size: u32) -> FeedConfig {
    FeedConfig {
        endpoint: String::from("https://screener.test/api/screener/s/f"),
        pages,
        page_size,
        request_timeout: Duration::from_millis(500),
        pages_per_second: 100,
        ..FeedConfig::default()
    }
}

pub fn refresh_config() -> RefreshConfig {
    RefreshConfig {
        ttl: Duration::from_secs(60),
        period: Duration::from_secs(60),
        warmup: RetryConfig::fixed(Duration::from_millis(1), 1),
    }
}

/// Reply for one page of [`PageScriptClient`].
#[derive(Clone)]
pub enum PageReply {
    Respond(HttpResponse),
    Fail(HttpError),
    Hang,
}

/// HttpClient answering by the `p` query parameter and recording requests.
#[derive(Default)]
pub struct PageScriptClient {
    replies: HashMap<String, PageReply>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl PageScriptClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, reply: PageReply) -> Self {
        self.replies.insert(page.to_string(), reply);
        self
    }

    /// Every page in `1..=pages` answers with `size` synthetic rows.
    pub fn with_full_pages(mut self, pages: u32, size: usize) -> Self {
        for page in 1..=pages {
            let body = screener_body(screener_rows(page, size));
            self.replies
                .insert(page.to_string(), PageReply::Respond(HttpResponse::ok_json(body)));
        }
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request log lock is not poisoned")
            .clone()
    }
}

impl HttpClient for PageScriptClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let reply = request
            .query_param("p")
            .and_then(|page| self.replies.get(page))
            .cloned()
            .unwrap_or_else(|| PageReply::Respond(HttpResponse::with_status(404, "")));
        self.requests
            .lock()
            .expect("request log lock is not poisoned")
            .push(request);

        Box::pin(async move {
            match reply {
                PageReply::Respond(response) => Ok(response),
                PageReply::Fail(error) => Err(error),
                PageReply::Hang => std::future::pending().await,
            }
        })
    }
}

/// StockFeed replaying scripted results; the last one repeats. Each fetch
/// can be held at a gate until the test releases it.
pub struct ScriptedFeed {
    script: Mutex<VecDeque<Result<FetchReport, SnapshotError>>>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new(script: Vec<Result<FetchReport, SnapshotError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fetches block until [`release`](Self::release) is called.
    pub fn gated(script: Vec<Result<FetchReport, SnapshotError>>) -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new(script)
        }
    }

    pub fn release(&self, fetches: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(fetches);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_result(&self) -> Result<FetchReport, SnapshotError> {
        let mut script = self.script.lock().expect("script lock is not poisoned");
        if script.len() > 1 {
            script.pop_front().unwrap_or_else(|| Ok(FetchReport::default()))
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(FetchReport::default()))
        }
    }
}

impl StockFeed for ScriptedFeed {
    fn fetch_all<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<FetchReport, SnapshotError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate is never closed").forget();
            }
            self.next_result()
        })
    }
}

/// Let spawned tasks run on the current-thread runtime.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
