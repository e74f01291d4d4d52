//! Contract tests for the paged screener fetcher.
//!
//! The fetcher is exercised against a scripted HttpClient so every page
//! outcome (success, transport failure, bad status, malformed body, hang)
//! can be pinned down without network access.

#[path = "../support/mod.rs"]
mod support;

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use stocksnap_core::{HttpError, HttpResponse, PagedFetcher, StockFeed};
use support::{feed_config, screener_body, screener_row, PageReply, PageScriptClient};

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn when_fetching_all_pages_system_sends_identical_requests_except_page_index() {
    // Given: four healthy pages of 500 rows
    let client = Arc::new(PageScriptClient::new().with_full_pages(4, 500));
    let fetcher = PagedFetcher::new(feed_config(4, 500), client.clone()).expect("valid config");

    // When: a full fetch runs
    let report = fetcher.fetch_all().await.expect("fetch never errors");

    // Then: pages 1..=4 are requested in order with the screener parameters
    let requests = client.requests();
    assert_eq!(requests.len(), 4);
    let pages = requests
        .iter()
        .map(|r| r.query_param("p").expect("page param").to_owned())
        .collect::<Vec<_>>();
    assert_eq!(pages, vec!["1", "2", "3", "4"]);

    for request in &requests {
        assert_eq!(request.url, "https://screener.test/api/screener/s/f");
        assert_eq!(request.query_param("m"), Some("s"));
        assert_eq!(request.query_param("s"), Some("asc"));
        assert_eq!(
            request.query_param("c"),
            Some("s,n,marketCap,price,change,changep,revenue")
        );
        assert_eq!(request.query_param("cn"), Some("500"));
        assert_eq!(request.query_param("i"), Some("stocks"));
        assert_eq!(
            request.headers.get("accept").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(
            request.headers.get("referer").map(String::as_str),
            Some("https://stockanalysis.com/list/nasdaq-stocks/")
        );
        assert!(request.headers.contains_key("user-agent"));
        assert_eq!(request.timeout_ms, 500);
    }

    // And: every headers map is the same across pages
    let distinct_headers = requests
        .iter()
        .map(|r| format!("{:?}", r.headers))
        .collect::<HashSet<_>>();
    assert_eq!(distinct_headers.len(), 1);

    assert_eq!(report.records.len(), 2000);
    assert_eq!(report.pages, 4);
    assert_eq!(report.pages_failed, 0);
}

#[test]
fn when_building_a_page_request_system_encodes_the_column_list() {
    let client = Arc::new(PageScriptClient::new());
    let fetcher = PagedFetcher::new(feed_config(4, 500), client).expect("valid config");

    let url = fetcher.page_request(3).full_url();

    assert!(url.starts_with("https://screener.test/api/screener/s/f?m=s&s=asc&c="));
    assert!(url.contains("c=s%2Cn%2CmarketCap%2Cprice%2Cchange%2Cchangep%2Crevenue"));
    assert!(url.contains("&p=3&"));
}

// =============================================================================
// Page isolation
// =============================================================================

#[tokio::test]
async fn when_one_page_fails_system_keeps_the_other_pages_in_order() {
    // Given: page 2 fails at the transport
    let client = Arc::new(
        PageScriptClient::new()
            .with_full_pages(4, 500)
            .with_page(2, PageReply::Fail(HttpError::new("connection reset"))),
    );
    let fetcher = PagedFetcher::new(feed_config(4, 500), client.clone()).expect("valid config");

    // When
    let report = fetcher.fetch_all().await.expect("fetch never errors");

    // Then: pages 1, 3, 4 are concatenated in page order
    assert_eq!(client.requests().len(), 4, "a failed page does not abort the loop");
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.records.len(), 1500);
    assert_eq!(report.records[0].symbol.as_str(), "S0000");
    assert_eq!(report.records[499].symbol.as_str(), "S0499");
    assert_eq!(report.records[500].symbol.as_str(), "S1000");
    assert_eq!(report.records[1499].symbol.as_str(), "S1999");
}

#[tokio::test]
async fn when_every_page_fails_system_returns_an_empty_report() {
    let client = Arc::new(
        PageScriptClient::new()
            .with_page(1, PageReply::Respond(HttpResponse::with_status(503, "")))
            .with_page(2, PageReply::Respond(HttpResponse::ok_json("not json")))
            .with_page(3, PageReply::Respond(HttpResponse::ok_json("{\"status\":200}")))
            .with_page(4, PageReply::Fail(HttpError::new("dns failure"))),
    );
    let fetcher = PagedFetcher::new(feed_config(4, 500), client).expect("valid config");

    let report = fetcher.fetch_all().await.expect("fetch never errors");

    assert!(report.is_empty());
    assert_eq!(report.pages_failed, 4);
}

#[tokio::test(start_paused = true)]
async fn when_a_page_hangs_system_times_it_out_and_continues() {
    // Given: page 2 never answers
    let client = Arc::new(
        PageScriptClient::new()
            .with_full_pages(3, 10)
            .with_page(2, PageReply::Hang),
    );
    let fetcher = PagedFetcher::new(feed_config(3, 10), client.clone()).expect("valid config");

    // When
    let report = fetcher.fetch_all().await.expect("fetch never errors");

    // Then: the timeout counts as a failed page, page 3 is still fetched
    assert_eq!(client.requests().len(), 3);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.records.len(), 20);
}

// =============================================================================
// Normalization through the fetcher
// =============================================================================

#[tokio::test]
async fn when_rows_are_incomplete_system_defaults_numbers_and_skips_symbolless_rows() {
    let rows = vec![
        json!({ "s": "AAPL", "n": "Apple Inc.", "marketCap": 3.0e12, "price": 190.5 }),
        json!({ "n": "No Symbol Corp" }),
        json!({ "s": "", "n": "Empty Symbol Corp" }),
        json!({ "s": "MSFT" }),
        screener_row("NVDA", "NVIDIA Corporation", 2.2e12),
    ];
    let client = Arc::new(PageScriptClient::new().with_page(
        1,
        PageReply::Respond(HttpResponse::ok_json(screener_body(rows))),
    ));
    let fetcher = PagedFetcher::new(feed_config(1, 500), client).expect("valid config");

    let report = fetcher.fetch_all().await.expect("fetch never errors");

    let symbols = report
        .records
        .iter()
        .map(|r| r.symbol.as_str())
        .collect::<Vec<_>>();
    assert_eq!(symbols, vec!["AAPL", "MSFT", "NVDA"]);
    assert_eq!(report.records_skipped, 2);

    let apple = &report.records[0];
    assert_eq!(apple.price, 190.5);
    assert_eq!(apple.change, 0.0);
    assert_eq!(apple.percent_change, 0.0);
    assert_eq!(apple.revenue, 0.0);

    let microsoft = &report.records[1];
    assert_eq!(microsoft.company_name, "");
    assert_eq!(microsoft.market_cap, 0.0);
}

#[tokio::test]
async fn when_a_symbol_repeats_across_pages_system_keeps_the_first_occurrence() {
    let client = Arc::new(
        PageScriptClient::new()
            .with_page(
                1,
                PageReply::Respond(HttpResponse::ok_json(screener_body(vec![screener_row(
                    "AAPL", "Apple Inc.", 3.0e12,
                )]))),
            )
            .with_page(
                2,
                PageReply::Respond(HttpResponse::ok_json(screener_body(vec![
                    screener_row("AAPL", "Apple Duplicate", 1.0),
                    screener_row("MSFT", "Microsoft Corporation", 2.9e12),
                ]))),
            ),
    );
    let fetcher = PagedFetcher::new(feed_config(2, 500), client).expect("valid config");

    let report = fetcher.fetch_all().await.expect("fetch never errors");

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].company_name, "Apple Inc.");
    assert_eq!(report.records_skipped, 1);
}
