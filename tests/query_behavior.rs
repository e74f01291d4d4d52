//! Behavior-driven tests for the query surface.
//!
//! These tests verify lookup, search, ranking and batch semantics as seen by
//! callers of `StockService`.

mod support;

use std::sync::Arc;

use stocksnap_core::{
    FetchReport, SnapshotError, StockRecord, StockService, DEFAULT_SEARCH_LIMIT,
    DEFAULT_TOP_COUNT,
};
use support::{record, refresh_config, universe, ScriptedFeed};

fn service_with(records: Vec<StockRecord>) -> (StockService, Arc<ScriptedFeed>) {
    let feed = Arc::new(ScriptedFeed::new(vec![Ok(FetchReport::from_records(
        records,
    ))]));
    (StockService::new(feed.clone(), refresh_config()), feed)
}

fn symbols(records: &[StockRecord]) -> Vec<&str> {
    records.iter().map(|r| r.symbol.as_str()).collect()
}

fn market() -> Vec<StockRecord> {
    vec![
        record("AAPL", "Apple Inc.", 3.4e12),
        record("MSFT", "Microsoft Corporation", 3.1e12),
        record("MAPP", "Mapp Digital Holdings", 1.2e9),
        record("NVDA", "NVIDIA Corporation", 2.9e12),
        record("BRK.B", "Berkshire Hathaway Inc.", 9.0e11),
    ]
}

// =============================================================================
// Query: lookup
// =============================================================================

#[tokio::test]
async fn when_symbol_case_differs_system_still_finds_the_record() {
    let (service, _) = service_with(market());

    let upper = service.lookup("AAPL").await.expect("lookup");
    let lower = service.lookup("aapl").await.expect("lookup");
    let dotted = service.lookup("brk.b").await.expect("lookup");

    assert_eq!(upper, lower);
    assert_eq!(upper.expect("found").company_name, "Apple Inc.");
    assert_eq!(dotted.expect("found").symbol.as_str(), "BRK.B");
}

#[tokio::test]
async fn when_symbol_is_unknown_system_returns_absent_not_error() {
    let (service, _) = service_with(market());

    let missing = service.lookup("ZZZZ").await.expect("lookup succeeds");

    assert!(missing.is_none());
}

// =============================================================================
// Query: search
// =============================================================================

#[tokio::test]
async fn when_searching_system_matches_symbol_or_name_in_snapshot_order() {
    let (service, _) = service_with(market());

    let found = service.search("app", DEFAULT_SEARCH_LIMIT).await.expect("search");

    assert_eq!(symbols(&found), vec!["AAPL", "MAPP"]);
}

#[tokio::test]
async fn when_search_has_more_matches_than_limit_system_truncates() {
    let (service, _) = service_with(market());

    let found = service.search("CORPORATION", 1).await.expect("search");

    assert_eq!(symbols(&found), vec!["MSFT"]);
}

#[tokio::test]
async fn when_search_input_is_invalid_system_rejects_it() {
    let (service, feed) = service_with(market());

    let empty = service.search("   ", 10).await.expect_err("empty query");
    let zero = service.search("app", 0).await.expect_err("zero limit");

    assert!(matches!(empty, SnapshotError::InvalidRequest(_)));
    assert_eq!(zero.code(), "snapshot.invalid_request");
    assert!(!zero.retryable());
    assert_eq!(feed.calls(), 0, "rejected requests never touch the feed");
}

// =============================================================================
// Query: ranking
// =============================================================================

#[tokio::test]
async fn when_market_caps_tie_system_keeps_snapshot_order() {
    // Given: market caps [50, 100, 100, 10]
    let (service, _) = service_with(vec![
        record("AAA", "First", 50.0),
        record("BBB", "Second", 100.0),
        record("CCC", "Third", 100.0),
        record("DDD", "Fourth", 10.0),
    ]);

    // When
    let top = service.top_by_market_cap(2).await.expect("ranking");

    // Then: records at positions 1 and 2, in that order
    assert_eq!(symbols(&top), vec!["BBB", "CCC"]);
}

#[tokio::test]
async fn when_ranking_the_full_universe_system_returns_the_default_count() {
    let (service, _) = service_with(universe(2000));

    let top = service
        .top_by_market_cap(DEFAULT_TOP_COUNT)
        .await
        .expect("ranking");

    assert_eq!(top.len(), 30);
    assert_eq!(top[0].symbol.as_str(), "S1999");
    assert!(top
        .windows(2)
        .all(|pair| pair[0].market_cap >= pair[1].market_cap));
}

#[tokio::test]
async fn when_ranking_asks_for_zero_or_too_many_system_clamps() {
    let (service, _) = service_with(market());

    assert!(service.top_by_market_cap(0).await.expect("ranking").is_empty());
    assert_eq!(service.top_by_market_cap(500).await.expect("ranking").len(), 5);
}

// =============================================================================
// Query: batch
// =============================================================================

#[tokio::test]
async fn when_batch_contains_unknown_symbols_system_omits_them_and_keeps_order() {
    let (service, _) = service_with(market());

    let found = service
        .batch(&["nvda", "NOPE", "AAPL", "msft"])
        .await
        .expect("batch");

    assert_eq!(symbols(&found), vec!["NVDA", "AAPL", "MSFT"]);
}

#[tokio::test]
async fn when_batch_is_empty_system_rejects_it() {
    let (service, _) = service_with(market());

    let err = service
        .batch::<&str>(&[])
        .await
        .expect_err("empty batch");

    assert!(matches!(err, SnapshotError::InvalidRequest(_)));
}

// =============================================================================
// Query: output shape
// =============================================================================

#[tokio::test]
async fn when_records_are_serialized_system_uses_the_public_field_names() {
    let (service, _) = service_with(market());

    let apple = service.lookup("AAPL").await.expect("lookup").expect("found");
    let value = serde_json::to_value(&apple).expect("serializable");

    assert_eq!(value["symbol"], "AAPL");
    assert_eq!(value["companyName"], "Apple Inc.");
    assert_eq!(value["marketCap"], 3.4e12);
    assert!(value.get("price").is_some());
    assert!(value.get("change").is_some());
    assert!(value.get("percentChange").is_some());
    assert!(value.get("revenue").is_some());
}
