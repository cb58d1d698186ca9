//! Price and mention query integration tests against in-memory sample data.

mod common;

use stockmentions_sdk::queries::{MentionQuery, PriceQuery};

// ---------------------------------------------------------------------------
// PriceQuery
// ---------------------------------------------------------------------------

#[test]
fn series_builds_date_indexed_closes() {
    let (conn, _tmp) = common::setup_sample_store();
    let pq = PriceQuery::new(&conn);

    let series = pq.series("TSLA").unwrap().unwrap();
    assert_eq!(series.ticker(), "TSLA");
    assert_eq!(series.len(), 3);
    assert_eq!(series.close_at("2024-04-10"), Some(170.0));
    assert_eq!(series.close_at("2024-05-11"), Some(175.0));
    assert!(!series.contains_date("2024-05-10"));
}

#[test]
fn series_preserves_null_closes_as_present_dates() {
    let (conn, _tmp) = common::setup_sample_store();
    let pq = PriceQuery::new(&conn);

    let series = pq.series("AAPL").unwrap().unwrap();
    assert!(series.contains_date("2024-04-12"));
    assert_eq!(series.close_at("2024-04-12"), None);
}

#[test]
fn series_is_none_for_unplanned_or_empty_tickers() {
    let (conn, _tmp) = common::setup_sample_store();
    let pq = PriceQuery::new(&conn);

    // In the LUT but no rows
    assert!(pq.series("GONE").unwrap().is_none());
    // Not in the LUT at all
    assert!(pq.series("ZZZZ").unwrap().is_none());
}

#[test]
fn has_ticker_reflects_the_lookup_table() {
    let (conn, _tmp) = common::setup_sample_store();
    let pq = PriceQuery::new(&conn);

    assert!(pq.has_ticker("TSLA").unwrap());
    assert!(pq.has_ticker("GONE").unwrap());
    assert!(!pq.has_ticker("ZZZZ").unwrap());
}

#[test]
fn history_respects_date_bounds() {
    let (conn, _tmp) = common::setup_sample_store();
    let pq = PriceQuery::new(&conn);

    let all = pq.history("TSLA", None, None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].date, "2024-04-10");

    let bounded = pq
        .history("TSLA", Some("2024-04-11"), Some("2024-04-30"))
        .unwrap();
    assert_eq!(bounded.len(), 1);
    assert_eq!(bounded[0].date, "2024-04-24");
    assert_eq!(bounded[0].close, Some(180.0));
}

#[test]
fn latest_date_is_the_series_maximum() {
    let (conn, _tmp) = common::setup_sample_store();
    let pq = PriceQuery::new(&conn);

    assert_eq!(pq.latest_date("TSLA").unwrap().as_deref(), Some("2024-05-11"));
    assert_eq!(pq.latest_date("ZZZZ").unwrap(), None);
}

// ---------------------------------------------------------------------------
// MentionQuery
// ---------------------------------------------------------------------------

#[test]
fn list_returns_every_mention() {
    let (conn, _tmp) = common::setup_sample_store();
    let mq = MentionQuery::new(&conn);

    let mentions = mq.list(None, None).unwrap();
    assert_eq!(mentions.len(), 6);
}

#[test]
fn list_applies_inclusive_date_bounds() {
    let (conn, _tmp) = common::setup_sample_store();
    let mq = MentionQuery::new(&conn);

    let mentions = mq.list(Some(20240411), Some(20240411)).unwrap();
    assert_eq!(mentions.len(), 2);
    assert!(mentions.iter().all(|m| m.date == 20240411));
}

#[test]
fn evaluable_drops_null_and_na_codes() {
    let (conn, _tmp) = common::setup_sample_store();
    let mq = MentionQuery::new(&conn);

    let mentions = mq.evaluable(None, None).unwrap();
    let mut stocks: Vec<&str> = mentions.iter().map(|m| m.stock.as_str()).collect();
    stocks.sort();
    // "Some Startup" (N/A) and "Mystery Co" (null) are gone; the whitespace
    // ticker survives here and is the batch evaluator's problem
    assert_eq!(stocks, vec!["Apple", "Berkshire", "Delisted Corp", "Tesla"]);
}

#[test]
fn distinct_tickers_are_sorted_and_deduplicated() {
    let (conn, _tmp) = common::setup_sample_store();
    let mq = MentionQuery::new(&conn);

    let tickers = mq.distinct_tickers().unwrap();
    assert_eq!(tickers, vec!["AAPL", "BRK B", "MISS", "TSLA"]);
}

#[test]
fn count_matches_row_total() {
    let (conn, _tmp) = common::setup_sample_store();
    let mq = MentionQuery::new(&conn);
    assert_eq!(mq.count().unwrap(), 6);
}

#[test]
fn mention_metadata_passes_through() {
    let (conn, _tmp) = common::setup_sample_store();
    let mq = MentionQuery::new(&conn);

    let mentions = mq.list(Some(20240410), Some(20240410)).unwrap();
    let tesla = mentions.iter().find(|m| m.stock == "Tesla").unwrap();
    assert_eq!(tesla.stock_code.as_deref(), Some("TSLA"));
    assert_eq!(tesla.opinion.as_deref(), Some("positive"));
    assert_eq!(tesla.source.as_deref(), Some("host"));
    assert!(tesla.quote.as_deref().unwrap().contains("long-term bet"));
}
