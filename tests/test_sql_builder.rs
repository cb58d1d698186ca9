//! Unit tests for the SqlBuilder query construction.

use stockmentions_sdk::SqlBuilder;

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("mentions").build();
    assert_eq!(sql, "SELECT *\nFROM mentions");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("prices_group0")
        .select(&["date", "close"])
        .build();
    assert!(sql.starts_with("SELECT date, close\n"));
}

#[test]
fn distinct_adds_keyword() {
    let (sql, _) = SqlBuilder::new("mentions").distinct().build();
    assert!(sql.starts_with("SELECT DISTINCT *"));
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_eq_adds_equality_with_param() {
    let (sql, params) = SqlBuilder::new("prices_group0")
        .where_eq("ticker", "TSLA")
        .build();
    assert!(sql.contains("WHERE ticker = ?"));
    assert_eq!(params, vec!["TSLA"]);
}

#[test]
fn where_in_adds_in_clause() {
    let (sql, params) = SqlBuilder::new("prices_group0")
        .where_in("ticker", &["TSLA", "AAPL", "MSFT"])
        .build();
    assert!(sql.contains("ticker IN (?, ?, ?)"));
    assert_eq!(params, vec!["TSLA", "AAPL", "MSFT"]);
}

#[test]
fn where_in_empty_produces_false() {
    let (sql, params) = SqlBuilder::new("prices_group0")
        .where_in("ticker", &[])
        .build();
    assert!(sql.contains("WHERE FALSE"));
    assert!(params.is_empty());
}

#[test]
fn where_gte_adds_comparison() {
    let (sql, params) = SqlBuilder::new("mentions")
        .where_gte("date", "20240406")
        .build();
    assert!(sql.contains("date >= ?"));
    assert_eq!(params, vec!["20240406"]);
}

#[test]
fn where_lte_adds_comparison() {
    let (sql, params) = SqlBuilder::new("mentions")
        .where_lte("date", "20250521")
        .build();
    assert!(sql.contains("date <= ?"));
    assert_eq!(params, vec!["20250521"]);
}

#[test]
fn where_clause_appends_params_in_order() {
    let (sql, params) = SqlBuilder::new("mentions")
        .where_clause("stock_code IS NOT NULL", &[])
        .where_clause("stock_code <> ?", &["N/A"])
        .build();
    assert!(sql.contains("stock_code IS NOT NULL"));
    assert!(sql.contains("stock_code <> ?"));
    assert_eq!(params, vec!["N/A"]);
}

#[test]
fn multiple_where_clauses_joined_with_and() {
    let (sql, _) = SqlBuilder::new("prices_group0")
        .where_eq("ticker", "TSLA")
        .where_gte("date", "2024-04-06")
        .build();
    assert!(sql.contains("WHERE ticker = ? AND date >= ?"));
}

// ---------------------------------------------------------------------------
// ORDER BY / LIMIT / OFFSET
// ---------------------------------------------------------------------------

#[test]
fn order_by_adds_clause() {
    let (sql, _) = SqlBuilder::new("prices_group0")
        .order_by(&["date ASC", "ticker DESC"])
        .build();
    assert!(sql.contains("ORDER BY date ASC, ticker DESC"));
}

#[test]
fn limit_and_offset_together() {
    let (sql, _) = SqlBuilder::new("mentions").limit(10).offset(20).build();
    assert!(sql.contains("LIMIT 10"));
    assert!(sql.contains("OFFSET 20"));
}

// ---------------------------------------------------------------------------
// Combined / chained
// ---------------------------------------------------------------------------

#[test]
fn combined_builder_chains_correctly() {
    let (sql, params) = SqlBuilder::new("prices_group0")
        .select(&["date", "close"])
        .where_eq("ticker", "TSLA")
        .where_gte("date", "2024-04-06")
        .where_lte("date", "2025-05-21")
        .order_by(&["date ASC"])
        .limit(100)
        .build();

    assert!(sql.contains("SELECT date, close"));
    assert!(sql.contains("ticker = ?"));
    assert!(sql.contains("date >= ?"));
    assert!(sql.contains("date <= ?"));
    assert!(sql.contains("ORDER BY date ASC"));
    assert!(sql.contains("LIMIT 100"));
    assert_eq!(params, vec!["TSLA", "2024-04-06", "2025-05-21"]);
}
