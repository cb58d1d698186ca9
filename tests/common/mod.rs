//! Shared test fixtures for the stock-mentions SDK integration tests.
//!
//! Provides `setup_sample_store()` which creates an in-memory DuckDB
//! connection over a temporary data directory, with small sample tables
//! (prices_group0, mentions) loaded via NDJSON temp files and the reverse
//! LUT / missing-ticker registry written as JSON.

use std::io::Write;
use std::time::Duration;

use stockmentions_sdk::{Connection, DataStore};
use tempfile::NamedTempFile;

/// Create a `Connection` backed by a temporary data directory with sample
/// data loaded into DuckDB tables via NDJSON temp files.
///
/// Returns `(Connection, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test so the data directory is not
/// deleted prematurely.
pub fn setup_sample_store() -> (Connection, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();

    // -- reverse LUT and missing-ticker registry ------------------------------
    std::fs::write(
        tmp_dir.path().join("reverse_lut.json"),
        serde_json::to_string_pretty(&serde_json::json!({
            "TSLA": 0,
            "AAPL": 0,
            "MSFT": 0,
            "GONE": 0
        }))
        .unwrap(),
    )
    .unwrap();
    std::fs::write(
        tmp_dir.path().join("missing_tickers.json"),
        serde_json::to_string_pretty(&serde_json::json!(["MISS"])).unwrap(),
    )
    .unwrap();

    let store = DataStore::new(Some(tmp_dir.path().to_path_buf()), true, Duration::from_secs(30))
        .unwrap();
    let conn = Connection::new(store).unwrap();

    // -- prices_group0 table --------------------------------------------------
    register_prices(&conn);

    // -- mentions table -------------------------------------------------------
    register_mentions(&conn);

    (conn, tmp_dir)
}

fn register_prices(conn: &Connection) {
    let rows = vec![
        // TSLA: data on 2024-04-10 and 2024-04-24; gap on 2024-05-10 with the
        // next trading day on 2024-05-11
        price_row("2024-04-10", "TSLA", Some(170.0)),
        price_row("2024-04-24", "TSLA", Some(180.0)),
        price_row("2024-05-11", "TSLA", Some(175.0)),
        // AAPL: contiguous days, one null close
        price_row("2024-04-10", "AAPL", Some(100.0)),
        price_row("2024-04-11", "AAPL", Some(110.0)),
        price_row("2024-04-12", "AAPL", None),
        // MSFT: single day
        price_row("2024-04-10", "MSFT", Some(400.0)),
    ];

    write_ndjson_and_register(conn, "prices_group0", &rows);
}

fn price_row(date: &str, ticker: &str, close: Option<f64>) -> serde_json::Value {
    serde_json::json!({
        "date": date,
        "ticker": ticker,
        "open": close,
        "high": close,
        "low": close,
        "close": close,
        "volume": 1000.0
    })
}

fn register_mentions(conn: &Connection) {
    let mentions = vec![
        serde_json::json!({
            "stock": "Tesla",
            "stock_code": "TSLA",
            "opinion": "positive",
            "source": "host",
            "quote": "I think Tesla is a great long-term bet.",
            "date": 20240410
        }),
        serde_json::json!({
            "stock": "Apple",
            "stock_code": "AAPL",
            "opinion": "neutral",
            "source": "guest",
            "quote": "Apple is holding steady.",
            "date": 20240410
        }),
        serde_json::json!({
            "stock": "Some Startup",
            "stock_code": "N/A",
            "opinion": "positive",
            "source": "host",
            "quote": "They might IPO soon.",
            "date": 20240411
        }),
        serde_json::json!({
            "stock": "Berkshire",
            "stock_code": "BRK B",
            "opinion": "positive",
            "source": "host",
            "quote": "Buffett keeps buying.",
            "date": 20240411
        }),
        serde_json::json!({
            "stock": "Mystery Co",
            "stock_code": null,
            "opinion": "negative",
            "source": "host",
            "quote": "Not sure what they even do.",
            "date": 20240412
        }),
        serde_json::json!({
            "stock": "Delisted Corp",
            "stock_code": "MISS",
            "opinion": "negative",
            "source": "host",
            "quote": "They are in trouble.",
            "date": 20240412
        }),
    ];

    write_ndjson_and_register(conn, "mentions", &mentions);
}

/// Write a slice of JSON values as NDJSON to a temp file and register it
/// as a DuckDB table via `Connection::register_table_from_ndjson`.
pub fn write_ndjson_and_register(conn: &Connection, table_name: &str, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_ndjson(table_name, path).unwrap();
    // NamedTempFile is dropped here, but DuckDB has already read the data
    // into an in-memory table, so this is fine.
}
