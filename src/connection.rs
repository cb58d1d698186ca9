//! DuckDB connection wrapper with view registration and query execution.
//!
//! Price group CSVs and the mention table are registered lazily as views via
//! `read_csv_auto`, with date and price columns cast explicitly so query
//! results are stable regardless of what the CSV sniffer infers.

use crate::error::{Result, StockMentionsError};
use crate::store::{DataStore, Manifest};
use crate::config;
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Wraps a DuckDB connection and registers data-dir files as views.
pub struct Connection {
    conn: DuckDbConnection,
    /// The data store used to locate pipeline files.
    pub store: RefCell<DataStore>,
    registered_views: RefCell<HashSet<String>>,
    manifest: RefCell<Option<Manifest>>,
}

impl Connection {
    /// Create a connection backed by the given data store.
    ///
    /// Opens an in-memory DuckDB database and remembers the current dataset
    /// manifest (if any) for later staleness checks.
    pub fn new(store: DataStore) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        let manifest = store.manifest().unwrap_or(None);
        Ok(Self {
            conn,
            store: RefCell::new(store),
            registered_views: RefCell::new(HashSet::new()),
            manifest: RefCell::new(manifest),
        })
    }

    /// Ensure one or more views are registered.
    pub fn ensure_views(&self, views: &[&str]) -> Result<()> {
        for name in views {
            if !self.registered_views.borrow().contains(*name) {
                self.ensure_view(name)?;
            }
        }
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Get column metadata AFTER query execution (calling before panics in duckdb-rs)
        let column_names: Vec<String> = rows_result
            .as_ref()
            .unwrap()
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let column_count = rows_result.as_ref().unwrap().column_count();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::new();
            for i in 0..column_count {
                let col_name = &column_names[i];
                let value = convert_value_ref(row.get_ref(i)?);
                map.insert(col_name.clone(), value);
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(
                row.into_iter()
                    .collect::<serde_json::Map<String, serde_json::Value>>(),
            );
            let item: T = serde_json::from_value(value)?;
            results.push(item);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            let value = convert_value_ref(row.get_ref(0)?);
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    /// Create a DuckDB table from a newline-delimited JSON file.
    ///
    /// Used by test fixtures to stand in for CSV-backed views; data is
    /// streamed from disk by DuckDB rather than loaded through Rust first.
    pub fn register_table_from_ndjson(&self, table_name: &str, ndjson_path: &str) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM read_json_auto('{}', format='newline_delimited')",
            table_name, table_name, path_fwd
        ))?;
        self.registered_views
            .borrow_mut()
            .insert(table_name.to_string());
        Ok(())
    }

    /// Check whether a view has been registered.
    pub fn has_view(&self, name: &str) -> bool {
        self.registered_views.borrow().contains(name)
    }

    /// Return a list of all registered view names.
    pub fn views(&self) -> Vec<String> {
        self.registered_views.borrow().iter().cloned().collect()
    }

    /// Clear all registered views so they will be re-created on next access.
    pub fn reset_views(&self) {
        self.registered_views.borrow_mut().clear();
    }

    /// The dataset manifest observed when views were last (re)loaded.
    pub fn loaded_manifest(&self) -> Option<Manifest> {
        self.manifest.borrow().clone()
    }

    /// Remember a manifest as the currently loaded dataset.
    pub fn set_loaded_manifest(&self, manifest: Option<Manifest>) {
        *self.manifest.borrow_mut() = manifest;
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }

    /// Lazily register a data-dir file as a DuckDB view.
    ///
    /// `prices_group{N}` maps to `stock_group{N}.csv`; `mentions` maps to the
    /// aggregated mention CSV.
    fn ensure_view(&self, view_name: &str) -> Result<()> {
        if self.registered_views.borrow().contains(view_name) {
            return Ok(());
        }

        if view_name == "mentions" {
            let path = self.store.borrow().mentions_path()?;
            let path_str = path.to_string_lossy().replace('\\', "/");
            self.conn.execute_batch(&format!(
                "CREATE OR REPLACE VIEW mentions AS \
                 SELECT stock, CAST(stock_code AS VARCHAR) AS stock_code, \
                        opinion, source, quote, CAST(date AS BIGINT) AS date \
                 FROM read_csv_auto('{}', header=true)",
                path_str
            ))?;
        } else if let Some(group) = parse_group_view(view_name) {
            let path = self.store.borrow().group_csv_path(group)?;
            let path_str = path.to_string_lossy().replace('\\', "/");
            // Dates become the canonical string keys; prices become DOUBLE
            // even when the sniffer saw an all-empty column.
            self.conn.execute_batch(&format!(
                "CREATE OR REPLACE VIEW {} AS \
                 SELECT CAST(date AS VARCHAR) AS date, ticker, \
                        CAST(open AS DOUBLE) AS open, CAST(high AS DOUBLE) AS high, \
                        CAST(low AS DOUBLE) AS low, CAST(close AS DOUBLE) AS close, \
                        CAST(volume AS DOUBLE) AS volume \
                 FROM read_csv_auto('{}', header=true)",
                view_name, path_str
            ))?;
        } else {
            return Err(StockMentionsError::NotFound(format!(
                "Unknown view: {}",
                view_name
            )));
        }

        self.registered_views
            .borrow_mut()
            .insert(view_name.to_string());
        log::debug!("Registered view: {}", view_name);

        Ok(())
    }
}

/// Parse `prices_group{N}` into its group index.
fn parse_group_view(view_name: &str) -> Option<usize> {
    view_name
        .strip_prefix("prices_group")
        .and_then(|suffix| suffix.parse().ok())
        .filter(|&group| config::price_group_view(group) == view_name)
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; try i64, fallback to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        _ => {
            // Remaining types (Date, Time, Timestamp, Blob, List, ...) never
            // appear in our views, which cast to VARCHAR/DOUBLE explicitly
            serde_json::Value::Null
        }
    }
}
