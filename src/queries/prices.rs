//! Price queries against the DuckDB `prices_group{N}` CSV views.
//!
//! Tickers are routed to their group view through the reverse lookup table
//! produced by the downloader, loaded once per query handle and then reused
//! for every ticker in a batch.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::connection::Connection;
use crate::error::Result;
use crate::models::price::{PriceRow, PriceSeries};
use crate::config;
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// PriceQuery
// ---------------------------------------------------------------------------

/// Query interface for daily close prices backed by the price group views.
pub struct PriceQuery<'a> {
    conn: &'a Connection,
    lut: RefCell<Option<HashMap<String, usize>>>,
}

impl<'a> PriceQuery<'a> {
    /// Create a new `PriceQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            lut: RefCell::new(None),
        }
    }

    /// Group index for a ticker, or `None` when the ticker was never part of
    /// a download plan.
    pub fn group_for(&self, ticker: &str) -> Result<Option<usize>> {
        if self.lut.borrow().is_none() {
            let value = self.conn.store.borrow().load_json("reverse_lut")?;
            let lut: HashMap<String, usize> = serde_json::from_value(value)?;
            *self.lut.borrow_mut() = Some(lut);
        }
        Ok(self
            .lut
            .borrow()
            .as_ref()
            .and_then(|lut| lut.get(ticker).copied()))
    }

    /// Whether price data was downloaded for the ticker.
    pub fn has_ticker(&self, ticker: &str) -> Result<bool> {
        Ok(self.group_for(ticker)?.is_some())
    }

    /// Build the date-indexed close series for a ticker.
    ///
    /// Returns `None` when the ticker has no group or its group holds no
    /// rows for it. Both mean "no price series available", which the batch
    /// evaluator treats as a per-record skip.
    pub fn series(&self, ticker: &str) -> Result<Option<PriceSeries>> {
        let Some(group) = self.group_for(ticker)? else {
            return Ok(None);
        };
        let view = config::price_group_view(group);
        self.conn.ensure_views(&[&view])?;

        let (sql, params) = SqlBuilder::new(&view)
            .select(&["date", "close"])
            .where_eq("ticker", ticker)
            .order_by(&["date ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let mut series = PriceSeries::new(ticker);
        for row in &rows {
            let Some(date) = row.get("date").and_then(|v| v.as_str()) else {
                continue;
            };
            let close = row.get("close").and_then(|v| v.as_f64());
            series.insert(date, close);
        }
        Ok(Some(series))
    }

    /// Full daily rows for a ticker, optionally bounded by date keys.
    pub fn history(
        &self,
        ticker: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Vec<PriceRow>> {
        let Some(group) = self.group_for(ticker)? else {
            return Ok(Vec::new());
        };
        let view = config::price_group_view(group);
        self.conn.ensure_views(&[&view])?;

        let mut qb = SqlBuilder::new(&view);
        qb.where_eq("ticker", ticker);
        qb.order_by(&["date ASC"]);

        if let Some(df) = date_from {
            qb.where_gte("date", df);
        }
        if let Some(dt) = date_to {
            qb.where_lte("date", dt);
        }

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    /// Latest date key with data for a ticker, if any.
    pub fn latest_date(&self, ticker: &str) -> Result<Option<String>> {
        let Some(group) = self.group_for(ticker)? else {
            return Ok(None);
        };
        let view = config::price_group_view(group);
        self.conn.ensure_views(&[&view])?;

        let sql = format!("SELECT MAX(date) FROM {} WHERE ticker = ?", view);
        let value = self.conn.execute_scalar(&sql, &[ticker.to_string()])?;
        Ok(value.and_then(|v| v.as_str().map(|s| s.to_string())))
    }
}
