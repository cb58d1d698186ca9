use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config;

// ---------------------------------------------------------------------------
// PriceRow — Single daily price data point (query result)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PriceRow {
    pub date: String,
    pub ticker: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

// ---------------------------------------------------------------------------
// PriceSeries — Date-indexed close prices for one ticker
// ---------------------------------------------------------------------------

/// Ordered-by-date mapping from `%Y-%m-%d` date key to closing price for a
/// single ticker.
///
/// Dates are not contiguous: weekends, market holidays, and failed download
/// rows all leave gaps. A present key with a `None` close means the row
/// existed but carried no usable price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    closes: BTreeMap<String, Option<f64>>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            closes: BTreeMap::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Insert a close price under a date key. NaN is stored as `None` so it
    /// can never leak into return arithmetic.
    pub fn insert(&mut self, date_key: impl Into<String>, close: Option<f64>) {
        let close = close.filter(|p| !p.is_nan());
        self.closes.insert(date_key.into(), close);
    }

    /// Whether the exact date key exists in the series index (regardless of
    /// whether its price is usable).
    pub fn contains_date(&self, date_key: &str) -> bool {
        self.closes.contains_key(date_key)
    }

    /// Close price at an exact date key. `None` when the key is absent or
    /// the stored price is null.
    pub fn close_at(&self, date_key: &str) -> Option<f64> {
        self.closes.get(date_key).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Earliest date key in the series, if any.
    pub fn first_date(&self) -> Option<&str> {
        self.closes.keys().next().map(|k| k.as_str())
    }

    /// Latest date key in the series, if any.
    pub fn last_date(&self) -> Option<&str> {
        self.closes.keys().next_back().map(|k| k.as_str())
    }
}

/// Format a calendar date as a series date key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(config::DATE_KEY_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// ResolvedPoint — Result of resolving a target date against a series
// ---------------------------------------------------------------------------

/// A target calendar date resolved to a trading day present in a series.
///
/// `extra_days == 0` means the exact target date existed. The not-found
/// sentinel (scan exhausted without a hit) has an empty `date_key`, zero
/// `extra_days`, and no price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub date_key: String,
    pub extra_days: u32,
    pub price: Option<f64>,
}

impl ResolvedPoint {
    pub fn not_found() -> Self {
        Self {
            date_key: String::new(),
            extra_days: 0,
            price: None,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.date_key.is_empty()
    }
}
