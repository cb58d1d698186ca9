//! Missing-ticker registry backed by `missing_tickers.json`.
//!
//! Populated out of band from failed downloads; the batch evaluator consults
//! it to skip tickers known to have no retrievable price data. Accepts either
//! a flat JSON array of tickers or a map of group name to ticker array.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{Result, StockMentionsError};
use crate::store::DataStore;

/// Set of tickers known to have no retrievable price data.
#[derive(Debug, Clone, Default)]
pub struct MissingTickerRegistry {
    tickers: HashSet<String>,
}

impl MissingTickerRegistry {
    /// Load the registry from the data store.
    ///
    /// A missing file is an empty registry (nothing is known to be
    /// unavailable); a corrupt file is an error.
    pub fn load(store: &DataStore) -> Result<Self> {
        match store.load_json("missing_tickers") {
            Ok(value) => Ok(Self::from_value(&value)),
            Err(StockMentionsError::NotFound(_)) => {
                log::debug!("No missing-ticker registry on disk; treating as empty");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Build a registry from an explicit ticker collection.
    pub fn from_tickers<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
        }
    }

    fn from_value(value: &Value) -> Self {
        let mut tickers = HashSet::new();
        match value {
            Value::Array(entries) => collect_tickers(entries, &mut tickers),
            Value::Object(groups) => {
                for group in groups.values() {
                    if let Value::Array(entries) = group {
                        collect_tickers(entries, &mut tickers);
                    }
                }
            }
            _ => {}
        }
        Self { tickers }
    }

    /// Exact-string membership test.
    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.contains(ticker)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

fn collect_tickers(entries: &[Value], out: &mut HashSet<String>) {
    for entry in entries {
        if let Value::String(ticker) = entry {
            out.insert(ticker.clone());
        }
    }
}
