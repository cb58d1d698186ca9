//! Chunked price-history download planning.
//!
//! The batch price endpoint rejects large ticker lists, so tickers are
//! partitioned into groups of [`config::CHUNK_SIZE`] and fetched one group
//! CSV at a time. The reverse lookup table (ticker → group index) produced
//! here is what later routes each ticker to its group view; it is computed
//! once per plan and persisted, never recomputed globally.

use std::collections::HashMap;

use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::store::Manifest;

/// Ticker → download-group index.
pub type ReverseLut = HashMap<String, usize>;

/// Partition tickers into download groups, preserving input order.
pub fn chunk_tickers(tickers: &[String]) -> Vec<Vec<String>> {
    tickers
        .chunks(config::CHUNK_SIZE)
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Build the reverse lookup table for a chunk plan.
pub fn reverse_lookup(chunks: &[Vec<String>]) -> ReverseLut {
    let mut lut = ReverseLut::new();
    for (group, chunk) in chunks.iter().enumerate() {
        for ticker in chunk {
            lut.insert(ticker.clone(), group);
        }
    }
    lut
}

// ---------------------------------------------------------------------------
// PriceDownloader
// ---------------------------------------------------------------------------

/// Fetches the price group CSVs for a ticker list and records the plan.
pub struct PriceDownloader<'a> {
    conn: &'a Connection,
}

impl<'a> PriceDownloader<'a> {
    /// Create a new `PriceDownloader` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Download every group CSV for `tickers` over the date range, then
    /// persist the reverse LUT and the dataset manifest.
    ///
    /// Already-present group files are not re-fetched. Dates are `%Y-%m-%d`
    /// strings matching the series date keys.
    pub fn fetch_all(
        &self,
        tickers: &[String],
        start_date: &str,
        end_date: &str,
    ) -> Result<ReverseLut> {
        let chunks = chunk_tickers(tickers);
        let lut = reverse_lookup(&chunks);
        if chunks.len() > 1 {
            log::info!(
                "Splitting {} tickers into {} groups of {}",
                tickers.len(),
                chunks.len(),
                config::CHUNK_SIZE
            );
        }

        for (group, chunk) in chunks.iter().enumerate() {
            log::info!("Fetching price group {} ({} tickers)", group, chunk.len());
            self.conn
                .store
                .borrow_mut()
                .download_group_csv(group, chunk, start_date, end_date)?;
        }

        let store = self.conn.store.borrow();
        store.save_json("reverse_lut", &serde_json::to_value(&lut)?)?;
        store.save_manifest(&Manifest {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            groups: chunks.len(),
        })?;

        Ok(lut)
    }
}
