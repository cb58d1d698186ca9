//! Stock-mentions SDK for Rust.
//!
//! Research pipeline for evaluating stock opinions extracted from YouTube
//! video transcripts: clean transcripts, extract opinions via an LLM, map
//! companies to tickers, download daily price history in rate-limit-sized
//! groups, and compute forward returns after each mention. Price and mention
//! tables live as CSVs in a local data directory and are queried in-process
//! via DuckDB.
//!
//! # Quick start
//!
//! ```no_run
//! use stockmentions_sdk::StockMentionsSdk;
//!
//! let sdk = StockMentionsSdk::builder().build().unwrap();
//!
//! // Load evaluable mentions and compute 14- and 30-day forward returns
//! let mentions = sdk.mentions().evaluable(Some(20240406), None).unwrap();
//! let records = sdk.backtest().evaluate_all(&mentions, &[14, 30]).unwrap();
//!
//! // Format the percentage-return report
//! let report = stockmentions_sdk::backtest::ReturnReport::build(&records);
//! report.write_csv_file("returns.csv").unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod backtest;
pub mod config;
pub mod connection;
pub mod error;
pub mod ingest;
pub mod models;
pub mod queries;
pub mod registry;
pub mod sql_builder;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncStockMentionsSdk;
pub use connection::Connection;
pub use error::{Result, StockMentionsError};
pub use sql_builder::SqlBuilder;
pub use store::{DataStore, Manifest};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backtest::BacktestRunner;
use crate::ingest::downloader::PriceDownloader;
use crate::ingest::extractor::{ExtractorConfig, OpinionExtractor};
use crate::queries::{MentionQuery, PriceQuery};
use crate::registry::MissingTickerRegistry;

// ---------------------------------------------------------------------------
// StockMentionsSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`StockMentionsSdk`] instance.
///
/// Use [`StockMentionsSdk::builder()`] to obtain a builder, chain
/// configuration methods, and call [`build()`](StockMentionsSdkBuilder::build)
/// to create the SDK.
pub struct StockMentionsSdkBuilder {
    data_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    price_endpoint: Option<String>,
    llm_api_base: Option<String>,
    llm_api_key: Option<String>,
    llm_model: Option<String>,
}

impl Default for StockMentionsSdkBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            offline: false,
            timeout: Duration::from_secs(120),
            price_endpoint: None,
            llm_api_base: None,
            llm_api_key: None,
            llm_model: None,
        }
    }
}

impl StockMentionsSdkBuilder {
    /// Set a custom data directory.
    ///
    /// If not set, the platform-appropriate default data directory is used
    /// (e.g. `~/.local/share/stockmentions-sdk` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    ///
    /// When offline, the SDK never downloads price data and only uses files
    /// already in the data directory. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set the HTTP request timeout for downloads and LLM calls.
    ///
    /// Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the price download endpoint.
    pub fn price_endpoint(mut self, base: impl Into<String>) -> Self {
        self.price_endpoint = Some(base.into());
        self
    }

    /// Override the chat-completions endpoint used by the extractor.
    pub fn llm_api_base(mut self, base: impl Into<String>) -> Self {
        self.llm_api_base = Some(base.into());
        self
    }

    /// Set the API key used by the extractor. Without it,
    /// [`StockMentionsSdk::extractor()`] returns an error.
    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    /// Set the extractor model (must be one of the accepted models).
    pub fn llm_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = Some(model.into());
        self
    }

    /// Build the SDK, initializing the data store and DuckDB connection.
    ///
    /// Does **not** download any data eagerly; price groups are fetched by
    /// the downloader and registered lazily on first query.
    pub fn build(self) -> Result<StockMentionsSdk> {
        let mut store = DataStore::new(self.data_dir, self.offline, self.timeout)?;
        if let Some(endpoint) = self.price_endpoint {
            store = store.with_endpoint(endpoint);
        }
        let conn = Connection::new(store)?;
        Ok(StockMentionsSdk {
            conn,
            timeout: self.timeout,
            llm_api_base: self.llm_api_base,
            llm_api_key: self.llm_api_key,
            llm_model: self.llm_model,
        })
    }
}

// ---------------------------------------------------------------------------
// StockMentionsSdk
// ---------------------------------------------------------------------------

/// The main entry point for the stock-mentions SDK.
///
/// Wraps a [`Connection`] (which owns the [`DataStore`] and DuckDB database)
/// and exposes the pipeline stages as lightweight borrowing wrappers.
///
/// Created via [`StockMentionsSdk::builder()`].
pub struct StockMentionsSdk {
    conn: Connection,
    timeout: Duration,
    llm_api_base: Option<String>,
    llm_api_key: Option<String>,
    llm_model: Option<String>,
}

impl StockMentionsSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> StockMentionsSdkBuilder {
        StockMentionsSdkBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the price query interface.
    ///
    /// Requires the price group CSVs and reverse lookup table produced by
    /// the downloader.
    pub fn prices(&self) -> PriceQuery<'_> {
        PriceQuery::new(&self.conn)
    }

    /// Access the mention query interface.
    ///
    /// Mention data is read from the aggregated mention CSV in the data
    /// directory.
    pub fn mentions(&self) -> MentionQuery<'_> {
        MentionQuery::new(&self.conn)
    }

    /// Access the forward-return batch evaluator.
    pub fn backtest(&self) -> BacktestRunner<'_> {
        BacktestRunner::new(&self.conn)
    }

    /// Access the chunked price downloader.
    pub fn downloader(&self) -> PriceDownloader<'_> {
        PriceDownloader::new(&self.conn)
    }

    /// Load the missing-ticker registry from the data directory.
    pub fn registry(&self) -> Result<MissingTickerRegistry> {
        MissingTickerRegistry::load(&self.conn.store.borrow())
    }

    /// Build the LLM opinion extractor from the configured credentials.
    pub fn extractor(&self) -> Result<OpinionExtractor> {
        let Some(key) = self.llm_api_key.as_deref() else {
            return Err(StockMentionsError::InvalidArgument(
                "No LLM API key configured; set one with llm_api_key() on the builder".to_string(),
            ));
        };
        let mut config = ExtractorConfig::new(key);
        config.timeout = self.timeout;
        if let Some(base) = self.llm_api_base.as_deref() {
            config = config.api_base(base);
        }
        if let Some(model) = self.llm_model.as_deref() {
            config = config.model(model);
        }
        OpinionExtractor::new(config)
    }

    // -- Metadata and utility methods --------------------------------------

    /// Load the dataset manifest (date range and group count), if present.
    pub fn manifest(&self) -> Result<Option<Manifest>> {
        self.conn.store.borrow().manifest()
    }

    /// Return the list of currently registered DuckDB view names.
    ///
    /// Views are registered lazily on first query, so this list grows as
    /// different query interfaces are used.
    pub fn views(&self) -> Vec<String> {
        self.conn.views()
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// Provides escape-hatch access for queries not covered by the
    /// domain-specific interfaces.
    ///
    /// # Arguments
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Re-check the dataset manifest and reset views if it changed on disk.
    ///
    /// Returns `true` if views were reset (meaning subsequent queries will
    /// re-read the data files), or `false` if the dataset is unchanged.
    pub fn refresh(&self) -> Result<bool> {
        let current = self.conn.store.borrow().manifest()?;
        if current != self.conn.loaded_manifest() {
            self.conn.reset_views();
            self.conn.set_loaded_manifest(current);
            log::info!("Dataset manifest changed; views reset");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the SDK and release all resources.
    ///
    /// Closes the DuckDB connection and HTTP client. This is called
    /// automatically when the SDK is dropped, but can be invoked explicitly
    /// for deterministic cleanup.
    pub fn close(self) {
        drop(self);
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Return a mutable reference to the underlying [`Connection`].
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for StockMentionsSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let views = self.conn.views();
        let store = self.conn.store.borrow();
        write!(
            f,
            "StockMentionsSdk(data_dir={}, views=[{}], offline={})",
            store.data_dir.display(),
            views.join(", "),
            store.offline
        )
    }
}
