//! Async wrapper around [`StockMentionsSdk`] for use in async runtimes.
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//! DuckDB queries and the in-memory return computation are CPU-bound but
//! fast, making this approach efficient.
//!
//! # Example
//!
//! ```no_run
//! use stockmentions_sdk::AsyncStockMentionsSdk;
//!
//! async fn example() -> stockmentions_sdk::Result<()> {
//!     let sdk = AsyncStockMentionsSdk::builder().build().await?;
//!
//!     // Run any sync SDK method via closure
//!     let records = sdk.run(|s| {
//!         let mentions = s.mentions().evaluable(None, None)?;
//!         s.backtest().evaluate_all(&mentions, &[14, 30])
//!     }).await?;
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Result, StockMentionsError};
use crate::StockMentionsSdk;

// ---------------------------------------------------------------------------
// AsyncStockMentionsSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncStockMentionsSdk`].
pub struct AsyncStockMentionsSdkBuilder {
    data_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    llm_api_key: Option<String>,
}

impl Default for AsyncStockMentionsSdkBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            offline: false,
            timeout: Duration::from_secs(120),
            llm_api_key: None,
        }
    }
}

impl AsyncStockMentionsSdkBuilder {
    /// Set a custom data directory.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Set the HTTP request timeout for downloads and LLM calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the API key used by the extractor.
    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    /// Build the async SDK, initializing the data store and DuckDB
    /// connection on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncStockMentionsSdk> {
        tokio::task::spawn_blocking(move || {
            let mut builder = StockMentionsSdk::builder();
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            if let Some(key) = self.llm_api_key {
                builder = builder.llm_api_key(key);
            }
            builder = builder.offline(self.offline).timeout(self.timeout);
            let sdk = builder.build()?;
            Ok(AsyncStockMentionsSdk {
                inner: Arc::new(Mutex::new(sdk)),
            })
        })
        .await
        .map_err(|e| StockMentionsError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncStockMentionsSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`StockMentionsSdk`].
///
/// All operations are dispatched to a blocking thread pool via
/// [`tokio::task::spawn_blocking`]. The underlying [`StockMentionsSdk`] is
/// protected by a [`Mutex`] since it uses `RefCell` internally.
pub struct AsyncStockMentionsSdk {
    inner: Arc<Mutex<StockMentionsSdk>>,
}

impl AsyncStockMentionsSdk {
    /// Create a new builder for configuring the async SDK.
    pub fn builder() -> AsyncStockMentionsSdkBuilder {
        AsyncStockMentionsSdkBuilder::default()
    }

    /// Run a sync SDK operation on the blocking thread pool.
    ///
    /// The closure receives a `&StockMentionsSdk` reference and should
    /// return a `Result<T>`.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&StockMentionsSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = sdk
                .lock()
                .map_err(|_| StockMentionsError::InvalidArgument("SDK lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StockMentionsError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |s| s.sql(&query, &params)).await
    }

    /// Re-check the dataset manifest and reset views if it changed.
    pub async fn refresh(&self) -> Result<bool> {
        self.run(|s| s.refresh()).await
    }

    /// Return the list of currently registered DuckDB view names.
    pub async fn views(&self) -> Result<Vec<String>> {
        self.run(|s| Ok(s.views())).await
    }
}
