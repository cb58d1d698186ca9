//! Local data-directory manager for the mention pipeline.
//!
//! Owns the on-disk layout: downloaded price group CSVs, the aggregated
//! mention table, the missing-ticker registry, the reverse lookup table, and
//! the dataset manifest. Price CSVs are fetched from a configurable endpoint
//! with an atomic temp-file + rename, so an interrupted download never leaves
//! a corrupt partial file behind.

use crate::config;
use crate::error::{Result, StockMentionsError};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Describes the downloaded dataset: its date range and how many price
/// groups it was split into. Written by the downloader after a successful
/// fetch; compared by `refresh()` to decide whether views are stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub start_date: String,
    pub end_date: String,
    pub groups: usize,
}

// ---------------------------------------------------------------------------
// DataStore
// ---------------------------------------------------------------------------

/// Manages the local data directory and price CSV downloads.
pub struct DataStore {
    /// Directory where pipeline files are stored.
    pub data_dir: PathBuf,
    /// If true, never download (use local files only).
    pub offline: bool,
    timeout: Duration,
    endpoint_base: String,
    client: Option<Client>,
}

impl DataStore {
    /// Create a new data store rooted at `data_dir`.
    ///
    /// If `data_dir` is `None`, uses the platform-appropriate default data
    /// directory. Creates the directory if it does not exist.
    pub fn new(data_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = data_dir.unwrap_or_else(config::default_data_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            data_dir: dir,
            offline,
            timeout,
            endpoint_base: config::PRICE_ENDPOINT_BASE.to_string(),
            client: None,
        })
    }

    /// Override the price download endpoint.
    pub fn with_endpoint(mut self, base: impl Into<String>) -> Self {
        self.endpoint_base = base.into();
        self
    }

    /// Lazy HTTP client, created on first use.
    pub fn client(&mut self) -> &Client {
        if self.client.is_none() {
            self.client = Some(
                Client::builder()
                    .timeout(self.timeout)
                    .redirect(reqwest::redirect::Policy::limited(10))
                    .build()
                    .expect("failed to build HTTP client"),
            );
        }
        self.client.as_ref().unwrap()
    }

    /// Path of a price group CSV, requiring it to exist locally.
    ///
    /// Group CSVs are produced by [`download_group_csv`](Self::download_group_csv);
    /// view registration only ever reads them.
    pub fn group_csv_path(&self, group: usize) -> Result<PathBuf> {
        let path = self.data_dir.join(config::price_group_file(group));
        if path.exists() {
            Ok(path)
        } else {
            Err(StockMentionsError::NotFound(format!(
                "Price group file {} is not in the data directory; run the downloader first",
                config::price_group_file(group)
            )))
        }
    }

    /// Download one price group CSV covering `tickers` over the date range.
    ///
    /// Skips the download when the file already exists. In offline mode a
    /// missing file is an error rather than a fetch.
    pub fn download_group_csv(
        &mut self,
        group: usize,
        tickers: &[String],
        start_date: &str,
        end_date: &str,
    ) -> Result<PathBuf> {
        let local_path = self.data_dir.join(config::price_group_file(group));
        if local_path.exists() {
            return Ok(local_path);
        }
        if self.offline {
            return Err(StockMentionsError::NotFound(format!(
                "Price group {} not downloaded and offline mode is enabled",
                group
            )));
        }

        let url = format!(
            "{}/daily.csv?tickers={}&start={}&end={}",
            self.endpoint_base,
            tickers.join(","),
            start_date,
            end_date
        );
        self.download_file(&url, &local_path)?;
        Ok(local_path)
    }

    /// Path of the aggregated mention CSV, requiring it to exist locally.
    ///
    /// The mention table is produced by the extraction stage, never
    /// downloaded.
    pub fn mentions_path(&self) -> Result<PathBuf> {
        let path = self.data_dir.join(config::MENTIONS_FILE);
        if path.exists() {
            Ok(path)
        } else {
            Err(StockMentionsError::NotFound(format!(
                "{} is not in the data directory; run the extraction stage first",
                config::MENTIONS_FILE
            )))
        }
    }

    /// Path of a known JSON file (registry, reverse LUT, manifest).
    pub fn json_path(&self, name: &str) -> Result<PathBuf> {
        let json_files = config::json_files();
        let filename = json_files
            .get(name)
            .ok_or_else(|| StockMentionsError::NotFound(format!("Unknown JSON file: {}", name)))?;
        Ok(self.data_dir.join(filename))
    }

    /// Load and parse a known JSON file.
    ///
    /// If the file is corrupt (truncated write, disk error), it is deleted
    /// automatically and the error surfaced, since corrupt pipeline state
    /// must not be silently recovered.
    pub fn load_json(&self, name: &str) -> Result<serde_json::Value> {
        let path = self.json_path(name)?;
        if !path.exists() {
            return Err(StockMentionsError::NotFound(format!(
                "JSON file '{}' is not in the data directory",
                name
            )));
        }

        let contents = fs::read_to_string(&path)?;
        match serde_json::from_str(&contents) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("Corrupt data file {}: {} -- removing", path.display(), e);
                let _ = fs::remove_file(&path);
                Err(StockMentionsError::NotFound(format!(
                    "Data file '{}' was corrupt and has been removed. \
                     Re-run the producing stage. Original error: {}",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown"),
                    e
                )))
            }
        }
    }

    /// Serialize a value to a known JSON file.
    pub fn save_json(&self, name: &str, value: &serde_json::Value) -> Result<()> {
        let path = self.json_path(name)?;
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    /// Load and parse the dataset manifest, if present.
    pub fn manifest(&self) -> Result<Option<Manifest>> {
        match self.load_json("manifest") {
            Ok(value) => Ok(Some(serde_json::from_value(value)?)),
            Err(StockMentionsError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write the dataset manifest.
    pub fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        self.save_json("manifest", &serde_json::to_value(manifest)?)
    }

    /// Download a single file, writing to a temp path and renaming on success.
    fn download_file(&mut self, url: &str, dest: &Path) -> Result<()> {
        log::info!("Downloading {}", url);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_dest = dest.with_extension(format!(
            "{}.tmp",
            dest.extension().and_then(|e| e.to_str()).unwrap_or("")
        ));

        let client = self.client().clone();
        let result = (|| -> Result<()> {
            let resp = client.get(url).send()?.error_for_status()?;
            let bytes = resp.bytes()?;
            fs::write(&tmp_dest, &bytes)?;
            fs::rename(&tmp_dest, dest)?;
            Ok(())
        })();

        if result.is_err() {
            // Clean up partial temp file on any error
            let _ = fs::remove_file(&tmp_dest);
        }

        result
    }

    /// Remove all local files and recreate the data directory.
    pub fn clear(&self) -> Result<()> {
        if self.data_dir.exists() {
            fs::remove_dir_all(&self.data_dir)?;
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    /// Close the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}
