use std::collections::HashMap;
use std::path::PathBuf;

/// Default endpoint serving the per-group daily price CSVs.
pub const PRICE_ENDPOINT_BASE: &str = "https://data.stockmentions.dev/api/v1";

/// Default OpenAI-compatible chat-completions endpoint for opinion extraction.
pub const LLM_API_BASE: &str = "https://api.openai.com/v1";

/// Batch download APIs reject requests above this many tickers, so price
/// history is fetched in groups of this size and the reverse lookup table
/// maps each ticker back to its group.
pub const CHUNK_SIZE: usize = 20;

/// Upper bound on the forward calendar-day scan when resolving a date with
/// no price data to the next trading day. Past this many advances the search
/// reports not-found instead of walking into the indefinite future.
pub const MAX_FORWARD_SCAN_DAYS: u32 = 100;

/// Date-key format used by every price view and series index.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Chat models accepted by the opinion extractor.
pub const VALID_LLM_MODELS: [&str; 4] = ["gpt-4.1-mini", "gpt-4o-mini", "gpt-4o", "o4-mini"];

/// File name of the aggregated mention table inside the data directory.
pub const MENTIONS_FILE: &str = "mentions.csv";

/// File name of a downloaded price group CSV (long format:
/// `date,ticker,open,high,low,close,volume`).
pub fn price_group_file(group: usize) -> String {
    format!("stock_group{}.csv", group)
}

/// Logical view name registered in DuckDB for a price group CSV.
pub fn price_group_view(group: usize) -> String {
    format!("prices_group{}", group)
}

pub fn json_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("missing_tickers", "missing_tickers.json"),
        ("reverse_lut", "reverse_lut.json"),
        ("manifest", "manifest.json"),
    ])
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("stockmentions-sdk")
    } else {
        PathBuf::from(".stockmentions-sdk-data")
    }
}
