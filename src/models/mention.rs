use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MentionRecord — One extracted opinion event
// ---------------------------------------------------------------------------

/// A single stock opinion extracted from a video transcript.
///
/// `stock_code` comes back from the extractor as a ticker symbol, `N/A`, or
/// nothing at all; `date` is the video date as an 8-digit `YYYYMMDD`
/// integer. `opinion`, `source`, and `quote` are passthrough metadata the
/// evaluator never inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionRecord {
    pub stock: String,
    #[serde(default)]
    pub stock_code: Option<String>,
    #[serde(default)]
    pub opinion: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    pub date: i64,
}

impl MentionRecord {
    /// Normalize the ticker for evaluation: trim and uppercase.
    ///
    /// Returns `None` when the code is missing, empty after trimming,
    /// contains internal whitespace, or is the extractor's `N/A` marker.
    /// All of these make the record unevaluable.
    pub fn normalized_ticker(&self) -> Option<String> {
        let raw = self.stock_code.as_deref()?.trim();
        if raw.is_empty() || raw.split_whitespace().count() != 1 {
            return None;
        }
        let upper = raw.to_uppercase();
        if upper == "N/A" {
            return None;
        }
        Some(upper)
    }
}
