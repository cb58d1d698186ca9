use serde::{Deserialize, Serialize};

use crate::error::{Result, StockMentionsError};

// ---------------------------------------------------------------------------
// ReturnRecord — One evaluated mention with forward prices
// ---------------------------------------------------------------------------

/// Output of evaluating one mention: the resolved baseline plus one price
/// and extra-days entry per requested offset, in offset order.
///
/// Created once per successfully resolved mention by the batch evaluator and
/// immutable afterwards; the report formatter consumes it to add percentage
/// columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub ticker: String,
    pub date_mentioned: String,
    pub extra_days: u32,
    pub price_on_mentioned: Option<f64>,
    pub ndays_list: Vec<i64>,
    pub price_list: Vec<Option<f64>>,
    pub extra_day_list: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Textual list parsing — CSV round-trip support
// ---------------------------------------------------------------------------

/// Parse a price list from its literal textual representation as stored in a
/// CSV cell, e.g. `[180.0, null]` or the Python-style `[180.0, None]`.
///
/// `null`, `None`, `nan`, and empty entries all read back as null prices.
pub fn parse_price_list(text: &str) -> Result<Vec<Option<f64>>> {
    parse_list(text, |entry| {
        entry
            .parse::<f64>()
            .map(|p| if p.is_nan() { None } else { Some(p) })
            .map_err(|_| bad_entry(entry))
    })
}

/// Parse an offset-day list from its textual representation, e.g. `[14, 30]`.
pub fn parse_i64_list(text: &str) -> Result<Vec<i64>> {
    let parsed = parse_list(text, |entry| {
        entry.parse::<i64>().map(Some).map_err(|_| bad_entry(entry))
    })?;
    // i64 entries are never null; flatten is total here
    Ok(parsed.into_iter().flatten().collect())
}

/// Parse an extra-days list from its textual representation, e.g. `[0, 1]`.
pub fn parse_u32_list(text: &str) -> Result<Vec<u32>> {
    let parsed = parse_list(text, |entry| {
        entry.parse::<u32>().map(Some).map_err(|_| bad_entry(entry))
    })?;
    Ok(parsed.into_iter().flatten().collect())
}

fn parse_list<T>(
    text: &str,
    parse_entry: impl Fn(&str) -> Result<Option<T>>,
) -> Result<Vec<Option<T>>> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| {
            StockMentionsError::InvalidArgument(format!("Not a list literal: {:?}", text))
        })?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() || entry.eq_ignore_ascii_case("null")
                || entry.eq_ignore_ascii_case("none")
                || entry.eq_ignore_ascii_case("nan")
            {
                Ok(None)
            } else {
                parse_entry(entry)
            }
        })
        .collect()
}

fn bad_entry(entry: &str) -> StockMentionsError {
    StockMentionsError::InvalidArgument(format!("Unparseable list entry: {:?}", entry))
}
