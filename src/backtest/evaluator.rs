//! Mention evaluation: baseline resolution plus forward price points.

use chrono::{Duration, NaiveDate};

use crate::connection::Connection;
use crate::error::Result;
use crate::models::mention::MentionRecord;
use crate::models::price::{date_key, PriceSeries, ResolvedPoint};
use crate::models::report::ReturnRecord;
use crate::queries::prices::PriceQuery;
use crate::registry::MissingTickerRegistry;

use super::resolver::resolve_next_trading_day;

// ---------------------------------------------------------------------------
// Single-mention evaluation
// ---------------------------------------------------------------------------

/// Baseline plus per-offset price points for one mention.
#[derive(Debug, Clone, PartialEq)]
pub struct MentionEvaluation {
    /// The resolved mention-date baseline.
    pub mentioned: ResolvedPoint,
    /// One nullable price per requested offset, in offset order.
    pub prices: Vec<Option<f64>>,
    /// Parallel extra-days counts; `0` whenever the price entry is null.
    pub extra_days: Vec<u32>,
}

/// Parse an 8-digit `YYYYMMDD` integer into a calendar date.
///
/// Anything that is not 8 digits or not a real calendar date is `None`.
pub fn parse_mention_date(yyyymmdd: i64) -> Option<NaiveDate> {
    if !(10_000_000..=99_991_231).contains(&yyyymmdd) {
        return None;
    }
    let year = (yyyymmdd / 10_000) as i32;
    let month = ((yyyymmdd / 100) % 100) as u32;
    let day = (yyyymmdd % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Evaluate one mention against a price series.
///
/// The baseline is the mention date itself when present in the series,
/// otherwise the next trading day; when even that resolution fails the whole
/// evaluation is `None`, since a mention with no subsequent trading data
/// anywhere is not usable.
///
/// Offsets are measured from the anchor (the resolved baseline date) and are
/// independent: one offset landing past the end of the data yields a
/// `(None, 0)` entry without disturbing the others. A present date whose
/// stored price is null or NaN also degrades to `(None, 0)`.
pub fn evaluate_mention(
    series: &PriceSeries,
    mention_date: i64,
    offsets: &[i64],
) -> Option<MentionEvaluation> {
    let parsed = parse_mention_date(mention_date)?;
    let mention_key = date_key(parsed);

    let (anchor, mentioned) = if series.contains_date(&mention_key) {
        let baseline = ResolvedPoint {
            price: series.close_at(&mention_key),
            date_key: mention_key,
            extra_days: 0,
        };
        (parsed, baseline)
    } else {
        let resolved = resolve_next_trading_day(series, parsed);
        if !resolved.is_found() {
            return None;
        }
        let anchor = parsed + Duration::days(i64::from(resolved.extra_days));
        (anchor, resolved)
    };

    let mut prices = Vec::with_capacity(offsets.len());
    let mut extra_days = Vec::with_capacity(offsets.len());

    for &offset in offsets {
        let (price, extra) = match anchor.checked_add_signed(Duration::days(offset)) {
            None => (None, 0),
            Some(target) => {
                let key = date_key(target);
                if series.contains_date(&key) {
                    (series.close_at(&key), 0)
                } else {
                    let resolved = resolve_next_trading_day(series, target);
                    match resolved.price {
                        Some(price) if resolved.is_found() => (Some(price), resolved.extra_days),
                        _ => (None, 0),
                    }
                }
            }
        };
        prices.push(price);
        extra_days.push(extra);
    }

    Some(MentionEvaluation {
        mentioned,
        prices,
        extra_days,
    })
}

// ---------------------------------------------------------------------------
// BacktestRunner — batch evaluation
// ---------------------------------------------------------------------------

/// Batch evaluator over a mention collection.
///
/// Walks records in input order, skipping (with a logged reason) anything
/// unevaluable: malformed tickers, registry hits, tickers without a price
/// series, and mentions whose dates cannot be resolved. Skips never abort
/// the batch; the output is a best-effort subset and shrinkage is expected.
pub struct BacktestRunner<'a> {
    conn: &'a Connection,
}

impl<'a> BacktestRunner<'a> {
    /// Create a new `BacktestRunner` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Evaluate every record, producing one [`ReturnRecord`] per success.
    ///
    /// Storage-level failures (corrupt LUT, DuckDB errors) are fatal and
    /// propagate; per-record data gaps are not.
    pub fn evaluate_all(
        &self,
        records: &[MentionRecord],
        offsets: &[i64],
    ) -> Result<Vec<ReturnRecord>> {
        let registry = MissingTickerRegistry::load(&self.conn.store.borrow())?;
        let prices = PriceQuery::new(self.conn);

        let mut out = Vec::new();
        for record in records {
            let Some(ticker) = record.normalized_ticker() else {
                log::warn!(
                    "Skipping mention of {:?}: unusable stock code {:?}",
                    record.stock,
                    record.stock_code
                );
                continue;
            };
            if registry.contains(&ticker) {
                log::warn!("Skipping {}: in the missing-ticker registry", ticker);
                continue;
            }
            let Some(series) = prices.series(&ticker)? else {
                log::warn!("Skipping {}: no price series available", ticker);
                continue;
            };
            let Some(eval) = evaluate_mention(&series, record.date, offsets) else {
                log::warn!(
                    "Skipping {}: date {} could not be resolved against its series",
                    ticker,
                    record.date
                );
                continue;
            };

            out.push(ReturnRecord {
                ticker,
                date_mentioned: eval.mentioned.date_key,
                extra_days: eval.mentioned.extra_days,
                price_on_mentioned: eval.mentioned.price,
                ndays_list: offsets.to_vec(),
                price_list: eval.prices,
                extra_day_list: eval.extra_days,
            });
        }

        log::info!(
            "Evaluated {} of {} mention records",
            out.len(),
            records.len()
        );
        Ok(out)
    }
}
