//! Trading-day resolution against a sparse price series.

use chrono::NaiveDate;

use crate::config;
use crate::models::price::{date_key, PriceSeries, ResolvedPoint};

/// Find the nearest date strictly after `target` that has data in `series`.
///
/// Probes forward one calendar day at a time starting from `target + 1`;
/// `extra_days` counts the probes taken, so a hit on the immediately
/// following day reports `extra_days = 1`. Callers handle the exact-match
/// case themselves (an exact hit reports `extra_days = 0` and never reaches
/// this function).
///
/// The scan gives up after [`config::MAX_FORWARD_SCAN_DAYS`] advances and
/// returns [`ResolvedPoint::not_found`], which keeps a mention near the end
/// of a finite series from walking into the indefinite future.
pub fn resolve_next_trading_day(series: &PriceSeries, target: NaiveDate) -> ResolvedPoint {
    let mut probe = target;
    let mut extra_days: u32 = 0;

    while extra_days < config::MAX_FORWARD_SCAN_DAYS {
        probe = match probe.succ_opt() {
            Some(next) => next,
            None => return ResolvedPoint::not_found(),
        };
        extra_days += 1;

        let key = date_key(probe);
        if series.contains_date(&key) {
            return ResolvedPoint {
                price: series.close_at(&key),
                date_key: key,
                extra_days,
            };
        }
    }

    ResolvedPoint::not_found()
}
