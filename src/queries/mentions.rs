//! Mention queries against the DuckDB `mentions` CSV view.

use crate::connection::Connection;
use crate::error::Result;
use crate::models::mention::MentionRecord;
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// MentionQuery
// ---------------------------------------------------------------------------

/// Query interface for extracted mention records backed by the `mentions` view.
pub struct MentionQuery<'a> {
    conn: &'a Connection,
}

impl<'a> MentionQuery<'a> {
    /// Create a new `MentionQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List mention records in input order, optionally bounded by
    /// 8-digit `YYYYMMDD` dates (inclusive).
    pub fn list(&self, date_from: Option<i64>, date_to: Option<i64>) -> Result<Vec<MentionRecord>> {
        self.conn.ensure_views(&["mentions"])?;

        let mut qb = SqlBuilder::new("mentions");

        if let Some(df) = date_from {
            qb.where_gte("date", &df.to_string());
        }
        if let Some(dt) = date_to {
            qb.where_lte("date", &dt.to_string());
        }

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    /// Like [`list`](Self::list), but keeps only records whose `stock_code`
    /// is present and not the extractor's `N/A` marker.
    ///
    /// Records that pass this filter can still be skipped by the batch
    /// evaluator (whitespace tickers, registry hits, missing series).
    pub fn evaluable(
        &self,
        date_from: Option<i64>,
        date_to: Option<i64>,
    ) -> Result<Vec<MentionRecord>> {
        self.conn.ensure_views(&["mentions"])?;

        let mut qb = SqlBuilder::new("mentions");
        qb.where_clause("stock_code IS NOT NULL", &[]);
        qb.where_clause("stock_code <> ?", &["N/A"]);

        if let Some(df) = date_from {
            qb.where_gte("date", &df.to_string());
        }
        if let Some(dt) = date_to {
            qb.where_lte("date", &dt.to_string());
        }

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    /// Distinct usable ticker symbols across all mentions, sorted.
    ///
    /// This is the input to download planning.
    pub fn distinct_tickers(&self) -> Result<Vec<String>> {
        self.conn.ensure_views(&["mentions"])?;

        let (sql, params) = SqlBuilder::new("mentions")
            .distinct()
            .select(&["stock_code"])
            .where_clause("stock_code IS NOT NULL", &[])
            .where_clause("stock_code <> ?", &["N/A"])
            .order_by(&["stock_code ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("stock_code").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .collect())
    }

    /// Count all mention records.
    pub fn count(&self) -> Result<i64> {
        self.conn.ensure_views(&["mentions"])?;

        let (sql, params) = SqlBuilder::new("mentions")
            .select(&["COUNT(*) AS cnt"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        let cnt = rows
            .first()
            .and_then(|r| r.get("cnt"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        Ok(cnt)
    }
}
