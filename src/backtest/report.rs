//! Percentage-return report formatting and record persistence.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::report::{parse_i64_list, parse_price_list, parse_u32_list, ReturnRecord};

// ---------------------------------------------------------------------------
// Percentage computation
// ---------------------------------------------------------------------------

/// Percentage returns for one record, rounded to 2 decimals.
///
/// The baseline `p0` is the first entry of the offset price list, not the
/// mention-date price. That asymmetry is the observed contract of the
/// pipeline and is preserved deliberately; see DESIGN.md.
///
/// Entries are null when the offset price is null, and every entry is null
/// when `p0` is null or zero.
pub fn percentage_returns(record: &ReturnRecord) -> Vec<Option<f64>> {
    let p0 = record.price_list.first().copied().flatten();
    record
        .price_list
        .iter()
        .map(|pi| match (*pi, p0) {
            (Some(pi), Some(p0)) if p0 != 0.0 => Some(round2((pi - p0) / p0 * 100.0)),
            _ => None,
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// ReturnReport — tabular output
// ---------------------------------------------------------------------------

/// Tabular report: one row per record, one `nday_{n}_r` percentage column
/// per offset (named by offset value, taken from the first record's offset
/// list; batches share one offset list).
pub struct ReturnReport {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReturnReport {
    /// Build the report table from evaluated records.
    pub fn build(records: &[ReturnRecord]) -> Self {
        let mut header = vec![
            "ticker".to_string(),
            "date_mentioned".to_string(),
            "extra_days".to_string(),
            "price_on_mentioned".to_string(),
        ];
        if let Some(first) = records.first() {
            for nday in &first.ndays_list {
                header.push(format!("nday_{}_r", nday));
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                let mut row = vec![
                    record.ticker.clone(),
                    record.date_mentioned.clone(),
                    record.extra_days.to_string(),
                    fmt_opt(record.price_on_mentioned),
                ];
                for pct in percentage_returns(record) {
                    row.push(fmt_opt(pct));
                }
                row
            })
            .collect();

        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Write the report as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut w = csv::Writer::from_writer(writer);
        w.write_record(&self.header)?;
        for row in &self.rows {
            w.write_record(row)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Write the report as a CSV file.
    pub fn write_csv_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = fs::File::create(path)?;
        self.write_csv(file)
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Record persistence — JSON and CSV round-trip
// ---------------------------------------------------------------------------

/// Persist evaluated records as a JSON array.
pub fn save_records_json(records: &[ReturnRecord], path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(records)?)?;
    Ok(())
}

/// Load evaluated records from a JSON array.
pub fn load_records_json(path: impl AsRef<Path>) -> Result<Vec<ReturnRecord>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// CSV row shape for record persistence; list columns hold their literal
/// textual representation.
#[derive(Serialize, Deserialize)]
struct RecordRow {
    ticker: String,
    date_mentioned: String,
    extra_days: u32,
    price_on_mentioned: Option<f64>,
    ndays_list: String,
    price_list: String,
    extra_day_list: String,
}

/// Persist evaluated records as CSV with textual list columns.
pub fn save_records_csv(records: &[ReturnRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut w = csv::Writer::from_path(path)?;
    for record in records {
        w.serialize(RecordRow {
            ticker: record.ticker.clone(),
            date_mentioned: record.date_mentioned.clone(),
            extra_days: record.extra_days,
            price_on_mentioned: record.price_on_mentioned,
            ndays_list: serde_json::to_string(&record.ndays_list)?,
            price_list: serde_json::to_string(&record.price_list)?,
            extra_day_list: serde_json::to_string(&record.extra_day_list)?,
        })?;
    }
    w.flush()?;
    Ok(())
}

/// Load evaluated records from CSV, parsing the textual list columns back
/// into values (tolerating Python-style `None` entries).
pub fn load_records_csv(path: impl AsRef<Path>) -> Result<Vec<ReturnRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for row in reader.deserialize::<RecordRow>() {
        let row = row?;
        out.push(ReturnRecord {
            ticker: row.ticker,
            date_mentioned: row.date_mentioned,
            extra_days: row.extra_days,
            price_on_mentioned: row.price_on_mentioned,
            ndays_list: parse_i64_list(&row.ndays_list)?,
            price_list: parse_price_list(&row.price_list)?,
            extra_day_list: parse_u32_list(&row.extra_day_list)?,
        });
    }
    Ok(out)
}
