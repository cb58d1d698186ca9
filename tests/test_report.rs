//! Percentage formatting and record persistence round-trip tests.

use stockmentions_sdk::backtest::report::{
    load_records_csv, load_records_json, percentage_returns, save_records_csv,
    save_records_json, ReturnReport,
};
use stockmentions_sdk::models::report::{parse_price_list, ReturnRecord};

fn record(price_list: Vec<Option<f64>>) -> ReturnRecord {
    ReturnRecord {
        ticker: "TSLA".to_string(),
        date_mentioned: "2024-04-10".to_string(),
        extra_days: 0,
        price_on_mentioned: Some(170.0),
        ndays_list: (0..price_list.len() as i64).collect(),
        price_list,
        extra_day_list: vec![0; 4],
    }
}

// ---------------------------------------------------------------------------
// percentage_returns
// ---------------------------------------------------------------------------

#[test]
fn percentages_are_relative_to_first_offset_price() {
    let record = record(vec![Some(100.0), Some(110.0), None, Some(90.0)]);
    let pcts = percentage_returns(&record);
    assert_eq!(pcts, vec![Some(0.0), Some(10.0), None, Some(-10.0)]);
}

#[test]
fn null_baseline_nulls_every_percentage() {
    let record = record(vec![None, Some(110.0), Some(90.0)]);
    let pcts = percentage_returns(&record);
    assert_eq!(pcts, vec![None, None, None]);
}

#[test]
fn zero_baseline_nulls_every_percentage() {
    let record = record(vec![Some(0.0), Some(110.0)]);
    let pcts = percentage_returns(&record);
    assert_eq!(pcts, vec![None, None]);
}

#[test]
fn percentages_round_to_two_decimals() {
    let record = record(vec![Some(3.0), Some(4.0)]);
    let pcts = percentage_returns(&record);
    assert_eq!(pcts, vec![Some(0.0), Some(33.33)]);
}

#[test]
fn mention_price_does_not_affect_percentages() {
    // The baseline is the first offset price, not the mention-date price
    let mut r = record(vec![Some(200.0), Some(220.0)]);
    r.price_on_mentioned = Some(50.0);
    let pcts = percentage_returns(&r);
    assert_eq!(pcts, vec![Some(0.0), Some(10.0)]);
}

// ---------------------------------------------------------------------------
// ReturnReport
// ---------------------------------------------------------------------------

#[test]
fn report_names_columns_by_offset_value() {
    let mut r = record(vec![Some(180.0), Some(175.0)]);
    r.ndays_list = vec![14, 30];
    r.extra_day_list = vec![0, 1];

    let report = ReturnReport::build(&[r]);
    assert_eq!(
        report.header(),
        &[
            "ticker",
            "date_mentioned",
            "extra_days",
            "price_on_mentioned",
            "nday_14_r",
            "nday_30_r"
        ]
    );
    assert_eq!(report.rows().len(), 1);
}

#[test]
fn report_rows_carry_percentages_and_blanks() {
    let mut r = record(vec![Some(100.0), None]);
    r.ndays_list = vec![14, 30];
    r.extra_day_list = vec![0, 0];

    let report = ReturnReport::build(&[r]);
    let row = &report.rows()[0];
    assert_eq!(row[0], "TSLA");
    assert_eq!(row[1], "2024-04-10");
    assert_eq!(row[4], "0");
    assert_eq!(row[5], ""); // null percentage renders as an empty cell
}

#[test]
fn report_csv_output_is_one_row_per_record() {
    let mut r1 = record(vec![Some(100.0), Some(110.0)]);
    r1.ndays_list = vec![14, 30];
    let mut r2 = record(vec![Some(50.0), Some(45.0)]);
    r2.ndays_list = vec![14, 30];
    r2.ticker = "AAPL".to_string();

    let report = ReturnReport::build(&[r1, r2]);
    let mut buf = Vec::new();
    report.write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ticker,date_mentioned,extra_days,price_on_mentioned"));
    assert!(lines[1].contains("TSLA"));
    assert!(lines[2].contains("AAPL"));
    assert!(lines[2].contains("-10"));
}

#[test]
fn empty_record_set_produces_base_columns_only() {
    let report = ReturnReport::build(&[]);
    assert_eq!(report.header().len(), 4);
    assert!(report.rows().is_empty());
}

// ---------------------------------------------------------------------------
// Persistence round-trips
// ---------------------------------------------------------------------------

fn sample_records() -> Vec<ReturnRecord> {
    vec![
        ReturnRecord {
            ticker: "TSLA".to_string(),
            date_mentioned: "2024-04-10".to_string(),
            extra_days: 0,
            price_on_mentioned: Some(170.0),
            ndays_list: vec![14, 30],
            price_list: vec![Some(180.0), None],
            extra_day_list: vec![0, 1],
        },
        ReturnRecord {
            ticker: "AAPL".to_string(),
            date_mentioned: "2024-04-08".to_string(),
            extra_days: 2,
            price_on_mentioned: None,
            ndays_list: vec![14, 30],
            price_list: vec![None, Some(95.5)],
            extra_day_list: vec![0, 0],
        },
    ]
}

#[test]
fn json_round_trip_preserves_records() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("records.json");

    let records = sample_records();
    save_records_json(&records, &path).unwrap();
    let loaded = load_records_json(&path).unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn csv_round_trip_preserves_records_including_nulls() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("records.csv");

    let records = sample_records();
    save_records_csv(&records, &path).unwrap();
    let loaded = load_records_csv(&path).unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn price_list_parses_python_style_none_entries() {
    let parsed = parse_price_list("[180.0, None, nan, 175.5]").unwrap();
    assert_eq!(parsed, vec![Some(180.0), None, None, Some(175.5)]);
}

#[test]
fn price_list_parses_json_style_null_entries() {
    let parsed = parse_price_list("[180.0,null]").unwrap();
    assert_eq!(parsed, vec![Some(180.0), None]);
}

#[test]
fn price_list_rejects_garbage() {
    assert!(parse_price_list("not a list").is_err());
    assert!(parse_price_list("[1.0, banana]").is_err());
}

#[test]
fn empty_price_list_round_trips() {
    let parsed = parse_price_list("[]").unwrap();
    assert!(parsed.is_empty());
}
