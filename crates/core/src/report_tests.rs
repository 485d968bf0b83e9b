// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[parameterized(
    normal = { "normal", StockLevel::Normal },
    low_upper = { "LOW", StockLevel::Low },
    critical_mixed = { "Critical", StockLevel::Critical },
    stockout = { "stockout", StockLevel::Stockout },
    stock_out_dashed = { "stock-out", StockLevel::Stockout },
)]
fn stock_level_parse(input: &str, expected: StockLevel) {
    assert_eq!(input.parse::<StockLevel>().unwrap(), expected);
}

#[test]
fn stock_level_parse_invalid() {
    let err = "plenty".parse::<StockLevel>().unwrap_err();
    assert!(matches!(err, Error::InvalidStockLevel(s) if s == "plenty"));
}

#[test]
fn stock_level_wire_spelling() {
    assert_eq!(serde_json::to_value(StockLevel::Low).unwrap(), json!("Low"));
    assert_eq!(StockLevel::Stockout.to_string(), "Stockout");
}

#[test]
fn daily_report_serializes_api_field_names() {
    let mut report = DailyReport::new(date("2026-10-19"));
    report.fever_cases = 4;
    report.ors_stock_level = StockLevel::Critical;

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["report_date"], json!("2026-10-19"));
    assert_eq!(value["fever_cases"], json!(4));
    assert_eq!(value["ors_stock_level"], json!("Critical"));
    assert_eq!(value["antibiotics_stock_level"], json!("Normal"));
    assert!(value.get("notes").is_none());
}

#[test]
fn daily_report_deserializes_with_defaults() {
    let report: DailyReport = serde_json::from_value(json!({ "report_date": "2026-01-02" })).unwrap();
    assert_eq!(report, DailyReport::new(date("2026-01-02")));
}

#[test]
fn daily_report_rejects_negative_occupancy() {
    let mut report = DailyReport::new(date("2026-10-19"));
    report.bed_occupancy_rate = -0.5;
    assert!(matches!(
        report.into_payload(),
        Err(Error::InvalidOccupancyRate(_))
    ));
}

#[test]
fn daily_report_rejects_nan_occupancy() {
    let mut report = DailyReport::new(date("2026-10-19"));
    report.bed_occupancy_rate = f64::NAN;
    assert!(report.validate().is_err());
}

#[test]
fn into_payload_keeps_every_field() {
    let mut report = DailyReport::new(date("2026-10-19"));
    report.notes = Some("generator down".into());
    let payload = report.into_payload().unwrap();

    assert_eq!(payload.report_date(), Some("2026-10-19"));
    assert_eq!(payload.get("notes"), Some(&json!("generator down")));
    assert_eq!(payload.as_map().len(), 12);
}

#[test]
fn payload_from_value_requires_object() {
    assert!(matches!(
        ReportPayload::from_value(json!([1, 2])),
        Err(Error::PayloadNotObject)
    ));
    assert!(ReportPayload::from_json("{\"a\": 1}").is_ok());
}

#[test]
fn wire_body_strips_reserved_keys() {
    let payload = ReportPayload::from_value(json!({
        "id": 7,
        "createdAt": "2026-10-19T00:00:00Z",
        "created_at": "2026-10-19T00:00:00Z",
        "status": "pending",
        "fever_cases": 3,
        "notes": "kept",
    }))
    .unwrap();

    let body = payload.wire_body();
    for key in RESERVED_KEYS {
        assert!(!body.contains_key(key), "{key} leaked into wire body");
    }
    assert_eq!(body.get("fever_cases"), Some(&json!(3)));
    assert_eq!(body.get("notes"), Some(&json!("kept")));
    // The stored payload itself is untouched.
    assert_eq!(payload.as_map().len(), 6);
}

#[test]
fn payload_json_roundtrip_preserves_unknown_fields() {
    let text = r#"{"report_date":"2026-10-19","custom_field":{"nested":true}}"#;
    let payload = ReportPayload::from_json(text).unwrap();
    let again = ReportPayload::from_json(&payload.to_json().unwrap()).unwrap();
    assert_eq!(payload, again);
    assert_eq!(again.get("custom_field"), Some(&json!({ "nested": true })));
}
