// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    delivered = { RecordOutcome::Delivered, Tally::Succeeded },
    retry = { RecordOutcome::RetryLater { reason: "timeout".into() }, Tally::RetriedLater },
    credential = { RecordOutcome::NeedsCredential { reason: "401".into() }, Tally::Failed },
    dead_letter = { RecordOutcome::DeadLettered { reason: "422".into() }, Tally::Failed },
    storage = { RecordOutcome::StorageError { reason: "disk".into() }, Tally::Failed },
)]
fn outcome_tally(outcome: RecordOutcome, expected: Tally) {
    assert_eq!(outcome.tally(), expected);
}

#[test]
fn summary_counts_outcomes() {
    let mut summary = DrainSummary::begin(DrainTrigger::Manual);
    summary.push(1, RecordOutcome::Delivered);
    summary.push(
        2,
        RecordOutcome::RetryLater {
            reason: "network".into(),
        },
    );
    summary.push(3, RecordOutcome::Delivered);
    summary.finish();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.retried_later, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total(), 3);
    assert!(!summary.is_clean());
    assert!(summary.finished_at.is_some());
    assert_eq!(summary.outcome_for(2).and_then(|o| o.reason()), Some("network"));
    assert_eq!(
        summary.to_string(),
        "2 succeeded, 1 retried later, 0 failed"
    );
}

#[test]
fn empty_summary_is_clean() {
    let summary = DrainSummary::begin(DrainTrigger::BecameOnline);
    assert!(summary.is_clean());
    assert_eq!(summary.total(), 0);
}

#[test]
fn summary_json_roundtrip() {
    let mut summary = DrainSummary::begin(DrainTrigger::Capture);
    summary.push(
        9,
        RecordOutcome::DeadLettered {
            reason: "report_date: field required".into(),
        },
    );
    summary.finish();

    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"kind\":\"dead_lettered\""));
    let back: DrainSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}
