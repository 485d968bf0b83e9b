// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the capture path.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use phip_core::{DrainTrigger, ReportStore};

use super::capture::*;
use super::client::SubmitError;
use super::coordinator::{DrainOutcome, SyncCoordinator};
use super::credential::StaticToken;
use super::monitor::ConnectivityMonitor;
use super::test_helpers::*;
use crate::error::Error;

fn make_capture(
    submitter: &MockSubmitter,
    online: bool,
) -> (CapturePath<MockSubmitter>, Arc<ConnectivityMonitor>, Arc<ReportStore>) {
    let coordinator = make_coordinator(submitter.clone());
    let store = Arc::clone(coordinator.store());
    let monitor = Arc::new(ConnectivityMonitor::new(online));
    (
        CapturePath::new(Arc::clone(&monitor), coordinator),
        monitor,
        store,
    )
}

#[tokio::test]
async fn test_offline_capture_queues_without_network() {
    let submitter = MockSubmitter::new();
    let (capture, _, store) = make_capture(&submitter, false);

    let receipt = capture.capture(make_payload(1, 5)).await.unwrap();

    let id = receipt.outcome.queued_id().unwrap();
    assert_eq!(
        receipt.outcome,
        CaptureOutcome::QueuedOffline {
            id,
            reason: QueueReason::Offline
        }
    );
    assert_eq!(receipt.outcome.as_str(), "queued-offline");
    assert_eq!(submitter.calls(), 0);
    assert_eq!(store.list_pending().unwrap().len(), 1);
}

#[tokio::test]
async fn test_online_capture_submits_immediately() {
    let submitter = MockSubmitter::new();
    let (capture, _, store) = make_capture(&submitter, true);

    let receipt = capture.capture(make_payload(1, 5)).await.unwrap();

    assert_eq!(receipt.outcome, CaptureOutcome::SubmittedImmediately);
    assert!(receipt.backlog_drain.is_none());
    assert_eq!(submitter.sent_dates(), vec![date_key(1)]);
    assert!(store.list_pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_network_failure_falls_back_to_queue_once() {
    let submitter = MockSubmitter::new();
    submitter.fail_everything(Some(network_error()));
    let (capture, monitor, store) = make_capture(&submitter, true);

    let receipt = capture.capture(make_payload(4, 2)).await.unwrap();

    assert!(matches!(
        receipt.outcome,
        CaptureOutcome::QueuedOffline {
            reason: QueueReason::SubmitFailed(SubmitError::Network(_)),
            ..
        }
    ));
    let pending = store.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payload.report_date(), Some("2026-06-04"));
    assert_eq!(submitter.calls(), 1);
    assert!(!monitor.is_online());
}

#[tokio::test]
async fn test_server_error_falls_back_to_queue() {
    let submitter = MockSubmitter::new();
    submitter.fail_everything(Some(SubmitError::Server { status: 503 }));
    let (capture, monitor, store) = make_capture(&submitter, true);

    let receipt = capture.capture(make_payload(1, 1)).await.unwrap();

    assert!(receipt.outcome.queued_id().is_some());
    assert_eq!(store.counts().unwrap().pending, 1);
    assert!(monitor.is_online());
}

#[tokio::test]
async fn test_missing_credential_falls_back_to_queue() {
    let submitter = MockSubmitter::new();
    let store = Arc::new(ReportStore::open_in_memory().unwrap());
    let coordinator = Arc::new(SyncCoordinator::new(
        Arc::clone(&store),
        submitter.clone(),
        Arc::new(StaticToken::none()),
    ));
    let capture = CapturePath::new(Arc::new(ConnectivityMonitor::new(true)), coordinator);

    let receipt = capture.capture(make_payload(1, 1)).await.unwrap();

    assert!(matches!(
        receipt.outcome,
        CaptureOutcome::QueuedOffline {
            reason: QueueReason::SubmitFailed(SubmitError::Auth(_)),
            ..
        }
    ));
    assert_eq!(store.counts().unwrap().pending, 1);
}

#[tokio::test]
async fn test_rejected_capture_is_not_queued() {
    let submitter = MockSubmitter::new();
    submitter.fail_everything(Some(validation_error()));
    let (capture, _, store) = make_capture(&submitter, true);

    let err = capture.capture(make_payload(1, 1)).await.unwrap_err();

    match err {
        Error::Rejected { status, detail } => {
            assert_eq!(status, 422);
            assert!(detail.contains("fever_cases"));
        }
        other => unreachable!("unexpected error: {other}"),
    }
    assert_eq!(store.counts().unwrap().undelivered(), 0);
}

#[tokio::test]
async fn test_successful_capture_starts_backlog_drain() {
    let submitter = MockSubmitter::new();
    let (capture, _, store) = make_capture(&submitter, true);
    store.enqueue(&make_payload(1, 1)).unwrap();
    store.enqueue(&make_payload(2, 2)).unwrap();

    let receipt = capture.capture(make_payload(3, 3)).await.unwrap();
    assert_eq!(receipt.outcome, CaptureOutcome::SubmittedImmediately);

    let drain = receipt.backlog_drain.expect("backlog drain");
    let outcome = drain.await.unwrap().unwrap();
    let summary = outcome.summary().unwrap();
    assert_eq!(summary.trigger, DrainTrigger::Capture);
    assert_eq!(summary.succeeded, 2);

    assert_eq!(
        submitter.sent_dates(),
        vec![date_key(3), date_key(1), date_key(2)]
    );
    assert!(store.list_pending().unwrap().is_empty());
    assert!(!matches!(outcome, DrainOutcome::Coalesced));
}
