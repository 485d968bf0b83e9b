// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Store-and-forward delivery of facility reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Capture   │────►│  Submitter  │────►│  Reporting  │
//! │ (CapturePath)│    │   (trait)   │     │     API     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │ offline / retryable  ▲
//!        ▼                      │ drain
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ReportStore │◄────│ Coordinator │◄────│   Monitor   │
//! │  (SQLite)   │     │   (drain)   │     │  (online?)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Immediate submission when online, durable queue otherwise
//! - Drain on every offline → online transition, in insertion order
//! - At most one drain at a time; extra triggers coalesce
//! - Per-record classification: retry later, wait for credential, dead-letter
//! - Injectable submitter and probe traits for testing

mod capture;
mod client;
mod coordinator;
mod credential;
mod monitor;

use std::sync::Arc;

use phip_core::ReportStore;

pub use capture::{CaptureOutcome, CapturePath, CaptureReceipt, QueueReason};
pub use client::{
    classify_response, parse_detail, submit_with_source, Ack, FailureClass, Feedback,
    HttpSubmitter, ReportSubmitter, SubmitError, SubmitResult,
};
pub use coordinator::{DrainOutcome, SyncCoordinator, SyncState};
pub use credential::{Credential, CredentialSource, StaticToken, TokenFile};
pub use monitor::{ConnectivityEvent, ConnectivityMonitor, HttpProbe, Probe};

/// Runs a store operation on the blocking pool.
pub(crate) async fn with_store<T, F>(store: &Arc<ReportStore>, f: F) -> phip_core::Result<T>
where
    F: FnOnce(&ReportStore) -> phip_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| phip_core::Error::StorageUnavailable(format!("storage task failed: {}", e)))?
}

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
mod capture_tests;
