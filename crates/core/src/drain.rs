// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drain results.
//!
//! A drain is one pass over the pending snapshot. Each record gets exactly one
//! [`RecordOutcome`]; the [`DrainSummary`] tallies them into
//! succeeded / retried-later / failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pending::ReportId;

/// What started a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainTrigger {
    /// The connectivity monitor saw an offline → online transition.
    BecameOnline,
    /// An explicit "sync now" request.
    Manual,
    /// A report was submitted directly while a backlog existed.
    Capture,
}

impl DrainTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainTrigger::BecameOnline => "became_online",
            DrainTrigger::Manual => "manual",
            DrainTrigger::Capture => "capture",
        }
    }
}

impl fmt::Display for DrainTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a drain left a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// Acknowledged by the server and removed locally.
    Delivered,
    /// Transient failure; still pending.
    RetryLater { reason: String },
    /// Credential rejected or missing; still pending until it is refreshed.
    NeedsCredential { reason: String },
    /// Rejected by the server; moved to dead-letter.
    DeadLettered { reason: String },
    /// Local storage failed while handling this record.
    StorageError { reason: String },
}

/// Which summary bucket an outcome counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    Succeeded,
    RetriedLater,
    Failed,
}

impl RecordOutcome {
    pub fn tally(&self) -> Tally {
        match self {
            RecordOutcome::Delivered => Tally::Succeeded,
            RecordOutcome::RetryLater { .. } => Tally::RetriedLater,
            RecordOutcome::NeedsCredential { .. }
            | RecordOutcome::DeadLettered { .. }
            | RecordOutcome::StorageError { .. } => Tally::Failed,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RecordOutcome::Delivered => None,
            RecordOutcome::RetryLater { reason }
            | RecordOutcome::NeedsCredential { reason }
            | RecordOutcome::DeadLettered { reason }
            | RecordOutcome::StorageError { reason } => Some(reason),
        }
    }
}

/// The outcome for one record of a drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResult {
    pub id: ReportId,
    pub outcome: RecordOutcome,
}

/// Summary of one drain pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainSummary {
    pub trigger: DrainTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub succeeded: usize,
    pub retried_later: usize,
    pub failed: usize,
    pub results: Vec<RecordResult>,
}

impl DrainSummary {
    /// Starts an empty summary.
    pub fn begin(trigger: DrainTrigger) -> Self {
        DrainSummary {
            trigger,
            started_at: Utc::now(),
            finished_at: None,
            succeeded: 0,
            retried_later: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    /// Records the outcome for one record.
    pub fn push(&mut self, id: ReportId, outcome: RecordOutcome) {
        match outcome.tally() {
            Tally::Succeeded => self.succeeded += 1,
            Tally::RetriedLater => self.retried_later += 1,
            Tally::Failed => self.failed += 1,
        }
        self.results.push(RecordResult { id, outcome });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of records processed.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// True when every processed record was delivered.
    pub fn is_clean(&self) -> bool {
        self.retried_later == 0 && self.failed == 0
    }

    pub fn outcome_for(&self, id: ReportId) -> Option<&RecordOutcome> {
        self.results
            .iter()
            .find(|r| r.id == id)
            .map(|r| &r.outcome)
    }
}

impl fmt::Display for DrainSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} retried later, {} failed",
            self.succeeded, self.retried_later, self.failed
        )
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
