// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue records: a captured payload plus the fields the queue manages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::report::ReportPayload;

/// Store-assigned identifier. Monotonically increasing, never reused.
pub type ReportId = i64;

/// Delivery state of a queued report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Waiting for delivery; eligible for the next drain.
    Pending,
    /// Being submitted by the current drain.
    InFlight,
    /// Rejected by the server; held until an operator requeues it.
    DeadLetter,
}

impl ReportStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::InFlight => "in_flight",
            ReportStatus::DeadLetter => "dead_letter",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "in_flight" | "in-flight" => Ok(ReportStatus::InFlight),
            "dead_letter" | "dead-letter" => Ok(ReportStatus::DeadLetter),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A report payload awaiting delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReport {
    pub id: ReportId,
    pub payload: ReportPayload,
    pub created_at: DateTime<Utc>,
    pub status: ReportStatus,
    /// Why the record was dead-lettered, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl PendingReport {
    /// The payload as it goes over the wire. Queue fields never appear in it.
    pub fn wire_body(&self) -> serde_json::Map<String, serde_json::Value> {
        self.payload.wire_body()
    }
}

/// Number of records in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub pending: usize,
    pub in_flight: usize,
    pub dead_letter: usize,
}

impl QueueCounts {
    /// Records not yet acknowledged by the server, in any state.
    pub fn undelivered(&self) -> usize {
        self.pending + self.in_flight + self.dead_letter
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
