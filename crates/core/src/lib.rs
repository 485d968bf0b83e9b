// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! phip-core: offline report queue for the phip facility client.
//!
//! This crate holds the data model shared by the submission pipeline and the
//! durable SQLite store that keeps reports until the server acknowledges them.
//!
//! - [`ReportPayload`] / [`DailyReport`]: what a facility submits
//! - [`PendingReport`]: a payload plus queue-managed id, timestamp and status
//! - [`ReportStore`]: the durable queue
//! - [`DrainSummary`]: per-record results of one pass over the queue

pub mod drain;
pub mod error;
pub mod pending;
pub mod report;
pub mod store;

pub use drain::{DrainSummary, DrainTrigger, RecordOutcome, RecordResult, Tally};
pub use error::{Error, Result};
pub use pending::{PendingReport, QueueCounts, ReportId, ReportStatus};
pub use report::{DailyReport, ReportPayload, StockLevel, RESERVED_KEYS};
pub use store::{drain_lock_path, DrainLock, ReportStore};
