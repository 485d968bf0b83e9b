// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for phip-core operations.

use thiserror::Error;

/// All possible errors that can occur in phip-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The local persistence layer could not be reached or refused the write.
    ///
    /// Fatal to capture: the report was not stored and the user must retry.
    #[error("local storage unavailable: {0}\n  hint: the report was not saved, please retry")]
    StorageUnavailable(String),

    #[error("pending report not found: {0}")]
    ReportNotFound(i64),

    #[error("invalid stock level: '{0}'\n  hint: valid levels are: normal, low, critical, stockout")]
    InvalidStockLevel(String),

    #[error("invalid report status: '{0}'\n  hint: valid statuses are: pending, in_flight, dead_letter")]
    InvalidStatus(String),

    #[error("report payload must be a JSON object")]
    PayloadNotObject,

    #[error("invalid bed occupancy rate: {0}\n  hint: the rate must be a finite number >= 0")]
    InvalidOccupancyRate(f64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::StorageUnavailable(e.to_string())
    }
}

/// A specialized Result type for phip-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
