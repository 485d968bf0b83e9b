// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::SubmitError;

/// All possible errors that can occur in the phiprs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] phip_core::Error),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("report rejected by server ({status}): {detail}\n  hint: correct the report and capture it again")]
    Rejected { status: u16, detail: String },

    #[error("offline: cannot reach {url}\n  hint: queued reports are kept; run 'phip sync' once connected")]
    Offline { url: String },

    #[error("no credential available\n  hint: set PHIP_TOKEN or write a token to {path}")]
    NoCredential { path: String },

    #[error("refusing to clear the queue without --yes\n  hint: this deletes {count} undelivered report(s)")]
    ConfirmationRequired { count: usize },

    #[error("{field} is required")]
    FieldRequired { field: &'static str },

    #[error("config error: {0}")]
    Config(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for phiprs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
