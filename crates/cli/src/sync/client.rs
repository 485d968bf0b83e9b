// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Submission client for the reporting API.
//!
//! Provides a trait-based submission layer that enables:
//! - Real HTTP submission for production ([`HttpSubmitter`])
//! - Mock submitters for unit testing
//!
//! Every failed attempt is classified so callers can decide whether the
//! report stays queued, waits for a credential, or is set aside.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::credential::{Credential, CredentialSource};
use crate::config::Config;

/// Error type for submission attempts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// No response: connect failure, reset, DNS, I/O.
    #[error("network error: {0}")]
    Network(String),

    /// The attempt exceeded the request timeout.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Server-side or throttling failure (5xx, 408, 429).
    #[error("server error (HTTP {status})")]
    Server { status: u16 },

    /// Missing, expired, or refused credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server refused the report itself.
    #[error("validation failed (HTTP {status}): {detail}")]
    Validation { status: u16, detail: String },

    /// A success response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// How a failed attempt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Try again on the next drain.
    Retryable,
    /// Deliverable once the credential is refreshed.
    NeedsCredential,
    /// Retrying the same payload cannot succeed.
    Rejected,
}

impl SubmitError {
    pub fn class(&self) -> FailureClass {
        match self {
            SubmitError::Network(_) | SubmitError::Timeout(_) | SubmitError::Server { .. } => {
                FailureClass::Retryable
            }
            SubmitError::Auth(_) => FailureClass::NeedsCredential,
            SubmitError::Validation { .. } | SubmitError::Decode(_) => FailureClass::Rejected,
        }
    }
}

/// Result type for submission attempts.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Acknowledgment of an accepted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
}

/// Facility feedback returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub risk_level: String,
    pub risk_trend: String,
    pub warning_message: String,
    #[serde(default)]
    pub comparison: BTreeMap<String, f64>,
}

/// Submits report bodies to the remote API.
///
/// The body is already stripped of queue-management fields.
pub trait ReportSubmitter: Send + Sync {
    fn submit<'a>(
        &'a self,
        body: &'a Map<String, Value>,
        credential: &'a Credential,
    ) -> Pin<Box<dyn Future<Output = SubmitResult<Ack>> + Send + 'a>>;
}

/// Submits with whatever credential the source currently holds.
///
/// No credential is an authentication failure; the network is not touched.
pub async fn submit_with_source<S>(
    submitter: &S,
    credentials: &dyn CredentialSource,
    body: &Map<String, Value>,
) -> SubmitResult<Ack>
where
    S: ReportSubmitter + ?Sized,
{
    let credential = credentials
        .credential()
        .await
        .ok_or_else(|| SubmitError::Auth("no credential available".to_string()))?;
    submitter.submit(body, &credential).await
}

/// Maps an HTTP response onto an acknowledgment or a classified error.
pub fn classify_response(status: u16, body: &str) -> SubmitResult<Ack> {
    match status {
        200..=299 => Ok(Ack { status }),
        401 | 403 => Err(SubmitError::Auth(format!(
            "HTTP {}: {}",
            status,
            parse_detail(body)
        ))),
        408 | 429 => Err(SubmitError::Server { status }),
        400..=499 => Err(SubmitError::Validation {
            status,
            detail: parse_detail(body),
        }),
        _ => Err(SubmitError::Server { status }),
    }
}

/// Extracts a readable message from an error body.
///
/// Understands `{"detail": "..."}` and `{"detail": [{"loc": [...], "msg": "..."}]}`;
/// anything else is returned as-is.
pub fn parse_detail(body: &str) -> String {
    let body = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<String> = items.iter().filter_map(format_detail_item).collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }
    if body.is_empty() {
        "no detail provided".to_string()
    } else {
        body.to_string()
    }
}

fn format_detail_item(item: &Value) -> Option<String> {
    let msg = item.get("msg")?.as_str()?;
    let field = item
        .get("loc")
        .and_then(Value::as_array)
        .and_then(|loc| loc.last())
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    Some(match field {
        Some(field) => format!("{}: {}", field, msg),
        None => msg.to_string(),
    })
}

/// HTTP submitter using reqwest.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    report_url: String,
    feedback_url: String,
    timeout: Duration,
}

impl HttpSubmitter {
    pub fn new(
        report_url: impl Into<String>,
        feedback_url: impl Into<String>,
        timeout: Duration,
    ) -> SubmitResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(HttpSubmitter {
            client,
            report_url: report_url.into(),
            feedback_url: feedback_url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> SubmitResult<Self> {
        Self::new(
            config.report_url(),
            config.feedback_url(),
            config.request_timeout(),
        )
    }

    pub fn report_url(&self) -> &str {
        &self.report_url
    }

    /// Fetches risk feedback for the authenticated facility.
    pub async fn fetch_feedback(&self, credential: &Credential) -> SubmitResult<Feedback> {
        let response = self
            .client
            .get(&self.feedback_url)
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        classify_response(status, &body)?;
        serde_json::from_str(&body).map_err(|e| SubmitError::Decode(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> SubmitError {
        if e.is_timeout() {
            SubmitError::Timeout(self.timeout)
        } else {
            SubmitError::Network(e.to_string())
        }
    }
}

impl ReportSubmitter for HttpSubmitter {
    fn submit<'a>(
        &'a self,
        body: &'a Map<String, Value>,
        credential: &'a Credential,
    ) -> Pin<Box<dyn Future<Output = SubmitResult<Ack>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.report_url)
                .bearer_auth(credential.expose())
                .json(body)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status().as_u16();
            if response.status().is_success() {
                return Ok(Ack { status });
            }
            // An unreadable error body still carries a usable status.
            let text = response.text().await.unwrap_or_default();
            classify_response(status, &text)
        })
    }
}
