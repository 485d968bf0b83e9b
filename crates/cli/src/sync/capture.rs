// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capture path: submit now if possible, otherwise queue.

use std::fmt;
use std::sync::Arc;

use phip_core::{DrainTrigger, ReportId, ReportPayload};
use tokio::task::JoinHandle;

use super::client::{submit_with_source, FailureClass, ReportSubmitter, SubmitError};
use super::coordinator::{DrainOutcome, SyncCoordinator};
use super::monitor::ConnectivityMonitor;
use super::with_store;
use crate::error::{Error, Result};

/// Why a captured report went to the queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueReason {
    /// The monitor considered us offline; no attempt was made.
    Offline,
    /// The immediate attempt failed in a way a later drain can fix.
    SubmitFailed(SubmitError),
}

/// Which path a capture took.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    SubmittedImmediately,
    QueuedOffline { id: ReportId, reason: QueueReason },
}

impl CaptureOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureOutcome::SubmittedImmediately => "submitted-immediately",
            CaptureOutcome::QueuedOffline { .. } => "queued-offline",
        }
    }

    pub fn queued_id(&self) -> Option<ReportId> {
        match self {
            CaptureOutcome::SubmittedImmediately => None,
            CaptureOutcome::QueuedOffline { id, .. } => Some(*id),
        }
    }
}

impl fmt::Display for CaptureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a capture, plus the backlog drain it may have started.
#[derive(Debug)]
pub struct CaptureReceipt {
    pub outcome: CaptureOutcome,
    pub backlog_drain: Option<JoinHandle<Result<DrainOutcome>>>,
}

/// Entry point for newly captured reports.
pub struct CapturePath<S> {
    monitor: Arc<ConnectivityMonitor>,
    coordinator: Arc<SyncCoordinator<S>>,
}

impl<S: ReportSubmitter + 'static> CapturePath<S> {
    pub fn new(monitor: Arc<ConnectivityMonitor>, coordinator: Arc<SyncCoordinator<S>>) -> Self {
        CapturePath {
            monitor,
            coordinator,
        }
    }

    /// Submits or queues one report.
    ///
    /// A report the server rejects is returned as [`Error::Rejected`] and not
    /// queued. A storage failure while queueing is returned as-is; the
    /// report was not saved.
    pub async fn capture(&self, payload: ReportPayload) -> Result<CaptureReceipt> {
        if !self.monitor.is_online() {
            let id = self.enqueue(payload).await?;
            tracing::info!("offline, report queued as {}", id);
            return Ok(CaptureReceipt {
                outcome: CaptureOutcome::QueuedOffline {
                    id,
                    reason: QueueReason::Offline,
                },
                backlog_drain: None,
            });
        }

        let body = payload.wire_body();
        let submitted = submit_with_source(
            self.coordinator.submitter(),
            self.coordinator.credentials(),
            &body,
        )
        .await;

        let err = match submitted {
            Ok(_) => {
                tracing::debug!("report submitted immediately");
                return Ok(CaptureReceipt {
                    outcome: CaptureOutcome::SubmittedImmediately,
                    backlog_drain: self.drain_backlog().await,
                });
            }
            Err(err) => err,
        };

        match err.class() {
            FailureClass::Retryable | FailureClass::NeedsCredential => {
                if matches!(err, SubmitError::Network(_)) {
                    self.monitor.set_online(false);
                }
                let id = self.enqueue(payload).await?;
                tracing::warn!("submission failed ({}), report queued as {}", err, id);
                Ok(CaptureReceipt {
                    outcome: CaptureOutcome::QueuedOffline {
                        id,
                        reason: QueueReason::SubmitFailed(err),
                    },
                    backlog_drain: None,
                })
            }
            FailureClass::Rejected => match err {
                SubmitError::Validation { status, detail } => {
                    Err(Error::Rejected { status, detail })
                }
                other => Err(Error::Submit(other)),
            },
        }
    }

    async fn enqueue(&self, payload: ReportPayload) -> Result<ReportId> {
        Ok(with_store(self.coordinator.store(), move |s| s.enqueue(&payload)).await?)
    }

    /// Starts a drain if older reports are still waiting.
    async fn drain_backlog(&self) -> Option<JoinHandle<Result<DrainOutcome>>> {
        match with_store(self.coordinator.store(), |s| s.counts()).await {
            Ok(counts) if counts.pending > 0 => {
                Some(self.coordinator.spawn_drain(DrainTrigger::Capture))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("cannot check backlog: {}", e);
                None
            }
        }
    }
}
