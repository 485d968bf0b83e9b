// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync coordinator: drains the queue whenever connectivity allows.
//!
//! The coordinator is a two-state machine, `Idle → Draining → Idle`.
//! A drain takes the store's cross-process drain lock, returns records left
//! `in_flight` by an earlier failed pass to `pending`, then snapshots the
//! pending records and submits them one at a time in insertion order,
//! recording a per-record outcome. A record is removed only after the
//! server acknowledged it, so a crash between the two
//! produces a duplicate remote report rather than a lost one.

use std::sync::{Arc, Mutex};

use phip_core::{
    DrainSummary, DrainTrigger, Error as StoreError, PendingReport, RecordOutcome, ReportId,
    ReportStore,
};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::client::{submit_with_source, FailureClass, ReportSubmitter};
use super::credential::CredentialSource;
use super::monitor::ConnectivityEvent;
use super::with_store;
use crate::error::Result;

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Draining,
}

/// Result of a drain request.
#[derive(Debug, Clone, PartialEq)]
pub enum DrainOutcome {
    /// This request ran a full pass.
    Completed(DrainSummary),
    /// Another drain was already running; this request did nothing.
    Coalesced,
}

impl DrainOutcome {
    pub fn summary(&self) -> Option<&DrainSummary> {
        match self {
            DrainOutcome::Completed(summary) => Some(summary),
            DrainOutcome::Coalesced => None,
        }
    }
}

/// Holds `Draining` for the lifetime of the guard.
struct DrainingGuard<'a>(&'a watch::Sender<SyncState>);

impl<'a> DrainingGuard<'a> {
    fn enter(state: &'a watch::Sender<SyncState>) -> Self {
        state.send_replace(SyncState::Draining);
        DrainingGuard(state)
    }
}

impl Drop for DrainingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(SyncState::Idle);
    }
}

/// Drains the report queue through a submitter.
pub struct SyncCoordinator<S> {
    store: Arc<ReportStore>,
    submitter: S,
    credentials: Arc<dyn CredentialSource>,
    drain_lock: tokio::sync::Mutex<()>,
    state: watch::Sender<SyncState>,
    last_summary: Mutex<Option<DrainSummary>>,
}

impl<S: ReportSubmitter + 'static> SyncCoordinator<S> {
    pub fn new(
        store: Arc<ReportStore>,
        submitter: S,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        SyncCoordinator {
            store,
            submitter,
            credentials,
            drain_lock: tokio::sync::Mutex::new(()),
            state,
            last_summary: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<ReportStore> {
        &self.store
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn credentials(&self) -> &dyn CredentialSource {
        self.credentials.as_ref()
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Resolves once no drain is running.
    pub async fn wait_idle(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in self, so the channel cannot close here.
        let _ = rx.wait_for(|state| *state == SyncState::Idle).await;
    }

    /// Summary of the most recent completed drain in this process.
    pub fn last_summary(&self) -> Option<DrainSummary> {
        self.last_summary
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Runs one drain pass, or coalesces if one is already running.
    ///
    /// Also coalesces when a drain holds the store's lock in another process.
    /// Fails only if the lock or the pending snapshot cannot be taken; every
    /// per-record failure is reported in the summary instead.
    pub async fn drain(&self, trigger: DrainTrigger) -> Result<DrainOutcome> {
        let Ok(_lock) = self.drain_lock.try_lock() else {
            tracing::debug!("drain already running, {} trigger coalesced", trigger);
            return Ok(DrainOutcome::Coalesced);
        };
        let Some(file_lock) = with_store(&self.store, |s| s.try_lock_drain()).await? else {
            tracing::debug!("drain running in another process, {} trigger coalesced", trigger);
            return Ok(DrainOutcome::Coalesced);
        };
        let _draining = DrainingGuard::enter(&self.state);

        let (file_lock, snapshot) = with_store(&self.store, move |s| {
            s.recover_in_flight(&file_lock)?;
            let snapshot = s.list_pending()?;
            Ok((file_lock, snapshot))
        })
        .await?;
        tracing::info!("drain started ({}): {} pending", trigger, snapshot.len());

        let mut summary = DrainSummary::begin(trigger);
        for record in &snapshot {
            if let Some(outcome) = self.deliver(record).await {
                summary.push(record.id, outcome);
            }
        }
        summary.finish();
        tracing::info!("drain finished ({}): {}", trigger, summary);

        let persisted = summary.clone();
        if let Err(e) = with_store(&self.store, move |s| s.record_drain(&persisted)).await {
            tracing::warn!("failed to record drain summary: {}", e);
        }
        *self
            .last_summary
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(summary.clone());
        drop(file_lock);

        Ok(DrainOutcome::Completed(summary))
    }

    /// Starts a drain on the runtime.
    pub fn spawn_drain(self: &Arc<Self>, trigger: DrainTrigger) -> JoinHandle<Result<DrainOutcome>> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let result = coordinator.drain(trigger).await;
            if let Err(e) = &result {
                tracing::error!("drain ({}) aborted: {}", trigger, e);
            }
            result
        })
    }

    /// Drains on every `BecameOnline` until cancelled.
    ///
    /// A drain still running at cancellation is awaited, so no record is
    /// left mid-delivery.
    pub async fn run(
        self: Arc<Self>,
        mut events: broadcast::Receiver<ConnectivityEvent>,
        cancel: CancellationToken,
    ) {
        let mut in_flight: Option<JoinHandle<Result<DrainOutcome>>> = None;

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => event,
            };

            match event {
                Ok(ConnectivityEvent::BecameOnline) => {}
                Ok(ConnectivityEvent::BecameOffline) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // A missed edge may have been an online one.
                    tracing::warn!("missed {} connectivity events", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }

            if in_flight.as_ref().is_some_and(|h| !h.is_finished()) {
                tracing::debug!("drain still running, became_online trigger coalesced");
                continue;
            }
            in_flight = Some(self.spawn_drain(DrainTrigger::BecameOnline));
        }

        if let Some(handle) = in_flight {
            let _ = handle.await;
        }
        tracing::debug!("sync coordinator stopped");
    }

    /// Delivers one record. `None` means the record vanished before delivery.
    async fn deliver(&self, record: &PendingReport) -> Option<RecordOutcome> {
        let id = record.id;
        match with_store(&self.store, move |s| s.mark_in_flight(id)).await {
            Ok(()) => {}
            Err(StoreError::ReportNotFound(_)) => {
                tracing::debug!("report {} removed before delivery", id);
                return None;
            }
            Err(e) => {
                tracing::warn!("report {}: {}", id, e);
                return Some(RecordOutcome::StorageError {
                    reason: e.to_string(),
                });
            }
        }

        let body = record.wire_body();
        let err = match submit_with_source(&self.submitter, self.credentials(), &body).await {
            Ok(_) => {
                return Some(match with_store(&self.store, move |s| s.remove(id)).await {
                    Ok(()) => {
                        tracing::debug!("report {} delivered", id);
                        RecordOutcome::Delivered
                    }
                    Err(e) => {
                        tracing::warn!("report {} delivered but not removed: {}", id, e);
                        RecordOutcome::StorageError {
                            reason: e.to_string(),
                        }
                    }
                });
            }
            Err(err) => err,
        };

        tracing::warn!("report {}: {}", id, err);
        let reason = err.to_string();
        Some(match err.class() {
            FailureClass::Retryable => {
                self.release(id, RecordOutcome::RetryLater { reason }).await
            }
            FailureClass::NeedsCredential => {
                self.release(id, RecordOutcome::NeedsCredential { reason })
                    .await
            }
            FailureClass::Rejected => {
                let stored = reason.clone();
                match with_store(&self.store, move |s| s.dead_letter(id, &stored)).await {
                    Ok(()) => RecordOutcome::DeadLettered { reason },
                    Err(e) => RecordOutcome::StorageError {
                        reason: e.to_string(),
                    },
                }
            }
        })
    }

    /// Returns a record to `pending`, keeping `outcome` unless that fails.
    async fn release(&self, id: ReportId, outcome: RecordOutcome) -> RecordOutcome {
        match with_store(&self.store, move |s| s.mark_pending(id)).await {
            Ok(()) => outcome,
            Err(e) => RecordOutcome::StorageError {
                reason: e.to_string(),
            },
        }
    }
}
