// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitor.
//!
//! Holds the current online/offline belief and notifies subscribers on
//! every edge. Repeated observations of the same state emit nothing.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

/// Capacity of the transition channel. Slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 16;

/// A connectivity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    BecameOnline,
    BecameOffline,
}

/// Checks whether the remote API is reachable right now.
pub trait Probe: Send + Sync {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Reports online when the API base URL answers with any HTTP response.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpProbe {
            client,
            url: url.into(),
        })
    }
}

impl Probe for HttpProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match self.client.get(&self.url).send().await {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!("probe {} failed: {}", self.url, e);
                    false
                }
            }
        })
    }
}

/// Tracks connectivity and broadcasts transitions.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    state: watch::Sender<bool>,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (state, _) = watch::channel(initially_online);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ConnectivityMonitor { state, events }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Subscribe to transitions. Only edges after this call are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }

    /// Watch the current state.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Records an observation, returning the transition if the state changed.
    pub fn set_online(&self, online: bool) -> Option<ConnectivityEvent> {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if !changed {
            return None;
        }

        let event = if online {
            ConnectivityEvent::BecameOnline
        } else {
            ConnectivityEvent::BecameOffline
        };
        tracing::info!("connectivity: {}", if online { "online" } else { "offline" });
        // No subscribers is fine; the watch channel still holds the state.
        let _ = self.events.send(event);
        Some(event)
    }

    /// Probes once and records the result.
    pub async fn refresh<P: Probe + ?Sized>(&self, probe: &P) -> bool {
        let online = probe.check().await;
        self.set_online(online);
        online
    }

    /// Probes on every tick until cancelled.
    pub async fn run<P: Probe + ?Sized>(
        &self,
        probe: &P,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("connectivity monitor stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh(probe).await;
                }
            }
        }
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
