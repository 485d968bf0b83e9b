// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::sync::{ConnectivityMonitor, Probe, ReportSubmitter, SyncCoordinator};

use super::{coordinator, open_store, probe};

pub async fn run(config: &Config) -> Result<()> {
    let coordinator = coordinator(config, open_store(config)?)?;
    let probe = probe(config)?;
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("cannot listen for Ctrl-C: {}", e);
        }
        tracing::info!("shutting down");
        shutdown.cancel();
    });

    tracing::info!(
        "watching {} every {}s",
        config.api_url,
        config.probe_interval_secs
    );
    run_impl(coordinator, probe, config.probe_interval(), cancel).await
}

/// Runs the monitor and coordinator until `cancel` fires.
///
/// Starts offline, so the first successful probe drains any backlog left
/// from a previous run.
pub(crate) async fn run_impl<S, P>(
    coordinator: Arc<SyncCoordinator<S>>,
    probe: P,
    interval: Duration,
    cancel: CancellationToken,
) -> Result<()>
where
    S: ReportSubmitter + 'static,
    P: Probe + 'static,
{
    let monitor = Arc::new(ConnectivityMonitor::new(false));

    let drains = tokio::spawn(Arc::clone(&coordinator).run(monitor.subscribe(), cancel.clone()));
    let probing = {
        let monitor = Arc::clone(&monitor);
        let cancel = cancel.clone();
        tokio::spawn(async move { monitor.run(&probe, interval, cancel).await })
    };

    cancel.cancelled().await;
    probing
        .await
        .map_err(|e| Error::Runtime(format!("monitor task failed: {}", e)))?;
    drains
        .await
        .map_err(|e| Error::Runtime(format!("sync task failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
