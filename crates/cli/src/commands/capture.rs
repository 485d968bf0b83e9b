// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use chrono::Local;
use phip_core::DailyReport;

use crate::cli::ReportArgs;
use crate::config::Config;
use crate::display::{format_capture, format_summary};
use crate::error::Result;
use crate::sync::{
    CaptureOutcome, CapturePath, ConnectivityMonitor, DrainOutcome, ReportSubmitter,
    SyncCoordinator,
};

use super::{coordinator, open_store, probe};

pub async fn run(config: &Config, report: ReportArgs, offline: bool) -> Result<()> {
    let report = report.into_report(Local::now().date_naive());
    // Reject bad input before touching the network or the queue.
    report.validate()?;

    let coordinator = coordinator(config, open_store(config)?)?;
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    if !offline {
        monitor.refresh(&probe(config)?).await;
    }
    run_impl(monitor, coordinator, report).await?;
    Ok(())
}

/// Internal implementation that accepts the pipeline for testing.
pub(crate) async fn run_impl<S: ReportSubmitter + 'static>(
    monitor: Arc<ConnectivityMonitor>,
    coordinator: Arc<SyncCoordinator<S>>,
    report: DailyReport,
) -> Result<CaptureOutcome> {
    let date = report.report_date.to_string();
    let payload = report.into_payload()?;

    let receipt = CapturePath::new(monitor, coordinator)
        .capture(payload)
        .await?;
    println!("{}", format_capture(&receipt.outcome, &date));

    if let Some(drain) = receipt.backlog_drain {
        match drain.await {
            Ok(Ok(DrainOutcome::Completed(summary))) => {
                for line in format_summary(&summary) {
                    println!("{}", line);
                }
            }
            Ok(Ok(DrainOutcome::Coalesced)) => {}
            Ok(Err(e)) => eprintln!("warning: backlog sync failed: {}", e),
            Err(e) => eprintln!("warning: backlog sync failed: {}", e),
        }
    }

    Ok(receipt.outcome)
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
