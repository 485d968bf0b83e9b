// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use phip_core::DrainTrigger;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_summary;
use crate::error::{Error, Result};
use crate::sync::{ConnectivityMonitor, DrainOutcome, ReportSubmitter, SyncCoordinator};

use super::{coordinator, open_store, print_json, probe};

pub async fn run(config: &Config, output: OutputFormat) -> Result<()> {
    let coordinator = coordinator(config, open_store(config)?)?;
    let monitor = ConnectivityMonitor::new(false);
    if !monitor.refresh(&probe(config)?).await {
        return Err(Error::Offline {
            url: config.api_url.clone(),
        });
    }
    run_impl(&coordinator, output).await?;
    Ok(())
}

/// Internal implementation that accepts the coordinator for testing.
pub(crate) async fn run_impl<S: ReportSubmitter + 'static>(
    coordinator: &SyncCoordinator<S>,
    output: OutputFormat,
) -> Result<DrainOutcome> {
    let outcome = coordinator.drain(DrainTrigger::Manual).await?;
    match (&outcome, output) {
        (DrainOutcome::Completed(summary), OutputFormat::Json) => print_json(summary)?,
        (DrainOutcome::Completed(summary), OutputFormat::Text) => {
            if summary.total() == 0 {
                println!("Nothing to sync");
            } else {
                for line in format_summary(summary) {
                    println!("{}", line);
                }
            }
        }
        (DrainOutcome::Coalesced, _) => println!("A sync is already running"),
    }
    Ok(outcome)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
