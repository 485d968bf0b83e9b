// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use phip_core::{DrainSummary, QueueCounts, ReportStore};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::{format_counts, format_summary};
use crate::error::Result;

use super::{open_store, print_json};

/// JSON output structure for the status command.
#[derive(Serialize)]
struct StatusJson {
    counts: QueueCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_sync: Option<DrainSummary>,
}

pub fn run(config: &Config, output: OutputFormat) -> Result<()> {
    let store = open_store(config)?;
    run_impl(&store, output)
}

/// Internal implementation that accepts the store for testing.
pub(crate) fn run_impl(store: &ReportStore, output: OutputFormat) -> Result<()> {
    let counts = store.counts()?;
    let last_sync = store.last_drain()?;

    match output {
        OutputFormat::Json => print_json(&StatusJson { counts, last_sync }),
        OutputFormat::Text => {
            for line in format_counts(&counts) {
                println!("{}", line);
            }
            match &last_sync {
                Some(summary) => {
                    for line in format_summary(summary) {
                        println!("{}", line);
                    }
                }
                None => println!("Last sync: never"),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
