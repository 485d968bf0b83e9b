// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use phip_core::ReportStore;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_dead_letter;
use crate::error::Result;

use super::{open_store, print_json};

pub fn run(config: &Config, output: OutputFormat) -> Result<()> {
    let store = open_store(config)?;
    run_impl(&store, output)
}

/// Internal implementation that accepts the store for testing.
pub(crate) fn run_impl(store: &ReportStore, output: OutputFormat) -> Result<()> {
    let reports = store.list_dead_letters()?;
    match output {
        OutputFormat::Json => print_json(&reports),
        OutputFormat::Text => {
            if reports.is_empty() {
                println!("No rejected reports");
                return Ok(());
            }
            for report in &reports {
                for line in format_dead_letter(report) {
                    println!("{}", line);
                }
            }
            println!();
            println!("Fix the cause, then run 'phip requeue <id>' to retry.");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "dead_letters_tests.rs"]
mod tests;
