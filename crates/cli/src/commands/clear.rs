// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use phip_core::ReportStore;

use crate::config::Config;
use crate::error::{Error, Result};

use super::open_store;

pub fn run(config: &Config, yes: bool) -> Result<()> {
    let store = open_store(config)?;
    run_impl(&store, yes)?;
    Ok(())
}

/// Internal implementation that accepts the store for testing.
///
/// Returns the number of reports deleted.
pub(crate) fn run_impl(store: &ReportStore, yes: bool) -> Result<usize> {
    let count = store.counts()?.undelivered();
    if count == 0 {
        println!("Queue is empty");
        return Ok(0);
    }
    if !yes {
        return Err(Error::ConfirmationRequired { count });
    }
    let removed = store.clear()?;
    tracing::warn!("operator cleared {} undelivered report(s)", removed);
    println!("Deleted {} undelivered report(s)", removed);
    Ok(removed)
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
