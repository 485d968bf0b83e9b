// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use phip_core::{ReportId, ReportStore};

use crate::config::Config;
use crate::error::{Error, Result};

use super::open_store;

pub fn run(config: &Config, ids: &[ReportId], all: bool) -> Result<()> {
    let store = open_store(config)?;
    run_impl(&store, ids, all)
}

/// Internal implementation that accepts the store for testing.
pub(crate) fn run_impl(store: &ReportStore, ids: &[ReportId], all: bool) -> Result<()> {
    if all {
        let count = store.requeue_all()?;
        println!("Requeued {} report(s)", count);
        return Ok(());
    }
    if ids.is_empty() {
        return Err(Error::FieldRequired { field: "Report id" });
    }
    for id in ids {
        store.requeue(*id)?;
        println!("Requeued [{}]", id);
    }
    Ok(())
}

#[cfg(test)]
#[path = "requeue_tests.rs"]
mod tests;
