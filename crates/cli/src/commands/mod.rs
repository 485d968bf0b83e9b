// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod capture;
pub mod clear;
pub mod dead_letters;
pub mod feedback;
pub mod pending;
pub mod requeue;
pub mod status;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use std::sync::Arc;

use phip_core::ReportStore;
use serde::Serialize;

use crate::config::Config;
use crate::env;
use crate::error::{Error, Result};
use crate::sync::{CredentialSource, HttpProbe, HttpSubmitter, StaticToken, SyncCoordinator, TokenFile};

/// Open the queue database named by the config.
pub fn open_store(config: &Config) -> Result<Arc<ReportStore>> {
    let path = config.db_path()?;
    tracing::debug!("opening queue at {}", path.display());
    Ok(Arc::new(ReportStore::open(&path)?))
}

/// The credential source: `PHIP_TOKEN` if set, otherwise the token file.
pub fn credentials(config: &Config) -> Result<Arc<dyn CredentialSource>> {
    match env::token() {
        Some(token) => Ok(Arc::new(StaticToken::new(token))),
        None => Ok(Arc::new(TokenFile::new(config.token_file()?))),
    }
}

/// A coordinator delivering over HTTP.
pub fn coordinator(
    config: &Config,
    store: Arc<ReportStore>,
) -> Result<Arc<SyncCoordinator<HttpSubmitter>>> {
    let submitter = HttpSubmitter::from_config(config)?;
    Ok(Arc::new(SyncCoordinator::new(
        store,
        submitter,
        credentials(config)?,
    )))
}

/// A connectivity probe against the API base URL.
pub fn probe(config: &Config) -> Result<HttpProbe> {
    HttpProbe::new(config.probe_url(), config.probe_timeout())
        .map_err(|e| Error::Runtime(format!("failed to build HTTP client: {}", e)))
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
