// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! phiprs - offline-first daily report client.
//!
//! This crate provides the functionality behind the `phip` CLI: reports are
//! captured locally, submitted immediately when the reporting API is
//! reachable, and otherwise kept in a durable queue that is drained in
//! capture order once connectivity returns.
//!
//! # Main Components
//!
//! - [`sync`] - capture path, connectivity monitor, sync coordinator, submitter
//! - [`Config`] - client configuration (API location, timeouts, paths)
//! - [`Error`] - error types for all operations
//!
//! The queue itself and the report model live in `phip_core`.
//!
//! ```rust,ignore
//! use phiprs::sync::{CapturePath, ConnectivityMonitor, HttpSubmitter, SyncCoordinator, TokenFile};
//!
//! let store = Arc::new(ReportStore::open(&config.db_path()?)?);
//! let coordinator = Arc::new(SyncCoordinator::new(
//!     store,
//!     HttpSubmitter::from_config(&config)?,
//!     Arc::new(TokenFile::new(config.token_file()?)),
//! ));
//! let capture = CapturePath::new(Arc::new(ConnectivityMonitor::new(true)), coordinator);
//! let receipt = capture.capture(payload).await?;
//! ```

mod cli;
mod commands;
mod display;
mod help;

pub mod config;
pub mod env;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat, ReportArgs};
pub use config::Config;
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

/// Install the stderr log subscriber. `RUST_LOG` overrides `default_level`.
fn setup_logging(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        config,
        db,
        command,
    } = cli;

    if let Command::Completion { shell } = command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "phip", &mut std::io::stdout());
        return Ok(());
    }

    setup_logging(command.default_log_level());

    let mut config = Config::resolve(config.as_deref())?;
    if let Some(db) = db {
        config.db_path = Some(db);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(format!("failed to start runtime: {}", e)))?;
    runtime.block_on(dispatch(command, &config))
}

async fn dispatch(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Capture { report, offline } => {
            commands::capture::run(config, report, offline).await
        }
        Command::Pending { output } => commands::pending::run(config, output),
        Command::Sync { output } => commands::sync::run(config, output).await,
        Command::Watch => commands::watch::run(config).await,
        Command::Status { output } => commands::status::run(config, output),
        Command::DeadLetters { output } => commands::dead_letters::run(config, output),
        Command::Requeue { ids, all } => commands::requeue::run(config, &ids, all),
        Command::Clear { yes } => commands::clear::run(config, yes),
        Command::Feedback { output } => commands::feedback::run(config, output).await,
        // Handled before the runtime starts.
        Command::Completion { .. } => Ok(()),
    }
}
