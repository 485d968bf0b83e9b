// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use crate::help;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

pub use args::ReportArgs;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "phip")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first daily report client for health facilities")]
#[command(
    long_about = "Offline-first daily report client for health facilities.\n\n\
    Reports are submitted immediately when the server is reachable and kept in a local \
    queue otherwise. Queued reports are delivered in capture order once connectivity returns."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/phip/config.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Offline queue database (overrides db_path from config)
    #[arg(long, global = true, value_name = "path")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture a daily report
    #[command(after_help = "\
Examples:
  phip capture --date 2026-06-01 --fever 4 --diarrhea 2    Submit or queue a report
  phip capture --fever 1 --ors-stock low                   Report for today
  phip capture --offline --fever 3                         Queue without trying the network")]
    Capture {
        #[command(flatten)]
        report: ReportArgs,

        /// Queue the report without trying the network
        #[arg(long)]
        offline: bool,
    },

    /// List reports waiting for delivery
    Pending {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Deliver queued reports now
    Sync {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Watch connectivity and deliver queued reports whenever online
    Watch,

    /// Show queue counts and the last sync result
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List reports the server rejected
    DeadLetters {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Return rejected reports to the queue
    #[command(after_help = "\
Examples:
  phip requeue 4 7      Retry reports 4 and 7 on the next sync
  phip requeue --all    Retry every rejected report")]
    Requeue {
        /// Report id(s)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        ids: Vec<i64>,

        /// Requeue every rejected report
        #[arg(long)]
        all: bool,
    },

    /// Delete every undelivered report
    Clear {
        /// Confirm deletion
        #[arg(long, short)]
        yes: bool,
    },

    /// Show risk feedback for this facility
    Feedback {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  phip completion bash > ~/.local/share/bash-completion/completions/phip
  phip completion zsh > ~/.zfunc/_phip")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Command {
    /// Long-running commands log at info by default.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Command::Watch => "info",
            _ => "warn",
        }
    }
}

#[cfg(test)]
#[path = "../cli_tests.rs"]
mod tests;
