// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// An API address nothing listens on (TCP discard port on loopback).
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// `phip` isolated in `temp`: its own config, queue and token, no network.
pub fn phip(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("phip");
    cmd.env("PHIP_CONFIG", temp.path().join("config.toml"))
        .env("PHIP_DB", temp.path().join("offline.db"))
        .env("PHIP_API_URL", UNREACHABLE_API)
        .env_remove("PHIP_TOKEN")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Write `config.toml` in `temp`.
pub fn write_config(temp: &TempDir, content: &str) {
    std::fs::write(temp.path().join("config.toml"), content).unwrap();
}

/// Queue a report offline for the given day of June 2026.
pub fn capture_offline(temp: &TempDir, day: u32, fever: u32) {
    phip(temp)
        .args(["capture", "--offline"])
        .args(["--date", &format!("2026-06-{:02}", day)])
        .args(["--fever", &fever.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("queued"));
}
