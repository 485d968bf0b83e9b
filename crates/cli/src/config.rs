// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in `$XDG_CONFIG_HOME/phip/config.toml` and includes:
//! - `api_url`: base URL of the reporting API
//! - `report_endpoint` / `feedback_endpoint`: paths under `api_url`
//! - timeouts and the connectivity probe interval
//! - `db_path`: where the offline queue lives
//! - `token_file`: where an external login writes the bearer token
//!
//! Every field is optional; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "phip";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "offline.db";
const TOKEN_FILE_NAME: &str = "token";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the reporting API.
    pub api_url: String,
    /// Path for report submission (POST).
    pub report_endpoint: String,
    /// Path for facility feedback (GET).
    pub feedback_endpoint: String,
    /// Hard bound on a single submission, in seconds. Timeouts are retried later.
    pub request_timeout_secs: u64,
    /// Bound on a connectivity probe, in seconds.
    pub probe_timeout_secs: u64,
    /// Seconds between connectivity probes while watching.
    pub probe_interval_secs: u64,
    /// Location of the offline queue database.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    /// File holding the bearer token, maintained by an external login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "http://localhost:8000".to_string(),
            report_endpoint: "/reports/".to_string(),
            feedback_endpoint: "/reports/feedback".to_string(),
            request_timeout_secs: 30,
            probe_timeout_secs: 5,
            probe_interval_secs: 10,
            db_path: None,
            token_file: None,
        }
    }
}

impl Config {
    /// Loads configuration from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration for the CLI.
    ///
    /// Precedence: explicit path, then `PHIP_CONFIG`, then the user config dir.
    /// `PHIP_API_URL` and `PHIP_DB` override the loaded values.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(env::config_path)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) => Config::load(&path)?,
            None => Config::default(),
        };

        if let Some(url) = env::api_url() {
            config.api_url = url;
        }
        if let Some(db) = env::db_path() {
            config.db_path = Some(db);
        }
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Rejects values that would make the client misbehave.
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "invalid api_url '{}': must start with http:// or https://",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be at least 1".into()));
        }
        if self.probe_timeout_secs == 0 {
            return Err(Error::Config("probe_timeout_secs must be at least 1".into()));
        }
        if self.probe_interval_secs == 0 {
            return Err(Error::Config("probe_interval_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Full URL for report submission.
    pub fn report_url(&self) -> String {
        join_url(&self.api_url, &self.report_endpoint)
    }

    /// Full URL for facility feedback.
    pub fn feedback_url(&self) -> String {
        join_url(&self.api_url, &self.feedback_endpoint)
    }

    /// URL the connectivity probe checks.
    pub fn probe_url(&self) -> String {
        join_url(&self.api_url, "/")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    /// Resolved queue database path.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => dirs::data_local_dir()
                .map(|d| d.join(APP_DIR_NAME).join(DB_FILE_NAME))
                .ok_or_else(|| Error::Config("cannot determine data directory".into())),
        }
    }

    /// Resolved token file path.
    pub fn token_file(&self) -> Result<PathBuf> {
        match &self.token_file {
            Some(path) => Ok(path.clone()),
            None => dirs::config_dir()
                .map(|d| d.join(APP_DIR_NAME).join(TOKEN_FILE_NAME))
                .ok_or_else(|| Error::Config("cannot determine config directory".into())),
        }
    }
}

/// Default config file location, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
