// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer credentials for the reporting API.
//!
//! Login happens elsewhere; the client only reads whatever token is
//! currently available at the moment of each submission.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// A bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    /// The raw token, for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Supplies the current credential, if any.
pub trait CredentialSource: Send + Sync {
    fn credential(&self) -> Pin<Box<dyn Future<Output = Option<Credential>> + Send + '_>>;

    /// Where the user should put a token when none is available.
    fn describe(&self) -> String;
}

/// A fixed token, e.g. from `PHIP_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(Option<Credential>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(Some(Credential::new(token)))
    }

    /// A source that never has a credential.
    pub fn none() -> Self {
        StaticToken(None)
    }
}

impl CredentialSource for StaticToken {
    fn credential(&self) -> Pin<Box<dyn Future<Output = Option<Credential>> + Send + '_>> {
        Box::pin(async move { self.0.clone() })
    }

    fn describe(&self) -> String {
        "PHIP_TOKEN".to_string()
    }
}

/// Token read from a file on every call, so a refreshed login is picked
/// up without restarting.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for TokenFile {
    fn credential(&self) -> Pin<Box<dyn Future<Output = Option<Credential>> + Send + '_>> {
        Box::pin(async move {
            match tokio::fs::read_to_string(&self.path).await {
                Ok(content) => {
                    let token = content.trim();
                    if token.is_empty() {
                        None
                    } else {
                        Some(Credential::new(token))
                    }
                }
                Err(e) => {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!("cannot read token file {}: {}", self.path.display(), e);
                    }
                    None
                }
            }
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
