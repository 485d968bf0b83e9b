// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_feedback;
use crate::error::{Error, Result};
use crate::sync::{HttpSubmitter, SubmitError};

use super::{credentials, print_json};

pub async fn run(config: &Config, output: OutputFormat) -> Result<()> {
    let source = credentials(config)?;
    let credential = source
        .credential()
        .await
        .ok_or_else(|| Error::NoCredential {
            path: source.describe(),
        })?;

    let submitter = HttpSubmitter::from_config(config)?;
    let feedback = match submitter.fetch_feedback(&credential).await {
        Ok(feedback) => feedback,
        Err(SubmitError::Network(e)) => {
            tracing::debug!("feedback request failed: {}", e);
            return Err(Error::Offline {
                url: config.feedback_url(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    match output {
        OutputFormat::Json => print_json(&feedback),
        OutputFormat::Text => {
            for line in format_feedback(&feedback) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}
