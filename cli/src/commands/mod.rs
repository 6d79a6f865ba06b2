//! CLI Commands

pub mod certificates;
pub mod config;
pub mod contact;
pub mod register;
pub mod routes;

use anyhow::bail;
use colored::Colorize;
use folio_forms::{EmailRelayClient, FormsConfig, SubmissionClient, SubmissionController, SubmitOutcome};
use std::sync::Arc;

pub fn relay_client(config: &FormsConfig) -> anyhow::Result<Arc<dyn SubmissionClient>> {
    if config.relay.public_key.trim().is_empty() {
        tracing::warn!("No relay public key configured, the relay will most likely reject this request");
    }
    Ok(Arc::new(EmailRelayClient::new(config.relay.clone())?))
}

/// Fills the form the way a user would and submits it once.
pub async fn submit(controller: &SubmissionController, fields: &[(&str, &str)]) -> anyhow::Result<()> {
    for (name, value) in fields {
        controller.set_field(name, *value)?;
    }

    match controller.submit().await {
        SubmitOutcome::Sent(_) => {
            let state = controller.snapshot();
            let message = state.notice().map(|n| n.message.as_str()).unwrap_or("Sent.");
            println!("{} {}", "✓".green().bold(), message);
            Ok(())
        }
        SubmitOutcome::Invalid(err) => bail!("{err}"),
        SubmitOutcome::Failed(err) => {
            let state = controller.snapshot();
            match state.last_error() {
                Some(message) => bail!("{message}"),
                None => bail!("{err}"),
            }
        }
        SubmitOutcome::AlreadyInFlight => bail!("a submission is already in flight"),
        SubmitOutcome::Discarded => bail!("form closed before the submission finished"),
    }
}
