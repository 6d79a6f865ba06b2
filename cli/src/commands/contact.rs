//! Contact form command

use folio_forms::{FormsConfig, SubmissionController};

pub async fn handle(config: &FormsConfig, name: &str, email: &str, message: &str) -> anyhow::Result<()> {
    let controller = SubmissionController::from_config(config, config.contact_form(), super::relay_client(config)?);
    super::submit(&controller, &[("name", name), ("email", email), ("message", message)]).await
}
