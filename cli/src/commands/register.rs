//! Register command

use crate::output::OutputFormat;
use anyhow::{bail, Context};
use folio_forms::api::{ApiClient, Registration};
use folio_forms::session::{Access, ApiKeySession, RouteGuard};
use folio_forms::FormsConfig;
use std::sync::Arc;

pub async fn handle(
    config: &FormsConfig,
    name: String,
    email: String,
    password: String,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let guard = RouteGuard::new(Arc::new(ApiKeySession::new(config.api_key.clone())));
    if let Access::Redirect(to) = guard.check("/register") {
        bail!("registration requires a session, sign in at {to}");
    }

    let api_url = config
        .api_url
        .as_deref()
        .context("api_url is not configured, set it with `folio config set api_url <url>`")?;
    let client = ApiClient::new(api_url, config.api_key.as_deref());
    let created = client.register(&Registration { name, email, password }).await?;
    format.print(&created);
    Ok(())
}
