//! Routes command

use crate::output::OutputFormat;
use folio_forms::session::{Access, ApiKeySession, RouteGuard, SITE_ROUTES};
use folio_forms::FormsConfig;
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct RouteRow {
    pub route: &'static str,
    pub protected: bool,
    pub access: String,
}

pub fn handle(config: &FormsConfig, format: OutputFormat) -> anyhow::Result<()> {
    let guard = RouteGuard::new(Arc::new(ApiKeySession::new(config.api_key.clone())));
    let rows: Vec<RouteRow> = SITE_ROUTES
        .iter()
        .map(|&route| RouteRow {
            route,
            protected: guard.is_protected(route),
            access: match guard.check(route) {
                Access::Granted => "granted".to_string(),
                Access::Redirect(to) => format!("redirect to {to}"),
            },
        })
        .collect();
    format.print_rows(&rows);
    Ok(())
}
