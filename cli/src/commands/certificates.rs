//! Certificates commands

use crate::{output::OutputFormat, CertificateCommands};
use folio_forms::{catalog, FormsConfig, SubmissionController};
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct CertificateRow {
    pub key: &'static str,
    pub name: &'static str,
    pub issuer: &'static str,
    pub date: &'static str,
    #[tabled(rename = "featured")]
    pub highlight: bool,
}

impl From<&catalog::Certificate> for CertificateRow {
    fn from(c: &catalog::Certificate) -> Self {
        Self { key: c.key, name: c.name, issuer: c.issuer, date: c.date, highlight: c.highlight }
    }
}

pub async fn handle(action: CertificateCommands, config: &FormsConfig, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        CertificateCommands::List => {
            let rows: Vec<CertificateRow> = catalog::all().iter().map(CertificateRow::from).collect();
            format.print_rows(&rows);
        }
        CertificateCommands::Request { key, name, email } => {
            let definition = config.certificate_form(&key)?;
            let controller = SubmissionController::from_config(config, definition, super::relay_client(config)?);
            super::submit(&controller, &[("name", name.as_str()), ("email", email.as_str())]).await?;
        }
    }
    Ok(())
}
