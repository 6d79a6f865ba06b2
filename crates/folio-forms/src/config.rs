//! Forms configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::catalog;
use crate::domain::FormDefinition;
use crate::{FormsError, Result};

/// Email relay account settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay origin, e.g. `https://api.emailjs.com`.
    pub endpoint: String,
    pub service_id: String,
    /// Public client key the relay uses to identify the sender account.
    pub public_key: String,
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.emailjs.com".into(),
            service_id: "service_c0lf87l".into(),
            public_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    pub contact_template: String,
    pub certificate_template: String,
    /// How long the success notice stays up.
    pub notice_secs: u64,
    pub strict_email: bool,
    pub contact_fallback: String,
    pub certificate_fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub relay: RelayConfig,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            contact_template: "template_k5huwmg".into(),
            certificate_template: "template_iewnln1".into(),
            notice_secs: 4,
            strict_email: false,
            contact_fallback: "dubicventures@gmail.com".into(),
            certificate_fallback: "mrchidubem8@gmail.com".into(),
            api_url: None,
            api_key: None,
            relay: RelayConfig::default(),
        }
    }
}

impl FormsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FormsError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FormsError::Config(e.to_string()))
    }

    /// Missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }

    pub fn contact_form(&self) -> FormDefinition {
        FormDefinition::contact(&self.contact_template, &self.contact_fallback)
    }

    pub fn certificate_form(&self, certificate_key: &str) -> Result<FormDefinition> {
        let certificate = catalog::find(certificate_key)?;
        Ok(FormDefinition::certificate_request(&self.certificate_template, &self.certificate_fallback, certificate))
    }
}
