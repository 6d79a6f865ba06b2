//! Config commands

use crate::config;
use crate::ConfigCommands;
use anyhow::{bail, Context};
use folio_forms::FormsConfig;

const KEYS: &[&str] = &[
    "relay.endpoint",
    "relay.service_id",
    "relay.public_key",
    "relay.timeout_secs",
    "contact_template",
    "certificate_template",
    "notice_secs",
    "strict_email",
    "contact_fallback",
    "certificate_fallback",
    "api_url",
    "api_key",
];

pub fn handle(action: ConfigCommands, profile: Option<&str>) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Init => {
            let path = config::save(&FormsConfig::default(), profile)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Set { key, value } => {
            let mut config = config::load(profile)?;
            set_value(&mut config, &key, value)?;
            config::save(&config, profile)?;
            println!("Set {} successfully", key);
        }
        ConfigCommands::Get { key } => {
            let config = config::load(profile)?;
            let value = get_value(&config, &key)?;
            println!("{}: {}", key, value.unwrap_or_else(|| "(not set)".into()));
        }
        ConfigCommands::List => {
            let config = config::load(profile)?;
            for key in KEYS {
                let value = get_value(&config, key)?;
                println!("{}: {}", key, value.unwrap_or_else(|| "(not set)".into()));
            }
        }
    }
    Ok(())
}

fn mask(secret: &str) -> String {
    format!("{}****", secret.chars().take(8).collect::<String>())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn get_value(config: &FormsConfig, key: &str) -> anyhow::Result<Option<String>> {
    let value = match key {
        "relay.endpoint" => non_empty(&config.relay.endpoint),
        "relay.service_id" => non_empty(&config.relay.service_id),
        "relay.public_key" => non_empty(&config.relay.public_key).map(|k| mask(&k)),
        "relay.timeout_secs" => Some(config.relay.timeout_secs.to_string()),
        "contact_template" => non_empty(&config.contact_template),
        "certificate_template" => non_empty(&config.certificate_template),
        "notice_secs" => Some(config.notice_secs.to_string()),
        "strict_email" => Some(config.strict_email.to_string()),
        "contact_fallback" => non_empty(&config.contact_fallback),
        "certificate_fallback" => non_empty(&config.certificate_fallback),
        "api_url" => config.api_url.clone(),
        "api_key" => config.api_key.as_deref().map(mask),
        _ => bail!("Unknown config key: {}", key),
    };
    Ok(value)
}

fn set_value(config: &mut FormsConfig, key: &str, value: String) -> anyhow::Result<()> {
    match key {
        "relay.endpoint" => config.relay.endpoint = value,
        "relay.service_id" => config.relay.service_id = value,
        "relay.public_key" => config.relay.public_key = value,
        "relay.timeout_secs" => config.relay.timeout_secs = value.parse().context("timeout_secs must be a number")?,
        "contact_template" => config.contact_template = value,
        "certificate_template" => config.certificate_template = value,
        "notice_secs" => config.notice_secs = value.parse().context("notice_secs must be a number")?,
        "strict_email" => config.strict_email = value.parse().context("strict_email must be true or false")?,
        "contact_fallback" => config.contact_fallback = value,
        "certificate_fallback" => config.certificate_fallback = value,
        "api_url" => config.api_url = Some(value),
        "api_key" => config.api_key = Some(value),
        _ => bail!("Unknown config key: {}", key),
    }
    Ok(())
}
