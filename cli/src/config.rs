//! CLI Configuration

use anyhow::Context;
use folio_forms::FormsConfig;
use std::path::PathBuf;

pub fn load(profile: Option<&str>) -> anyhow::Result<FormsConfig> {
    let path = config_path(profile)?;
    FormsConfig::load(&path).with_context(|| format!("reading {}", path.display()))
}

/// Settles a load result. A missing file already loads as defaults, so an
/// error here means the file exists but is unreadable or malformed.
pub fn or_defaults(loaded: anyhow::Result<FormsConfig>, lenient: bool) -> anyhow::Result<FormsConfig> {
    match loaded {
        Ok(config) => Ok(config),
        Err(e) if lenient => {
            tracing::warn!("Config not loaded ({e:#}), using defaults");
            Ok(FormsConfig::default())
        }
        Err(e) => Err(e.context("fix or re-create it with `folio config init`")),
    }
}

pub fn save(config: &FormsConfig, profile: Option<&str>) -> anyhow::Result<PathBuf> {
    let path = config_path(profile)?;
    config.save(&path).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub fn config_path(profile: Option<&str>) -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("Cannot find home directory")?;
    Ok(home.join(".folio").join(file_name(profile)))
}

fn file_name(profile: Option<&str>) -> String {
    match profile {
        Some(p) => format!("config.{}.toml", p),
        None => "config.toml".to_string(),
    }
}
