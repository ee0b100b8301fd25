use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Config;

/// Environment override for the API base URL.
pub const BASE_URL_ENV: &str = "SLOTBOARD_API_URL";

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Resolves the API base URL: CLI flag wins, then the environment, then the
/// config file. The config file is only read when neither override is set.
pub fn resolve_base_url(flag: Option<&str>, config_path: &Path) -> Result<String> {
    if let Some(url) = flag {
        return Ok(url.to_string());
    }
    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        if !url.is_empty() {
            return Ok(url);
        }
    }
    let config = load_config(config_path)?;
    Ok(config.api.base_url)
}
