//! INI config file loading.

use std::path::Path;

use ini::Ini;
use thiserror::Error;

use super::settings::Config;
use super::normalize_api_base;

/// Errors loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed as INI.
    #[error("failed to load config file: {0}")]
    Load(String),
}

impl From<ini::Error> for ConfigError {
    fn from(err: ini::Error) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Overlay settings from an INI file onto `config`.
///
/// Unknown sections and keys are ignored; absent keys keep their current
/// values.
pub fn apply_file(config: &mut Config, path: &Path) -> Result<(), ConfigError> {
    let ini = Ini::load_from_file(path)?;

    if let Some(section) = ini.section(Some("api")) {
        if let Some(url) = section.get("base_url") {
            config.api.base_url = normalize_api_base(url);
        }
    }

    if let Some(section) = ini.section(Some("auth")) {
        if let Some(url) = section.get("token_url") {
            config.auth.token_url = Some(url.to_string());
        }
        if let Some(issuer) = section.get("issuer_base_url") {
            config.auth.issuer_base_url = Some(issuer.to_string());
        }
        if let Some(id) = section.get("client_id") {
            config.auth.client_id = Some(id.to_string());
        }
        if let Some(secret) = section.get("client_secret") {
            config.auth.client_secret = Some(secret.to_string());
        }
        if let Some(audience) = section.get("audience") {
            config.auth.audience = Some(audience.to_string());
        }
    }

    if let Some(section) = ini.section(Some("map")) {
        if let Some(token) = section.get("mapbox_access_token") {
            config.map.mapbox_access_token = Some(token.to_string());
        }
    }

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(dir) = section.get("directory") {
            config.logging.directory = dir.to_string();
        }
        if let Some(file) = section.get("file_name") {
            config.logging.file_name = file.to_string();
        }
    }

    Ok(())
}
