//! Layered configuration: defaults → config file → environment.
//!
//! All values are read once at process start; there is no runtime
//! reconfiguration. The recognized environment variables mirror the
//! deployment's names (`CLOUDCASTING_API_URL`, the `AUTH0_*` family,
//! `MAPBOX_ACCESS_TOKEN`).

mod file;
mod settings;

use std::path::PathBuf;

use tracing::warn;

pub use file::{apply_file, ConfigError};
pub use settings::{
    ApiSettings, AuthSettings, Config, LoggingSettings, MapSettings, DEFAULT_API_BASE_URL,
};

/// Normalize a configured API URL to the API root.
///
/// Deployments sometimes point the variable at the layers endpoint itself;
/// a trailing `/layers` segment is stripped so both forms work.
pub(crate) fn normalize_api_base(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    match trimmed.strip_suffix("/layers") {
        Some(base) => base.to_string(),
        None => trimmed.to_string(),
    }
}

/// Default config file location: `{config_dir}/cloudcast/config.ini`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cloudcast").join("config.ini"))
}

impl Config {
    /// Load configuration: defaults, then the config file if present, then
    /// environment overrides.
    ///
    /// A malformed config file is logged and skipped rather than fatal.
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(path) = default_config_path() {
            if path.exists() {
                if let Err(e) = apply_file(&mut config, &path) {
                    warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                }
            }
        }

        config.apply_env_with(|name| std::env::var(name).ok());
        config
    }

    /// Overlay environment variables via a lookup function.
    ///
    /// Split out from [`load`](Self::load) so tests can inject variables
    /// without mutating process state.
    pub fn apply_env_with(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(url) = get("CLOUDCASTING_API_URL") {
            self.api.base_url = normalize_api_base(&url);
        }
        if let Some(url) = get("CLOUDCAST_TOKEN_URL") {
            self.auth.token_url = Some(url);
        }
        if let Some(issuer) = get("AUTH0_ISSUER_BASE_URL") {
            self.auth.issuer_base_url = Some(issuer);
        }
        if let Some(id) = get("AUTH0_API_CLIENT_ID") {
            self.auth.client_id = Some(id);
        }
        if let Some(secret) = get("AUTH0_API_CLIENT_SECRET") {
            self.auth.client_secret = Some(secret);
        }
        if let Some(audience) = get("AUTH0_API_AUDIENCE") {
            self.auth.audience = Some(audience);
        }
        if let Some(token) = get("MAPBOX_ACCESS_TOKEN") {
            self.map.mapbox_access_token = Some(token);
        }
    }
}
