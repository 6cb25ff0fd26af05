//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. These are
//! pure data types; loading and layering live in the parent module.

use crate::auth::TokenSource;

/// Default API root when nothing is configured (local development server).
pub const DEFAULT_API_BASE_URL: &str = "http://0.0.0.0:8000/api/cloudcasting";

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Layer/data-info API settings.
    pub api: ApiSettings,
    /// Credential acquisition settings.
    pub auth: AuthSettings,
    /// Map display settings.
    pub map: MapSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Cloudcasting API configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    /// API root, e.g. `http://0.0.0.0:8000/api/cloudcasting`. The layer and
    /// data-info URLs are derived from it.
    pub base_url: String,
}

/// Credential acquisition configuration.
///
/// Either a proxy token endpoint or direct identity-provider credentials;
/// with neither set, fetches proceed unauthenticated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthSettings {
    /// Internal proxy token endpoint (`GET` returns the token response).
    pub token_url: Option<String>,
    /// Identity provider issuer base URL.
    pub issuer_base_url: Option<String>,
    /// Client id for the client-credentials grant.
    pub client_id: Option<String>,
    /// Client secret for the client-credentials grant.
    pub client_secret: Option<String>,
    /// API audience to request access for.
    pub audience: Option<String>,
}

/// Map display configuration. The overlay host consumes this; the engine
/// only carries it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapSettings {
    /// Access token for the map tile provider.
    pub mapbox_access_token: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory for log files.
    pub directory: String,
    /// Log file name.
    pub file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_API_BASE_URL.to_string(),
            },
            auth: AuthSettings::default(),
            map: MapSettings::default(),
            logging: LoggingSettings {
                directory: crate::logging::default_log_dir().to_string(),
                file_name: crate::logging::default_log_file().to_string(),
            },
        }
    }
}

impl Config {
    /// The credential source implied by the auth settings.
    ///
    /// A proxy endpoint takes precedence; otherwise complete
    /// identity-provider credentials select the direct grant; otherwise
    /// `None` (unauthenticated operation).
    pub fn token_source(&self) -> Option<TokenSource> {
        if let Some(url) = &self.auth.token_url {
            return Some(TokenSource::Proxy { url: url.clone() });
        }

        match (
            &self.auth.issuer_base_url,
            &self.auth.client_id,
            &self.auth.client_secret,
        ) {
            (Some(issuer), Some(id), Some(secret)) => Some(TokenSource::IdentityProvider {
                issuer_base_url: issuer.clone(),
                client_id: id.clone(),
                client_secret: secret.clone(),
                audience: self.auth.audience.clone(),
            }),
            _ => None,
        }
    }
}
