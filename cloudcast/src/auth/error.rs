//! Error types for credential acquisition.

use thiserror::Error;

use crate::api::HttpError;

/// Errors that can occur while obtaining a bearer credential.
///
/// `Clone` because a single in-flight acquisition fans its result out to
/// every concurrent caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token endpoint or identity provider rejected the request.
    #[error("token endpoint failed: {message}")]
    Endpoint {
        /// HTTP status, when the endpoint responded at all.
        status: Option<u16>,
        message: String,
    },

    /// The endpoint responded but the body was not a valid token response.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// Neither a proxy token URL nor identity-provider credentials are
    /// configured.
    #[error("no credential source configured")]
    NotConfigured,
}

impl From<HttpError> for AuthError {
    fn from(err: HttpError) -> Self {
        AuthError::Endpoint {
            status: err.status,
            message: err.message,
        }
    }
}
