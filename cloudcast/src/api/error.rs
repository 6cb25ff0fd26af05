//! Error types for the cloudcasting API client.

use thiserror::Error;

use super::http::HttpError;
use crate::auth::AuthError;

/// Errors from authenticated layer fetches.
///
/// `Clone` because in-flight fetch results are fanned out to every waiter
/// of the same overlay key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A configured credential acquisition failed.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The layer request itself failed (transport error or non-2xx status).
    #[error("layer fetch failed: {0}")]
    Fetch(#[from] HttpError),
}
