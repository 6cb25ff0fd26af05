//! Error types for the overlay pipeline.

use thiserror::Error;

use crate::api::{ApiError, HttpError};
use crate::auth::AuthError;
use crate::raster::DecodeError;

/// Failure of the fetch → decode → publish pipeline for one overlay.
///
/// Converted into a single user-facing message at the controller boundary;
/// never crashes the playback or preload loop. `Clone` because results fan
/// out to every waiter of the same key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// Credential acquisition failed.
    #[error("authentication failed: {0}")]
    Auth(AuthError),

    /// The layer request failed; carries the HTTP status when available.
    #[error("layer fetch failed: {0}")]
    Fetch(HttpError),

    /// The payload could not be decoded into an overlay.
    #[error("layer decode failed: {0}")]
    Decode(#[from] DecodeError),
}

impl From<ApiError> for OverlayError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(e) => OverlayError::Auth(e),
            ApiError::Fetch(e) => OverlayError::Fetch(e),
        }
    }
}
