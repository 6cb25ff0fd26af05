//! Error types for raster decoding.

use thiserror::Error;

/// Errors that can occur while turning fetched bytes into an overlay.
///
/// `Clone` because decode results are shared between concurrent waiters of
/// the same overlay key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload is not a parseable raster container.
    #[error("invalid raster payload: {0}")]
    InvalidRaster(String),

    /// The raster parsed but is not a single-band floating-point grid.
    #[error("unsupported raster layout: {0}")]
    Unsupported(String),

    /// The raster carries no usable geographic extent.
    #[error("raster has no geographic reference")]
    MissingGeoReference,

    /// Encoding the rendered pixels failed.
    #[error("image encoding failed: {0}")]
    ImageEncode(String),

    /// The decode task died before producing a result.
    #[error("decode task failed: {0}")]
    Internal(String),
}

impl From<tiff::TiffError> for DecodeError {
    fn from(err: tiff::TiffError) -> Self {
        DecodeError::InvalidRaster(err.to_string())
    }
}
