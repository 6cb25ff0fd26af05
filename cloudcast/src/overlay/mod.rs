//! The overlay pipeline: cache, publication, and display orchestration.
//!
//! [`OverlayController`] turns a requested `(variable, step)` into a visible
//! host layer, [`PreloadCoordinator`] populates a full time series ahead of
//! playback, and [`LayerCache`] memoizes decoded overlays for both. The host
//! itself stays behind the [`OverlayHost`] trait.

mod cache;
mod controller;
mod error;
mod host;
mod key;
mod preload;
mod registry;
mod source;
mod status;

pub use cache::{CacheStats, LayerCache};
pub use controller::OverlayController;
pub use error::OverlayError;
pub use host::OverlayHost;
pub use key::{LayerId, OverlayKey};
pub use preload::PreloadCoordinator;
pub use registry::PublishedLayers;
pub use source::{OverlaySource, RasterSource};
pub use status::{OverlayStatusSnapshot, SharedOverlayStatus};

#[cfg(test)]
pub use host::tests::RecordingHost;
