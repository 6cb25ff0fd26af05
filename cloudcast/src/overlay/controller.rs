//! Overlay display orchestration.

use std::sync::Arc;

use tracing::{debug, warn};

use super::cache::LayerCache;
use super::error::OverlayError;
use super::host::OverlayHost;
use super::key::OverlayKey;
use super::registry::PublishedLayers;
use super::source::OverlaySource;
use super::status::SharedOverlayStatus;
use crate::timestep::TimeStep;
use crate::variable::VariableId;

/// Drives fetch → decode → cache → publish for a requested `(variable,
/// step)` and keeps sibling visibility consistent.
pub struct OverlayController<S, H> {
    cache: Arc<LayerCache<S>>,
    layers: Arc<PublishedLayers<H>>,
    status: Arc<SharedOverlayStatus>,
}

impl<S: OverlaySource + 'static, H: OverlayHost> OverlayController<S, H> {
    pub fn new(
        cache: Arc<LayerCache<S>>,
        layers: Arc<PublishedLayers<H>>,
        status: Arc<SharedOverlayStatus>,
    ) -> Self {
        Self {
            cache,
            layers,
            status,
        }
    }

    /// Make `(variable, step)` the visible overlay.
    ///
    /// Published keys show instantly with no I/O. Uncached keys go through
    /// the layer cache with an observable loading state; on failure the
    /// error is recorded for display and no partial layer is left behind.
    ///
    /// The stale-variable cleanup and sibling-hide passes run synchronously
    /// before anything can suspend, so a switch between published steps
    /// never shows zero or two frames.
    pub async fn show_layer(
        &self,
        variable: VariableId,
        step: TimeStep,
    ) -> Result<(), OverlayError> {
        let key = OverlayKey::new(variable, step);

        // Cap host memory to one variable's worth of layers.
        self.layers.retain_variable(variable);
        self.layers.hide_siblings(key);

        if self.layers.is_published(key) {
            debug!(key = %key, "showing published layer");
            self.layers.set_visible(key, true);
            return Ok(());
        }

        self.status.set_loading(true);
        self.status.clear_error();

        match self.cache.get_or_compute(key).await {
            Ok(overlay) => {
                self.layers.ensure_registered(key, &overlay, true);
                self.status.set_loading(false);
                debug!(key = %key, "layer published and visible");
                Ok(())
            }
            Err(err) => {
                self.status.set_loading(false);
                self.status
                    .set_error(format!("Failed to load cloud layer: {}", err));
                warn!(key = %key, error = %err, "failed to show layer");
                Err(err)
            }
        }
    }
}
