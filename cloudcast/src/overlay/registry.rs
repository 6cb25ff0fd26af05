//! The published-layer set and its host bookkeeping.
//!
//! Both the controller and the preloader mutate the overlay host; routing
//! every mutation through this registry keeps the published set and the
//! host consistent: a key leaves the set if and only if its host layer is
//! removed. All operations are idempotent so the two callers can
//! interleave freely.

use std::collections::HashSet;

use parking_lot::Mutex;

use super::host::OverlayHost;
use super::key::OverlayKey;
use crate::raster::DecodedOverlay;
use crate::variable::VariableId;

/// Published overlays: the subset of keys whose decoded overlay has been
/// handed to the host.
pub struct PublishedLayers<H> {
    host: H,
    published: Mutex<HashSet<OverlayKey>>,
}

impl<H: OverlayHost> PublishedLayers<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            published: Mutex::new(HashSet::new()),
        }
    }

    /// Whether `key` has been handed to the host.
    pub fn is_published(&self, key: OverlayKey) -> bool {
        self.published.lock().contains(&key)
    }

    /// Number of published layers for a variable.
    pub fn published_count(&self, variable: VariableId) -> usize {
        self.published
            .lock()
            .iter()
            .filter(|key| key.variable == variable)
            .count()
    }

    /// Register `key` with the host if it is not already published.
    ///
    /// New layers are created with the given visibility. A layer that is
    /// already published keeps its current visibility unless `visible` is
    /// set, in which case it is shown.
    pub fn ensure_registered(&self, key: OverlayKey, overlay: &DecodedOverlay, visible: bool) {
        let mut published = self.published.lock();
        if published.insert(key) {
            self.host.add_layer(&key.layer_id(), overlay, visible);
        } else if visible {
            self.host.set_visibility(&key.layer_id(), true);
        }
    }

    /// Show or hide a published layer. No-op for unpublished keys.
    pub fn set_visible(&self, key: OverlayKey, visible: bool) {
        if self.published.lock().contains(&key) {
            self.host.set_visibility(&key.layer_id(), visible);
        }
    }

    /// Hide every published layer of a variable.
    pub fn hide_variable(&self, variable: VariableId) {
        let published = self.published.lock();
        for key in published.iter().filter(|k| k.variable == variable) {
            self.host.set_visibility(&key.layer_id(), false);
        }
    }

    /// Hide every published sibling of `key` (same variable, other steps).
    pub fn hide_siblings(&self, key: OverlayKey) {
        let published = self.published.lock();
        for other in published
            .iter()
            .filter(|k| k.variable == key.variable && **k != key)
        {
            self.host.set_visibility(&other.layer_id(), false);
        }
    }

    /// Drop every published layer that does not belong to `variable`,
    /// removing it from the host.
    ///
    /// Bounds host-side resources to one variable's depth of layers no
    /// matter how many variables have been browsed. Dropped keys stay in
    /// the decoded-overlay cache and are cheap to re-show.
    pub fn retain_variable(&self, variable: VariableId) {
        let mut published = self.published.lock();
        published.retain(|key| {
            if key.variable == variable {
                true
            } else {
                self.host.remove_layer(&key.layer_id());
                false
            }
        });
    }

    /// Remove every published layer from the host (session teardown).
    pub fn remove_all(&self) {
        let mut published = self.published.lock();
        for key in published.drain() {
            self.host.remove_layer(&key.layer_id());
        }
    }
}
