//! The overlay host seam.
//!
//! The map rendering surface is an external collaborator: it accepts
//! image-plus-quad pairs and toggles their visibility. Everything behind
//! this trait is outside the system's scope.

use super::key::LayerId;
use crate::raster::DecodedOverlay;

/// An external rendering surface that displays registered overlays.
///
/// Implementations must treat every operation as idempotent: adding an
/// already-registered layer, toggling an unknown layer, and removing an
/// absent layer are all no-ops. The controller and preloader interleave
/// their host mutations and rely on this.
pub trait OverlayHost: Send + Sync {
    /// Register an overlay under `id` with an initial visibility.
    fn add_layer(&self, id: &LayerId, overlay: &DecodedOverlay, visible: bool);

    /// Show or hide a registered layer.
    fn set_visibility(&self, id: &LayerId, visible: bool);

    /// Remove a layer and its backing image.
    fn remove_layer(&self, id: &LayerId);
}

impl<T: OverlayHost + ?Sized> OverlayHost for std::sync::Arc<T> {
    fn add_layer(&self, id: &LayerId, overlay: &DecodedOverlay, visible: bool) {
        (**self).add_layer(id, overlay, visible)
    }

    fn set_visibility(&self, id: &LayerId, visible: bool) {
        (**self).set_visibility(id, visible)
    }

    fn remove_layer(&self, id: &LayerId) {
        (**self).remove_layer(id)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Recording host for tests: tracks registered layers, their visibility,
    /// and mutation counts.
    #[derive(Default)]
    pub struct RecordingHost {
        layers: Mutex<HashMap<String, bool>>,
        pub adds: AtomicUsize,
        pub removes: AtomicUsize,
    }

    impl RecordingHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_registered(&self, id: &str) -> bool {
            self.layers.lock().contains_key(id)
        }

        pub fn visibility(&self, id: &str) -> Option<bool> {
            self.layers.lock().get(id).copied()
        }

        pub fn visible_layers(&self) -> Vec<String> {
            let mut ids: Vec<String> = self
                .layers
                .lock()
                .iter()
                .filter(|(_, visible)| **visible)
                .map(|(id, _)| id.clone())
                .collect();
            ids.sort();
            ids
        }

        pub fn registered_count(&self) -> usize {
            self.layers.lock().len()
        }
    }

    impl OverlayHost for RecordingHost {
        fn add_layer(&self, id: &LayerId, _overlay: &DecodedOverlay, visible: bool) {
            let mut layers = self.layers.lock();
            if !layers.contains_key(id.as_str()) {
                layers.insert(id.as_str().to_string(), visible);
                self.adds.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn set_visibility(&self, id: &LayerId, visible: bool) {
            if let Some(entry) = self.layers.lock().get_mut(id.as_str()) {
                *entry = visible;
            }
        }

        fn remove_layer(&self, id: &LayerId) {
            if self.layers.lock().remove(id.as_str()).is_some() {
                self.removes.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
