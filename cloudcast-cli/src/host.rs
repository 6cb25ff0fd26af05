//! Filesystem-backed overlay host.
//!
//! Stands in for a map surface on the command line: registered overlays are
//! optionally written out as PNG files, and visibility changes are logged so
//! a playback run can be followed in the terminal.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::{debug, info};

use cloudcast::overlay::{LayerId, OverlayHost};
use cloudcast::raster::DecodedOverlay;

/// Overlay host that mirrors registrations onto the filesystem.
pub struct DiskHost {
    out_dir: Option<PathBuf>,
    layers: Mutex<HashMap<String, bool>>,
}

impl DiskHost {
    /// Create a host, writing layer PNGs into `out_dir` when given.
    pub fn new(out_dir: Option<PathBuf>) -> io::Result<Self> {
        if let Some(dir) = &out_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self {
            out_dir,
            layers: Mutex::new(HashMap::new()),
        })
    }

    /// Number of registered layers.
    pub fn layer_count(&self) -> usize {
        self.layers.lock().len()
    }

    /// The currently visible layer ids.
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
}

impl OverlayHost for DiskHost {
    fn add_layer(&self, id: &LayerId, overlay: &DecodedOverlay, visible: bool) {
        let mut layers = self.layers.lock();
        if layers.contains_key(id.as_str()) {
            return;
        }

        if let Some(dir) = &self.out_dir {
            let path = dir.join(format!("{}.png", id));
            if let Err(e) = std::fs::write(&path, &overlay.image) {
                tracing::warn!(path = %path.display(), error = %e, "failed to write layer image");
            }
        }

        let tl = overlay.quad.top_left;
        let br = overlay.quad.bottom_right;
        info!(
            layer = %id,
            visible,
            bounds = format!("({:.2},{:.2})..({:.2},{:.2})", tl.0, tl.1, br.0, br.1),
            "layer registered"
        );
        layers.insert(id.as_str().to_string(), visible);
    }

    fn set_visibility(&self, id: &LayerId, visible: bool) {
        if let Some(entry) = self.layers.lock().get_mut(id.as_str()) {
            if *entry != visible {
                debug!(layer = %id, visible, "layer visibility changed");
            }
            *entry = visible;
        }
    }

    fn remove_layer(&self, id: &LayerId) {
        if self.layers.lock().remove(id.as_str()).is_some() {
            debug!(layer = %id, "layer removed");
        }
    }
}
