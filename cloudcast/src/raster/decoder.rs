//! Cloud-density rendering of raster grids.
//!
//! Values are rendered as white with an alpha channel driven by density:
//! denser cloud is more opaque, with a floor so faint cloud stays visible
//! and a ceiling so the overlay never fully hides the map beneath it.

use std::io::Cursor;

use bytes::Bytes;
use image::{Rgba, RgbaImage};

use super::error::DecodeError;
use super::grid::{GeoExtent, RasterGrid};

/// Full opacity is reached at this density value.
const DENSITY_FULL_SCALE: f32 = 0.8;
/// Minimum alpha for any visible cloud pixel.
const ALPHA_FLOOR: f32 = 25.0;
/// Maximum alpha, keeping the overlay translucent.
const ALPHA_CEILING: f32 = 250.0;

/// Four-corner geographic placement of an overlay, `(longitude, latitude)`
/// pairs in top-left, top-right, bottom-right, bottom-left order, matching
/// the convention the overlay host expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingQuad {
    pub top_left: (f64, f64),
    pub top_right: (f64, f64),
    pub bottom_right: (f64, f64),
    pub bottom_left: (f64, f64),
}

impl BoundingQuad {
    /// Derive the quad from a raster extent.
    pub fn from_extent(extent: GeoExtent) -> Self {
        Self {
            top_left: (extent.xmin, extent.ymax),
            top_right: (extent.xmax, extent.ymax),
            bottom_right: (extent.xmax, extent.ymin),
            bottom_left: (extent.xmin, extent.ymin),
        }
    }

    /// Corners in host registration order.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// A renderable overlay: encoded PNG plus its geographic placement.
///
/// Immutable once produced; shared as `Arc<DecodedOverlay>` by the layer
/// cache.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedOverlay {
    /// PNG-encoded RGBA image.
    pub image: Bytes,
    /// Geographic placement quad.
    pub quad: BoundingQuad,
}

/// Decode a fetched raster payload into a renderable overlay.
///
/// Pure function of the input bytes. CPU-bound; callers on an async runtime
/// should run it under a blocking task.
pub fn decode_overlay(bytes: &[u8]) -> Result<DecodedOverlay, DecodeError> {
    let grid = RasterGrid::from_bytes(bytes)?;
    let rendered = render_rgba(&grid);

    let mut png = Vec::new();
    rendered
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| DecodeError::ImageEncode(e.to_string()))?;

    Ok(DecodedOverlay {
        image: Bytes::from(png),
        quad: BoundingQuad::from_extent(grid.extent()),
    })
}

/// Alpha for one density sample, or `None` for a fully transparent pixel.
fn pixel_alpha(value: f32) -> Option<u8> {
    if value.is_nan() || value <= 0.0 {
        return None;
    }
    let alpha = (value / DENSITY_FULL_SCALE * 255.0).clamp(ALPHA_FLOOR, ALPHA_CEILING);
    Some(alpha as u8)
}

fn render_rgba(grid: &RasterGrid) -> RgbaImage {
    let mut image = RgbaImage::new(grid.width(), grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let pixel = match pixel_alpha(grid.value_at(x, y)) {
                Some(alpha) => Rgba([255, 255, 255, alpha]),
                None => Rgba([0, 0, 0, 0]),
            };
            image.put_pixel(x, y, pixel);
        }
    }
    image
}
