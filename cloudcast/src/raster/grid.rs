//! Single-band floating-point raster grids.
//!
//! Forecast layers arrive as GeoTIFF files holding one band of cloud-density
//! values plus the georeferencing tags that place the grid on the map
//! (`ModelPixelScale` + `ModelTiepoint`).

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::error::DecodeError;

/// Geographic extent of a raster in its coordinate reference, degrees
/// longitude (x) and latitude (y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoExtent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// A parsed single-band floating-point raster.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    width: u32,
    height: u32,
    values: Vec<f32>,
    extent: GeoExtent,
}

impl RasterGrid {
    /// Parse a GeoTIFF payload into a grid.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = Decoder::new(Cursor::new(bytes))?;
        let (width, height) = decoder.dimensions()?;

        let extent = read_extent(&mut decoder, width, height)?;

        let values = match decoder.read_image()? {
            DecodingResult::F32(values) => values,
            DecodingResult::F64(values) => values.into_iter().map(|v| v as f32).collect(),
            _ => {
                return Err(DecodeError::Unsupported(
                    "expected single-band floating-point samples".to_string(),
                ))
            }
        };

        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(DecodeError::Unsupported(format!(
                "expected {} single-band samples, got {}",
                expected,
                values.len()
            )));
        }

        Ok(Self {
            width,
            height,
            values,
            extent,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn extent(&self) -> GeoExtent {
        self.extent
    }

    /// Sample value at `(x, y)`, row-major from the top-left corner.
    pub fn value_at(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }
}

/// Read the georeferencing tags and derive the bounding extent.
///
/// The tiepoint anchors raster pixel `(i, j)` at geographic `(x, y)`; the
/// pixel scale spans the rest of the grid from there.
fn read_extent<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    width: u32,
    height: u32,
) -> Result<GeoExtent, DecodeError> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| DecodeError::MissingGeoReference)?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| DecodeError::MissingGeoReference)?;

    if scale.len() < 2 || tiepoint.len() < 5 {
        return Err(DecodeError::MissingGeoReference);
    }

    let (sx, sy) = (scale[0], scale[1]);
    if sx <= 0.0 || sy <= 0.0 {
        return Err(DecodeError::MissingGeoReference);
    }

    // tiepoint = [i, j, k, x, y, z]
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);

    let xmin = x - i * sx;
    let ymax = y + j * sy;

    Ok(GeoExtent {
        xmin,
        ymin: ymax - height as f64 * sy,
        xmax: xmin + width as f64 * sx,
        ymax,
    })
}
