//! Raster decoding: fetched GeoTIFF bytes to renderable overlays.
//!
//! Split into a pure container parse ([`RasterGrid`]) and the cloud-density
//! render ([`decode_overlay`]), so the alpha-mapping algorithm is
//! independently testable with synthetic rasters.

mod decoder;
mod error;
mod grid;

pub use decoder::{decode_overlay, BoundingQuad, DecodedOverlay};
pub use error::DecodeError;
pub use grid::{GeoExtent, RasterGrid};

#[cfg(test)]
pub(crate) mod test_support {
    //! Synthetic GeoTIFF construction for decoder tests.

    use std::io::Cursor;

    use tiff::encoder::{colortype, TiffEncoder};
    use tiff::tags::Tag;

    /// Encode a single-band f32 GeoTIFF with a top-left tiepoint at
    /// `(xmin, ymax)` and per-pixel scale `(sx, sy)`.
    pub fn encode_geotiff(
        width: u32,
        height: u32,
        values: &[f32],
        xmin: f64,
        ymax: f64,
        sx: f64,
        sy: f64,
    ) -> Vec<u8> {
        assert_eq!(values.len(), (width * height) as usize);

        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).unwrap();
            let mut image = encoder
                .new_image::<colortype::Gray32Float>(width, height)
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[sx, sy, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, xmin, ymax, 0.0][..])
                .unwrap();
            image.write_data(values).unwrap();
        }
        buf.into_inner()
    }
}
