//! Decoding of downloaded radar images and PNG encoding of annotated artifacts.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use tracing::debug;

use radar_common::{RadarError, RadarResult};

use crate::Raster;

/// Decode raw image bytes (any format the `image` crate recognizes) into RGBA.
///
/// Zero-sized images are rejected since nothing can be projected onto them.
pub fn decode_raster(bytes: &[u8]) -> RadarResult<Raster> {
    let img = image::load_from_memory(bytes).map_err(|e| RadarError::Decode(e.to_string()))?;
    let raster = img.to_rgba8();

    if raster.width() == 0 || raster.height() == 0 {
        return Err(RadarError::Decode(format!(
            "raster has no pixels ({}x{})",
            raster.width(),
            raster.height()
        )));
    }

    debug!(
        width = raster.width(),
        height = raster.height(),
        bytes = bytes.len(),
        "Decoded raster"
    );
    Ok(raster)
}

/// Encode a raster as an RGBA PNG.
pub fn encode_png(raster: &Raster) -> RadarResult<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ColorType::Rgba8,
        )
        .map_err(|e| RadarError::Encode(e.to_string()))?;
    Ok(png)
}
