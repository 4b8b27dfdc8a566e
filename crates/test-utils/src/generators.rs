//! Synthetic radar images.
//!
//! Real composites are transparent where there is no echo and use opaque
//! palette colors for precipitation, so the generators do the same.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use radar_common::{PixelCoord, RasterBounds};

/// Fully transparent pixel, the "no precipitation" background.
pub const NO_ECHO: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A light-rain blue from the radar palette.
pub const LIGHT_RAIN: Rgba<u8> = Rgba([0, 108, 192, 255]);

/// A heavy-rain red from the radar palette.
pub const HEAVY_RAIN: Rgba<u8> = Rgba([252, 0, 0, 255]);

/// Creates an empty (all transparent) raster.
pub fn clear_raster(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, NO_ECHO)
}

/// Paints a filled square precipitation cell centered on `center`.
///
/// Pixels outside the raster are ignored.
pub fn paint_cell(raster: &mut RgbaImage, center: PixelCoord, half_width: i64, color: Rgba<u8>) {
    let (width, height) = (raster.width() as i64, raster.height() as i64);
    for y in (center.y - half_width)..=(center.y + half_width) {
        for x in (center.x - half_width)..=(center.x + half_width) {
            if x >= 0 && y >= 0 && x < width && y < height {
                raster.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Creates a raster with a precipitation cell over each given location.
///
/// Cells are wide enough to cover a full sampling window.
pub fn raster_with_rain_at(
    bounds: &RasterBounds,
    width: u32,
    height: u32,
    locations: &[(f64, f64)],
    color: Rgba<u8>,
) -> RgbaImage {
    let mut raster = clear_raster(width, height);
    for &(lat, lon) in locations {
        let center = bounds.project(lat, lon, width, height);
        paint_cell(&mut raster, center, 6, color);
    }
    raster
}

/// Encodes a raster as PNG bytes, the format served by the radar archive.
pub fn png_bytes(raster: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(raster.clone())
        .write_to(&mut buf, ImageOutputFormat::Png)
        .expect("in-memory PNG encoding cannot fail");
    buf.into_inner()
}
