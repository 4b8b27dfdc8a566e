//! Neighborhood color sampling.
//!
//! A single radar pixel is noisy and the projection is only accurate to a few
//! pixels, so the color at a point is the mean over a 9x9 window centered on it.

use image::Rgba;

use radar_common::{PixelCoord, RadarError, RadarResult, Rgb};

use crate::Raster;

/// Half-width of the sampling window. The window spans `2 * SAMPLE_RADIUS + 1` pixels.
pub const SAMPLE_RADIUS: i64 = 4;

/// Number of pixels averaged per sample.
const SAMPLE_COUNT: u32 = ((2 * SAMPLE_RADIUS + 1) * (2 * SAMPLE_RADIUS + 1)) as u32;

/// Average the color of the window centered at `at`.
///
/// Channels are weighted by alpha before averaging, so fully transparent
/// pixels count as black. The whole window must lie inside the raster,
/// otherwise `RadarError::OutOfBounds` is returned and nothing is read.
pub fn sample(raster: &Raster, at: PixelCoord) -> RadarResult<Rgb> {
    if !window_fits(raster, at) {
        return Err(RadarError::OutOfBounds { x: at.x, y: at.y });
    }

    let (mut total_r, mut total_g, mut total_b) = (0u32, 0u32, 0u32);

    for dy in -SAMPLE_RADIUS..=SAMPLE_RADIUS {
        for dx in -SAMPLE_RADIUS..=SAMPLE_RADIUS {
            let px = raster.get_pixel((at.x + dx) as u32, (at.y + dy) as u32);
            let (r, g, b) = premultiplied(px);
            total_r += r;
            total_g += g;
            total_b += b;
        }
    }

    Ok(Rgb::new(
        (total_r / SAMPLE_COUNT) as u8,
        (total_g / SAMPLE_COUNT) as u8,
        (total_b / SAMPLE_COUNT) as u8,
    ))
}

/// Whether the full sampling window around `at` lies inside the raster.
pub fn window_fits(raster: &Raster, at: PixelCoord) -> bool {
    let (width, height) = (raster.width() as i64, raster.height() as i64);
    at.x - SAMPLE_RADIUS >= 0
        && at.y - SAMPLE_RADIUS >= 0
        && at.x + SAMPLE_RADIUS < width
        && at.y + SAMPLE_RADIUS < height
}

/// Scale each channel by alpha, widening to 16 bits and back so that opaque
/// pixels keep their exact value.
fn premultiplied(px: &Rgba<u8>) -> (u32, u32, u32) {
    let Rgba([r, g, b, a]) = *px;
    let a = a as u32;
    let scale = |c: u8| (c as u32 * 257 * a / 255) / 257;
    (scale(r), scale(g), scale(b))
}
