//! Point markers drawn onto the persisted artifact.

use image::Rgba;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use radar_common::{PixelCoord, Rgb};

use crate::Raster;

/// Edge length of a marker square in pixels.
pub const MARKER_SIZE: u32 = 10;

/// Classification result to paint at a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Filled with the sampled precipitation color
    Raining(Rgb),
    /// Filled with black, so checked-and-clear points stay distinguishable
    /// from places that were never sampled
    Clear,
}

impl Marker {
    pub fn from_sample(color: Rgb) -> Self {
        if color.is_raining() {
            Marker::Raining(color)
        } else {
            Marker::Clear
        }
    }

    fn fill(&self) -> Rgba<u8> {
        match self {
            Marker::Raining(c) => Rgba([c.r, c.g, c.b, 255]),
            Marker::Clear => Rgba([0, 0, 0, 255]),
        }
    }
}

/// Paint an opaque square covering `[x-5, x+5) x [y-5, y+5)`, clipped to the raster.
pub fn annotate(raster: &mut Raster, at: PixelCoord, marker: Marker) {
    let half = (MARKER_SIZE / 2) as i64;
    let left = saturate(at.x - half);
    let top = saturate(at.y - half);

    let rect = Rect::at(left, top).of_size(MARKER_SIZE, MARKER_SIZE);
    draw_filled_rect_mut(raster, rect, marker.fill());
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
