//! Geographic extent of the radar composite and the geodetic-to-pixel projection.

use serde::{Deserialize, Serialize};

use crate::error::{RadarError, RadarResult};

/// Geographic extent of a north-up raster in WGS-84 degrees.
///
/// The raster is assumed to be an equirectangular grid: every pixel column
/// covers the same span of longitude and every pixel row the same span of
/// latitude. Row 0 is the northern edge.
/// Fields missing from a config file fall back to the Czech composite extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterBounds {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

/// Integer pixel position within a raster. May lie outside the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: i64,
    pub y: i64,
}

impl PixelCoord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl RasterBounds {
    /// Extent of the CHMI composite covering Czechia.
    pub const CZECHIA: RasterBounds = RasterBounds {
        west: 11.2673442,
        north: 52.1670717,
        east: 20.7703153,
        south: 48.1,
    };

    pub fn new(west: f64, north: f64, east: f64, south: f64) -> Self {
        Self {
            west,
            north,
            east,
            south,
        }
    }

    /// Reject degenerate or inverted extents.
    pub fn validate(&self) -> RadarResult<()> {
        let finite = [self.west, self.north, self.east, self.south]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(RadarError::Config(format!(
                "bounds contain non-finite values: {:?}",
                self
            )));
        }
        if self.east <= self.west {
            return Err(RadarError::Config(format!(
                "east ({}) must be greater than west ({})",
                self.east, self.west
            )));
        }
        if self.north <= self.south {
            return Err(RadarError::Config(format!(
                "north ({}) must be greater than south ({})",
                self.north, self.south
            )));
        }
        Ok(())
    }

    /// Degrees of longitude covered by one pixel column.
    pub fn lon_pixel_size(&self, raster_width: u32) -> f64 {
        (self.east - self.west) / raster_width as f64
    }

    /// Degrees of latitude covered by one pixel row.
    pub fn lat_pixel_size(&self, raster_height: u32) -> f64 {
        (self.north - self.south) / raster_height as f64
    }

    /// Map a latitude/longitude onto the pixel grid of a raster of the given size.
    ///
    /// No clipping is done; points outside the extent yield coordinates outside
    /// `[0, width) x [0, height)` and it is up to the caller to reject them.
    pub fn project(&self, lat: f64, lon: f64, raster_width: u32, raster_height: u32) -> PixelCoord {
        let lon_size = self.lon_pixel_size(raster_width);
        let lat_size = self.lat_pixel_size(raster_height);

        // Rows grow southward
        let x = ((lon - self.west) / lon_size).floor();
        let y = ((self.north - lat) / lat_size).floor();

        PixelCoord::new(x as i64, y as i64)
    }
}

impl Default for RasterBounds {
    fn default() -> Self {
        Self::CZECHIA
    }
}
