//! Named geographic points and their observed precipitation color.

use serde::{Deserialize, Serialize};

/// A named location to watch. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub id: i64,
    pub name: String,
    /// WGS-84 latitude in degrees
    pub lat: f64,
    /// WGS-84 longitude in degrees
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(id: i64, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id,
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black means "no precipitation" in the radar palette; any other color counts as rain.
    pub fn is_raining(&self) -> bool {
        self.r as u16 + self.g as u16 + self.b as u16 > 0
    }
}

/// A point that was classified as raining, with the color sampled there.
///
/// Serialized flat as `{id, name, lat, lon, r, g, b}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedPoint {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ObservedPoint {
    pub fn new(point: &GeoPoint, color: Rgb) -> Self {
        Self {
            id: point.id,
            name: point.name.clone(),
            lat: point.lat,
            lon: point.lon,
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }

    pub fn color(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}
