//! Common types and utilities shared across the rain-watch crates.

pub mod bbox;
pub mod error;
pub mod point;
pub mod time;

pub use bbox::{PixelCoord, RasterBounds};
pub use error::{RadarError, RadarResult};
pub use point::{GeoPoint, ObservedPoint, Rgb};
pub use time::TimeBucket;
