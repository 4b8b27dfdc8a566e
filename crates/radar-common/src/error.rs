//! Error types for rain-watch.

use thiserror::Error;

/// Result type alias using RadarError.
pub type RadarResult<T> = Result<T, RadarError>;

/// Primary error type shared by the library crates and the service.
#[derive(Debug, Error)]
pub enum RadarError {
    // === Acquisition Errors ===
    #[error("Failed to fetch raster: {0}")]
    Fetch(String),

    #[error("Raster source responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to decode raster: {0}")]
    Decode(String),

    // === Classification Errors ===
    #[error("Point projects outside the sampleable raster area at ({x}, {y})")]
    OutOfBounds { x: i64, y: i64 },

    // === Artifact Errors ===
    #[error("Failed to encode artifact: {0}")]
    Encode(String),

    #[error("Failed to persist artifact '{key}': {message}")]
    Persist { key: String, message: String },

    #[error("Failed to delete artifact '{key}': {message}")]
    Janitor { key: String, message: String },

    // === Startup Errors ===
    #[error("Invalid point list: {0}")]
    Points(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RadarError {
    /// Whether the error aborts the current refresh tick.
    ///
    /// Fetch and decode failures leave the previous snapshot in place; every
    /// other kind is confined to one point or one artifact.
    pub fn aborts_tick(&self) -> bool {
        matches!(
            self,
            RadarError::Fetch(_) | RadarError::HttpStatus(_) | RadarError::Decode(_)
        )
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RadarError::Fetch(_) | RadarError::HttpStatus(_) => "fetch",
            RadarError::Decode(_) => "decode",
            RadarError::OutOfBounds { .. } => "out_of_bounds",
            RadarError::Encode(_) => "encode",
            RadarError::Persist { .. } => "persist",
            RadarError::Janitor { .. } => "janitor",
            RadarError::Points(_) => "points",
            RadarError::Config(_) => "config",
        }
    }
}
