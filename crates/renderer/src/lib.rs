//! Raster handling for radar point classification.
//!
//! - Decoding and encoding of radar images
//! - Neighborhood color sampling
//! - Marker annotation for the persisted artifact
//! - The per-image classification pass over all watched points

pub mod annotate;
pub mod codec;
pub mod sampling;
pub mod survey;

/// A decoded radar image. Non-premultiplied RGBA, row 0 at the top.
pub type Raster = image::RgbaImage;

pub use annotate::{annotate, Marker};
pub use codec::{decode_raster, encode_png};
pub use sampling::{sample, SAMPLE_RADIUS};
pub use survey::{survey, SurveyReport};
