//! Shared test utilities for the rain-watch workspace.
//!
//! - Synthetic radar rasters with painted precipitation cells
//! - PNG bytes for feeding the refresh cycle
//! - Point lists and on-disk point files
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
