//! Radar rain monitor.
//!
//! Periodically downloads a radar composite, decides for each watched point
//! whether it is raining there, stores an annotated copy of the image and
//! publishes the raining points over HTTP.

pub mod config;
pub mod cycle;
pub mod fetch;
pub mod janitor;
pub mod metrics;
pub mod points;
pub mod server;
pub mod state;
pub mod store;

pub use config::ServiceConfig;
pub use cycle::{CycleSettings, RefreshCycle, TickOutcome};
pub use state::{Snapshot, SnapshotStore};
