//! The currently published set of raining points.
//!
//! Readers clone an `Arc` under a read lock and then work on their own
//! reference; the writer swaps in a fully built snapshot under the write lock.
//! Neither side ever holds the lock across I/O.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use radar_common::ObservedPoint;
use serde::Serialize;
use tokio::sync::RwLock;

/// One complete result of a refresh tick. Never mutated once published.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Time bucket key the snapshot was computed for
    pub bucket: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub points: Vec<ObservedPoint>,
}

impl Snapshot {
    pub fn new(bucket: String, points: Vec<ObservedPoint>) -> Self {
        Self {
            bucket: Some(bucket),
            published_at: Some(Utc::now()),
            points,
        }
    }

    /// The state before the first successful tick.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Holder of the current snapshot, shared between the refresh task and readers.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// The latest snapshot. Cheap: only the `Arc` is cloned.
    pub async fn current(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Replace the current snapshot wholesale.
    pub async fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = snapshot;
    }
}
