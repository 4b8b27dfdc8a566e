//! Retention sweep for persisted artifacts.
//!
//! Runs at the start of every refresh tick. Deletion is best-effort: failures
//! are logged and counted, and whatever survives is retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::metrics;
use crate::store::ArtifactStore;

/// Counters from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub examined: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Deletes artifacts older than the retention window.
pub struct Janitor {
    store: Arc<dyn ArtifactStore>,
    retention: Duration,
}

impl Janitor {
    pub fn new(store: Arc<dyn ArtifactStore>, retention: Duration) -> Self {
        Self { store, retention }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Sweep using the wall clock.
    pub async fn sweep(&self) -> SweepStats {
        self.sweep_at(Utc::now()).await
    }

    /// Delete every artifact whose age at `now` is at least the retention window.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SweepStats {
        let mut stats = SweepStats::default();

        let entries = match self.store.list().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to list artifacts, skipping sweep");
                stats.failed += 1;
                return stats;
            }
        };

        let retention = chrono::Duration::from_std(self.retention)
            .unwrap_or_else(|_| chrono::Duration::weeks(52 * 100));

        for entry in entries {
            stats.examined += 1;

            let age = now - entry.modified;
            if age < retention {
                continue;
            }

            info!(
                key = %entry.key,
                age_minutes = age.num_minutes(),
                "Deleting old artifact"
            );

            match self.store.delete(&entry.key).await {
                Ok(()) => stats.deleted += 1,
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "Failed to delete artifact");
                    stats.failed += 1;
                }
            }
        }

        metrics::record_sweep(&stats);
        debug!(
            examined = stats.examined,
            deleted = stats.deleted,
            failed = stats.failed,
            "Sweep complete"
        );
        stats
    }
}
