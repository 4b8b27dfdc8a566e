//! Prometheus metrics for the refresh loop.
//!
//! Recording goes through the `metrics` facade; without an installed recorder
//! (tests, `--once`) the calls are no-ops.

use metrics::{counter, gauge, histogram};

use crate::janitor::SweepStats;

/// Record the result of one refresh tick.
pub fn record_tick(outcome: &'static str, duration_ms: f64) {
    counter!("rain_watch_ticks_total", "outcome" => outcome).increment(1);
    histogram!("rain_watch_cycle_duration_ms").record(duration_ms);
}

/// Record a failed download or decode.
pub fn record_fetch_failure(kind: &'static str) {
    counter!("rain_watch_fetch_failures_total", "kind" => kind).increment(1);
}

/// Record a failed artifact write.
pub fn record_persist_failure() {
    counter!("rain_watch_persist_failures_total").increment(1);
}

/// Record the size of the newly published snapshot.
pub fn record_published(raining: usize, out_of_bounds: usize) {
    gauge!("rain_watch_raining_points").set(raining as f64);
    gauge!("rain_watch_out_of_bounds_points").set(out_of_bounds as f64);
}

/// Record janitor activity.
pub fn record_sweep(stats: &SweepStats) {
    counter!("rain_watch_artifacts_deleted_total").increment(stats.deleted as u64);
    if stats.failed > 0 {
        counter!("rain_watch_artifact_delete_failures_total").increment(stats.failed as u64);
    }
}
