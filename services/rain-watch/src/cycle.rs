//! Refresh cycle: one pass from time bucket to published snapshot, and the
//! timer loop that drives it.
//!
//! Each tick:
//! 1. Sweep artifacts past retention
//! 2. Compute the time bucket; skip if it was already published or its
//!    artifact already exists
//! 3. Fetch and decode the radar image
//! 4. Classify every point and paint markers
//! 5. Persist the annotated image (failure is logged, not fatal)
//! 6. Publish the new snapshot
//!
//! Fetch and decode failures end the tick early and leave the previous
//! snapshot in place.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use radar_common::{GeoPoint, RadarError, RadarResult, RasterBounds, TimeBucket};
use renderer::{decode_raster, encode_png, survey, SurveyReport};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument, warn};

use crate::fetch::RasterSource;
use crate::janitor::Janitor;
use crate::metrics;
use crate::state::{Snapshot, SnapshotStore};
use crate::store::ArtifactStore;

/// Static parameters of the refresh cycle.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub bounds: RasterBounds,
    pub bucket_minutes: u32,
    pub interval: Duration,
}

/// What a completed tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The bucket was already processed; nothing was fetched.
    Skipped { bucket: TimeBucket },
    /// A new snapshot was published.
    Published {
        bucket: TimeBucket,
        report: SurveyReport,
        /// Whether the annotated artifact was stored
        persisted: bool,
    },
}

impl TickOutcome {
    fn label(&self) -> &'static str {
        match self {
            TickOutcome::Skipped { .. } => "skipped",
            TickOutcome::Published { .. } => "published",
        }
    }
}

/// Runs refresh ticks against a raster source, an artifact store and the
/// snapshot store. Only one tick runs at a time.
pub struct RefreshCycle {
    settings: CycleSettings,
    points: Arc<[GeoPoint]>,
    source: Arc<dyn RasterSource>,
    artifacts: Arc<dyn ArtifactStore>,
    janitor: Janitor,
    snapshots: Arc<SnapshotStore>,
}

impl RefreshCycle {
    pub fn new(
        settings: CycleSettings,
        points: Arc<[GeoPoint]>,
        source: Arc<dyn RasterSource>,
        artifacts: Arc<dyn ArtifactStore>,
        janitor: Janitor,
        snapshots: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            settings,
            points,
            source,
            artifacts,
            janitor,
            snapshots,
        }
    }

    /// Run one tick at the current wall-clock time.
    pub async fn tick(&self) -> RadarResult<TickOutcome> {
        self.tick_at(Utc::now()).await
    }

    /// Run one tick as if the current time were `now`.
    #[instrument(skip(self), fields(points = self.points.len()))]
    pub async fn tick_at(&self, now: DateTime<Utc>) -> RadarResult<TickOutcome> {
        let started = Instant::now();
        let result = self.run_tick(now).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        record_result(&result, elapsed_ms);
        result
    }

    async fn run_tick(&self, now: DateTime<Utc>) -> RadarResult<TickOutcome> {
        self.janitor.sweep_at(now).await;

        let bucket = TimeBucket::containing(now, self.settings.bucket_minutes)?;
        let key = bucket.key();

        // Covers buckets whose artifact could not be stored
        if self.snapshots.current().await.bucket.as_deref() == Some(key.as_str()) {
            info!(bucket = %key, "Bucket already published, skipping");
            return Ok(TickOutcome::Skipped { bucket });
        }

        match self.artifacts.exists(&key).await {
            Ok(true) => {
                info!(bucket = %key, "Already processed, skipping");
                return Ok(TickOutcome::Skipped { bucket });
            }
            Ok(false) => {}
            Err(e) => {
                warn!(bucket = %key, error = %e, "Cannot check for existing artifact, processing anyway");
            }
        }

        let bytes = match self.source.fetch(&bucket).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(bucket = %key, error = %e, "Cannot download radar image, skipping");
                return Err(e);
            }
        };

        let (report, artifact) = self.classify(bytes).await.map_err(|e| {
            warn!(bucket = %key, error = %e, "Cannot process radar image, skipping");
            e
        })?;

        let persisted = match artifact {
            Ok(png) => match self.artifacts.put(&key, &png).await {
                Ok(()) => true,
                Err(e) => {
                    error!(bucket = %key, error = %e, "Failed to store artifact");
                    metrics::record_persist_failure();
                    false
                }
            },
            Err(e) => {
                error!(bucket = %key, error = %e, "Failed to encode artifact");
                metrics::record_persist_failure();
                false
            }
        };

        self.snapshots
            .publish(Snapshot::new(key.clone(), report.raining.clone()))
            .await;
        metrics::record_published(report.raining.len(), report.out_of_bounds.len());

        info!(
            bucket = %key,
            raining = report.raining.len(),
            clear = report.clear,
            out_of_bounds = report.out_of_bounds.len(),
            persisted = persisted,
            "Published snapshot"
        );

        Ok(TickOutcome::Published {
            bucket,
            report,
            persisted,
        })
    }

    /// Decode, classify and encode on the blocking pool.
    ///
    /// The outer error aborts the tick (decode failure); the inner one only
    /// affects the artifact.
    async fn classify(
        &self,
        bytes: bytes::Bytes,
    ) -> RadarResult<(SurveyReport, RadarResult<Vec<u8>>)> {
        let points = self.points.clone();
        let bounds = self.settings.bounds;

        tokio::task::spawn_blocking(move || -> RadarResult<_> {
            let mut raster = decode_raster(&bytes)?;
            let report = survey(&mut raster, &bounds, &points);
            Ok((report, encode_png(&raster)))
        })
        .await
        .map_err(|e| RadarError::Decode(format!("classification task failed: {}", e)))?
    }

    /// Tick on a fixed interval until a shutdown signal arrives.
    ///
    /// The first tick runs immediately. A tick that overruns the interval
    /// delays the next one instead of queueing extra ticks.
    pub async fn run_forever(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.settings.interval.as_secs(),
            retention_secs = self.janitor.retention().as_secs(),
            "Starting refresh loop"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutting down refresh loop");
                    break;
                }
                _ = ticker.tick() => {
                    // Errors are already logged inside the tick
                    let _ = self.tick().await;
                }
            }
        }
    }
}

fn record_result(result: &RadarResult<TickOutcome>, elapsed_ms: f64) {
    match result {
        Ok(outcome) => metrics::record_tick(outcome.label(), elapsed_ms),
        Err(e) => {
            metrics::record_tick("failed", elapsed_ms);
            if e.aborts_tick() {
                metrics::record_fetch_failure(e.kind());
            }
        }
    }
}
