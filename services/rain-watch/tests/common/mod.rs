//! In-memory fakes for the refresh cycle's collaborators.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use image::RgbaImage;
use radar_common::{GeoPoint, RadarError, RadarResult, RasterBounds, TimeBucket};
use rain_watch::cycle::{CycleSettings, RefreshCycle};
use rain_watch::fetch::RasterSource;
use rain_watch::janitor::Janitor;
use rain_watch::state::SnapshotStore;
use rain_watch::store::{ArtifactEntry, ArtifactStore};

/// What the fake source answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    Image(Bytes),
    Garbage,
    NotFound,
    Unreachable,
}

/// A raster source that serves a canned reply and counts requests.
pub struct FakeSource {
    reply: Mutex<Reply>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn serving(raster: &RgbaImage) -> Arc<Self> {
        Self::new(Reply::Image(Bytes::from(test_utils::png_bytes(raster))))
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Bucket keys in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl RasterSource for FakeSource {
    async fn fetch(&self, bucket: &TimeBucket) -> RadarResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(bucket.key());

        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Image(bytes) => Ok(bytes),
            Reply::Garbage => Ok(Bytes::from_static(b"<html>not an image</html>")),
            Reply::NotFound => Err(RadarError::HttpStatus(404)),
            Reply::Unreachable => Err(RadarError::Fetch("connection refused".into())),
        }
    }
}

/// An artifact store kept in memory, with switchable failures.
#[derive(Default)]
pub struct MemoryArtifactStore {
    blobs: Mutex<BTreeMap<String, (Vec<u8>, DateTime<Utc>)>>,
    pub fail_put: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl MemoryArtifactStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a blob with an explicit modification time.
    pub fn insert_at(&self, key: &str, modified: DateTime<Utc>) {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), (b"old".to_vec(), modified));
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(key).map(|(data, _)| data.clone())
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn exists(&self, key: &str) -> RadarResult<bool> {
        Ok(self.blobs.lock().unwrap().contains_key(key))
    }

    async fn put(&self, key: &str, data: &[u8]) -> RadarResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(RadarError::Persist {
                key: key.to_string(),
                message: "disk full".into(),
            });
        }
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), Utc::now()));
        Ok(())
    }

    async fn list(&self) -> RadarResult<Vec<ArtifactEntry>> {
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .iter()
            .map(|(key, (_, modified))| ArtifactEntry {
                key: key.clone(),
                modified: *modified,
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> RadarResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RadarError::Janitor {
                key: key.to_string(),
                message: "permission denied".into(),
            });
        }
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}

pub const WIDTH: u32 = 500;
pub const HEIGHT: u32 = 500;

/// Everything a cycle test needs to poke at.
pub struct Harness {
    pub cycle: RefreshCycle,
    pub source: Arc<FakeSource>,
    pub artifacts: Arc<MemoryArtifactStore>,
    pub snapshots: Arc<SnapshotStore>,
}

pub fn harness(points: Vec<GeoPoint>, source: Arc<FakeSource>) -> Harness {
    let artifacts = MemoryArtifactStore::new();
    let snapshots = Arc::new(SnapshotStore::new());
    let janitor = Janitor::new(artifacts.clone(), Duration::from_secs(3600));

    let cycle = RefreshCycle::new(
        CycleSettings {
            bounds: RasterBounds::CZECHIA,
            bucket_minutes: 10,
            interval: Duration::from_secs(60),
        },
        points.into(),
        source.clone(),
        artifacts.clone(),
        janitor,
        snapshots.clone(),
    );

    Harness {
        cycle,
        source,
        artifacts,
        snapshots,
    }
}
