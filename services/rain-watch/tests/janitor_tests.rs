//! Retention sweeps over on-disk and in-memory artifact stores.

mod common;

use std::fs::File;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{TimeZone, Utc};
use rain_watch::janitor::{Janitor, SweepStats};
use rain_watch::store::{ArtifactStore, FsArtifactStore};

use common::MemoryArtifactStore;

const HOUR: Duration = Duration::from_secs(3600);

fn age_file(path: &std::path::Path, age: Duration) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

#[tokio::test]
async fn test_sweep_deletes_only_expired_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsArtifactStore::open(dir.path(), "radar_points_").await.unwrap());

    store.put("20240601.1200", b"old").await.unwrap();
    store.put("20240601.1300", b"recent").await.unwrap();
    age_file(&store.path_for("20240601.1200"), Duration::from_secs(90 * 60));
    age_file(&store.path_for("20240601.1300"), Duration::from_secs(30 * 60));

    let janitor = Janitor::new(store.clone(), HOUR);
    let stats = janitor.sweep().await;

    assert_eq!(
        stats,
        SweepStats {
            examined: 2,
            deleted: 1,
            failed: 0
        }
    );
    assert!(!store.path_for("20240601.1200").exists());
    assert!(store.path_for("20240601.1300").exists());
}

#[tokio::test]
async fn test_sweep_leaves_foreign_files_alone() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsArtifactStore::open(dir.path(), "radar_points_").await.unwrap());

    let foreign = dir.path().join("README.png");
    std::fs::write(&foreign, b"not ours").unwrap();
    age_file(&foreign, Duration::from_secs(24 * 3600));

    let stats = Janitor::new(store, HOUR).sweep().await;

    assert_eq!(stats.examined, 0);
    assert!(foreign.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_entry_does_not_stop_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsArtifactStore::open(dir.path(), "radar_points_").await.unwrap());

    store.put("20240601.1200", b"old").await.unwrap();
    age_file(&store.path_for("20240601.1200"), Duration::from_secs(90 * 60));

    // Stat fails on a dangling link, like a file removed mid-listing
    std::os::unix::fs::symlink(
        dir.path().join("gone.png"),
        store.path_for("20240601.1150"),
    )
    .unwrap();

    let keys: Vec<String> = store.list().await.unwrap().into_iter().map(|e| e.key).collect();
    assert_eq!(keys, vec!["20240601.1200"]);

    let stats = Janitor::new(store.clone(), HOUR).sweep().await;

    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.failed, 0);
    assert!(!store.path_for("20240601.1200").exists());
}

#[tokio::test]
async fn test_artifact_exactly_at_retention_is_deleted() {
    let store = MemoryArtifactStore::new();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap();
    store.insert_at("20240601.1400", now - chrono::Duration::minutes(60));
    store.insert_at("20240601.1410", now - chrono::Duration::minutes(59));

    let stats = Janitor::new(store.clone(), HOUR).sweep_at(now).await;

    assert_eq!(stats.deleted, 1);
    assert_eq!(store.keys(), vec!["20240601.1410"]);
}

#[tokio::test]
async fn test_delete_failures_are_counted_not_fatal() {
    let store = MemoryArtifactStore::new();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap();
    store.insert_at("20240601.1200", now - chrono::Duration::hours(3));
    store.insert_at("20240601.1210", now - chrono::Duration::hours(2));
    store.fail_delete.store(true, Ordering::SeqCst);

    let janitor = Janitor::new(store.clone(), HOUR);
    let stats = janitor.sweep_at(now).await;

    assert_eq!(
        stats,
        SweepStats {
            examined: 2,
            deleted: 0,
            failed: 2
        }
    );
    assert_eq!(store.keys().len(), 2);

    // Retried on the next sweep once deletion works again
    store.fail_delete.store(false, Ordering::SeqCst);
    let stats = janitor.sweep_at(now).await;
    assert_eq!(stats.deleted, 2);
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_missing_directory_is_a_failed_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("artifacts");
    let store = Arc::new(FsArtifactStore::open(&root, "radar_points_").await.unwrap());
    std::fs::remove_dir_all(&root).unwrap();

    let stats = Janitor::new(store, HOUR).sweep().await;

    assert_eq!(stats.examined, 0);
    assert_eq!(stats.failed, 1);
}
