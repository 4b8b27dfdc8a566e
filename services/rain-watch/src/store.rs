//! Persistence of annotated radar images, keyed by time bucket.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use radar_common::{RadarError, RadarResult};
use tokio::fs;
use tracing::{debug, info, warn};

/// A stored artifact and when it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub key: String,
    pub modified: DateTime<Utc>,
}

/// Blob storage for artifacts, one blob per processed time bucket.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Whether an artifact for `key` has already been written.
    async fn exists(&self, key: &str) -> RadarResult<bool>;

    /// Store `data` under `key`, replacing any previous blob.
    async fn put(&self, key: &str, data: &[u8]) -> RadarResult<()>;

    /// All artifacts owned by this store.
    async fn list(&self) -> RadarResult<Vec<ArtifactEntry>>;

    /// Remove the artifact for `key`.
    async fn delete(&self, key: &str) -> RadarResult<()>;
}

/// Stores artifacts as `{prefix}{key}.png` files in a directory.
///
/// Only files carrying the prefix are listed, so other files that happen to
/// share the directory are never touched by the janitor.
pub struct FsArtifactStore {
    dir: PathBuf,
    prefix: String,
}

const EXTENSION: &str = ".png";

impl FsArtifactStore {
    /// Open (and create if needed) the artifact directory.
    pub async fn open(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> RadarResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| RadarError::Persist {
            key: dir.display().to_string(),
            message: format!("cannot create artifact directory: {}", e),
        })?;

        info!(dir = %dir.display(), "Opened artifact store");
        Ok(Self {
            dir,
            prefix: prefix.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", self.prefix, key, EXTENSION))
    }

    /// Recover the key from a file name, if the file belongs to this store.
    fn key_from_file_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(EXTENSION)
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn exists(&self, key: &str) -> RadarResult<bool> {
        fs::try_exists(self.path_for(key))
            .await
            .map_err(|e| RadarError::Persist {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    async fn put(&self, key: &str, data: &[u8]) -> RadarResult<()> {
        let path = self.path_for(key);
        let partial = path.with_extension("png.partial");
        let persist_err = |e: std::io::Error| RadarError::Persist {
            key: key.to_string(),
            message: e.to_string(),
        };

        // Write then rename so `exists` never sees a half-written file
        fs::write(&partial, data).await.map_err(persist_err)?;
        if let Err(e) = fs::rename(&partial, &path).await {
            fs::remove_file(&partial).await.ok();
            return Err(persist_err(e));
        }

        debug!(path = %path.display(), bytes = data.len(), "Stored artifact");
        Ok(())
    }

    async fn list(&self) -> RadarResult<Vec<ArtifactEntry>> {
        let list_err = |e: std::io::Error| RadarError::Janitor {
            key: self.dir.display().to_string(),
            message: format!("cannot list artifacts: {}", e),
        };

        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await.map_err(list_err)?;

        while let Some(entry) = dir.next_entry().await.map_err(list_err)? {
            let file_name = entry.file_name();
            let Some(key) = file_name.to_str().and_then(|n| self.key_from_file_name(n)) else {
                continue;
            };

            // Follows symlinks; an entry that vanished since read_dir fails here
            let metadata = match fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(key = %key, error = %e, "Cannot stat artifact, skipping");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(key = %key, error = %e, "Artifact has no modification time, skipping");
                    continue;
                }
            };

            entries.push(ArtifactEntry {
                key: key.to_string(),
                modified: DateTime::<Utc>::from(modified),
            });
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    async fn delete(&self, key: &str) -> RadarResult<()> {
        fs::remove_file(self.path_for(key))
            .await
            .map_err(|e| RadarError::Janitor {
                key: key.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_exists_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::open(dir.path(), "radar_points_").await.unwrap();

        assert!(!store.exists("20240601.1420").await.unwrap());
        store.put("20240601.1420", b"png bytes").await.unwrap();
        assert!(store.exists("20240601.1420").await.unwrap());
        assert!(dir.path().join("radar_points_20240601.1420.png").exists());

        store.delete("20240601.1420").await.unwrap();
        assert!(!store.exists("20240601.1420").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::open(dir.path(), "radar_points_").await.unwrap();

        store.put("20240601.1420", b"a").await.unwrap();
        store.put("20240601.1430", b"b").await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();
        std::fs::write(dir.path().join("radar_points_.png"), b"no key").unwrap();
        std::fs::write(dir.path().join("radar_points_x.png.partial"), b"tmp").unwrap();

        let keys: Vec<String> = store.list().await.unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["20240601.1420", "20240601.1430"]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_janitor_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::open(dir.path(), "p_").await.unwrap();
        let err = store.delete("nope").await.unwrap_err();
        assert_eq!(err.kind(), "janitor");
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FsArtifactStore::open(&nested, "p_").await.unwrap();
        assert!(store.dir().is_dir());
    }
}
