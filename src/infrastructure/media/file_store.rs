//! Flat directory of files named by their file key.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::domain::errors::IngestError;

/// Directory holding one file per key.
///
/// Presence of a file is the cache: a key that exists is never fetched again.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates store rooted at `dir`. Nothing is touched on disk.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path for `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Creates the directory and its parents.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub async fn ensure(&self) -> Result<(), IngestError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| IngestError::io(&self.dir, e))
    }

    /// Whether a file for `key` is present.
    pub async fn contains(&self, key: &str) -> bool {
        fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }

    /// Deletes every regular file whose lowercased name is not in `keep`.
    ///
    /// Returns the number of files removed. A missing directory removes
    /// nothing. Individual removal failures are logged and skipped.
    ///
    /// # Errors
    /// Returns error if the directory exists but cannot be listed.
    pub async fn reconcile(&self, keep: &HashSet<String>) -> Result<usize, IngestError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(IngestError::io(&self.dir, e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| IngestError::io(&self.dir, e))?
        {
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if !is_file {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_lowercase();
            if keep.contains(&name) {
                continue;
            }

            let path = entry.path();
            match fs::remove_file(&path).await {
                Ok(()) => {
                    trace!(path = %path.display(), "Removed stale file");
                    removed += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove stale file"),
            }
        }

        if removed > 0 {
            debug!(dir = %self.dir.display(), removed, "Pruned stale files");
        }
        Ok(removed)
    }

    /// Writes `bytes` under `key` via a temporary file and rename, so a
    /// reader never sees a partial file under the final name.
    ///
    /// # Errors
    /// Returns error if the file cannot be written or renamed.
    pub async fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<PathBuf, IngestError> {
        let target = self.path_for(key);
        let temp = self.dir.join(format!(".{key}.{}.part", Uuid::new_v4().simple()));

        if let Err(e) = write_file(&temp, bytes).await {
            remove_quietly(&temp).await;
            return Err(IngestError::io(&temp, e));
        }

        if let Err(e) = fs::rename(&temp, &target).await {
            remove_quietly(&temp).await;
            return Err(IngestError::io(&target, e));
        }

        trace!(path = %target.display(), size = bytes.len(), "Stored file");
        Ok(target)
    }

    /// Deletes the file for `key` if present.
    pub async fn remove(&self, key: &str) {
        remove_quietly(&self.path_for(key)).await;
    }

    /// Removes the directory when it is empty. Errors are ignored.
    pub async fn remove_dir_if_empty(&self) {
        if let Err(e) = fs::remove_dir(&self.dir).await {
            trace!(dir = %self.dir.display(), error = %e, "Directory left in place");
        }
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "Failed to remove file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn keep(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| (*k).to_string()).collect()
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let path = store.write_atomic("1-a.zip", b"payload").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["1-a.zip".to_string()]);
        assert!(store.contains("1-a.zip").await);
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("missing"));

        let err = store.write_atomic("1-a.zip", b"x").await.unwrap_err();

        assert!(matches!(err, IngestError::Io { .. }));
        assert!(!store.contains("1-a.zip").await);
    }

    #[tokio::test]
    async fn test_reconcile_removes_only_unknown_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("1-keep.zip"), b"k").unwrap();
        std::fs::write(dir.path().join("2-Stale.zip"), b"s").unwrap();
        std::fs::write(dir.path().join("3-UPPER.PNG"), b"u").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let store = FileStore::new(dir.path());
        let removed = store
            .reconcile(&keep(&["1-keep.zip", "3-upper.png"]))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(dir.path().join("1-keep.zip").exists());
        assert!(dir.path().join("3-UPPER.PNG").exists());
        assert!(!dir.path().join("2-Stale.zip").exists());
        assert!(dir.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_reconcile_missing_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("absent"));

        assert_eq!(store.reconcile(&keep(&[])).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_dir_if_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("staging"));
        store.ensure().await.unwrap();
        store.write_atomic("x", b"1").await.unwrap();

        store.remove_dir_if_empty().await;
        assert!(store.dir().exists());

        store.remove("x").await;
        store.remove_dir_if_empty().await;
        assert!(!store.dir().exists());
    }
}
