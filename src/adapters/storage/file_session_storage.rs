//! File-based Session Storage Adapter
//!
//! Stores the whole session collection as one JSON array of `{id, data}`
//! records.
//!
//! # Atomic Writes
//!
//! Every save writes the full collection with a write-to-temp-then-rename:
//! 1. Write JSON to `{file}.tmp`
//! 2. Sync to disk
//! 3. Rename over `{file}`
//!
//! A crash mid-write leaves the previous collection in place.
//!
//! # Corrupt Files
//!
//! A file that is not a JSON array of records is moved aside to
//! `{file}.corrupt-{timestamp}` and the collection starts empty, so one bad
//! write cannot take the service down.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::ports::{SessionRecord, SessionStorage, SessionStorageError};

/// JSON file storage for the session collection
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Create a storage backed by `path`
    ///
    /// # Example
    /// ```ignore
    /// let storage = FileSessionStorage::new("./data/sessions.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3f")));
        PathBuf::from(name)
    }

    /// Ensure the parent directory exists
    async fn ensure_parent(&self) -> Result<(), SessionStorageError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .await
                .map_err(|e| {
                    SessionStorageError::IoError(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                }),
            _ => Ok(()),
        }
    }

    async fn quarantine(&self, reason: &str) -> Result<(), SessionStorageError> {
        let target = self.quarantine_path();
        tracing::error!(
            path = %self.path.display(),
            quarantined_to = %target.display(),
            reason,
            "Session file is corrupt, starting with an empty collection"
        );
        fs::rename(&self.path, &target).await.map_err(|e| {
            SessionStorageError::IoError(format!(
                "Failed to move corrupt file {} to {}: {}",
                self.path.display(),
                target.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load_all(&self) -> Result<Vec<SessionRecord>, SessionStorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SessionStorageError::IoError(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        match serde_json::from_slice::<Vec<SessionRecord>>(&bytes) {
            Ok(records) => Ok(records),
            Err(e) => {
                self.quarantine(&e.to_string()).await?;
                Ok(Vec::new())
            }
        }
    }

    async fn save_all(&self, records: &[SessionRecord]) -> Result<(), SessionStorageError> {
        self.ensure_parent().await?;

        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| SessionStorageError::SerializationFailed(e.to_string()))?;

        let temp_path = self.temp_path();

        // Write to temp file
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            SessionStorageError::IoError(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.write_all(&json).await.map_err(|e| {
            SessionStorageError::IoError(format!(
                "Failed to write to temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        // Sync to disk
        file.sync_all().await.map_err(|e| {
            SessionStorageError::IoError(format!(
                "Failed to sync temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        drop(file);

        // Atomic rename
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            SessionStorageError::IoError(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), records = records.len(), "Session collection written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionKey;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_storage() -> (FileSessionStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(temp_dir.path().join("data").join("sessions.json"));
        (storage, temp_dir)
    }

    fn record(user: i64, chat: i64) -> SessionRecord {
        SessionRecord::new(SessionKey::new(user, chat), json!({ "language": "en" }))
    }

    #[tokio::test]
    async fn missing_file_is_empty_collection() {
        let (storage, _temp) = create_storage();
        assert!(storage.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_returns_records() {
        let (storage, _temp) = create_storage();
        let records = vec![record(1, 2), record(3, 4)];

        storage.save_all(&records).await.unwrap();

        assert_eq!(storage.load_all().await.unwrap(), records);
    }

    #[tokio::test]
    async fn file_is_a_json_array_of_id_data_records() {
        let (storage, _temp) = create_storage();
        storage.save_all(&[record(111, 222)]).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(storage.path()).unwrap()).unwrap();

        assert_eq!(raw[0]["id"], "111:222");
        assert_eq!(raw[0]["data"]["language"], "en");
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file() {
        let (storage, _temp) = create_storage();
        storage.save_all(&[record(1, 1)]).await.unwrap();

        assert!(storage.path().exists());
        assert!(!storage.temp_path().exists());
    }

    #[tokio::test]
    async fn save_replaces_previous_collection() {
        let (storage, _temp) = create_storage();
        storage.save_all(&[record(1, 1), record(2, 2)]).await.unwrap();
        storage.save_all(&[record(3, 3)]).await.unwrap();

        let loaded = storage.load_all().await.unwrap();
        assert_eq!(loaded, vec![record(3, 3)]);
    }

    #[tokio::test]
    async fn empty_file_is_empty_collection() {
        let (storage, _temp) = create_storage();
        storage.ensure_parent().await.unwrap();
        std::fs::write(storage.path(), "  \n").unwrap();

        assert!(storage.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_quarantined() {
        let (storage, temp) = create_storage();
        storage.ensure_parent().await.unwrap();
        std::fs::write(storage.path(), "{ not json").unwrap();

        let loaded = storage.load_all().await.unwrap();

        assert!(loaded.is_empty());
        assert!(!storage.path().exists());
        let quarantined = std::fs::read_dir(temp.path().join("data"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .any(|entry| entry.file_name().to_string_lossy().contains(".corrupt-"));
        assert!(quarantined);
    }
}
