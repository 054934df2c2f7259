//! In-Memory Session Storage Adapter
//!
//! Holds the session collection in memory. Useful for testing and
//! development; writes can be made to fail to exercise error paths.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{SessionRecord, SessionStorage, SessionStorageError};

/// In-memory storage for the session collection
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStorage {
    records: Arc<RwLock<Vec<SessionRecord>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemorySessionStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-loaded with records
    pub fn with_records(records: Vec<SessionRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `save_all` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current records
    pub async fn records(&self) -> Vec<SessionRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn load_all(&self) -> Result<Vec<SessionRecord>, SessionStorageError> {
        Ok(self.records.read().await.clone())
    }

    async fn save_all(&self, records: &[SessionRecord]) -> Result<(), SessionStorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SessionStorageError::IoError("simulated write failure".to_string()));
        }
        *self.records.write().await = records.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionKey;
    use serde_json::json;

    #[tokio::test]
    async fn save_and_load() {
        let storage = InMemorySessionStorage::new();
        let records = vec![SessionRecord::new(SessionKey::new(1, 2), json!({"language": "ru"}))];

        storage.save_all(&records).await.unwrap();

        assert_eq!(storage.load_all().await.unwrap(), records);
        assert_eq!(storage.write_count(), 1);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_records() {
        let storage = InMemorySessionStorage::with_records(vec![SessionRecord::new(
            SessionKey::new(1, 1),
            json!({"language": "en"}),
        )]);
        storage.fail_writes(true);

        let result = storage.save_all(&[]).await;

        assert!(matches!(result, Err(SessionStorageError::IoError(_))));
        assert_eq!(storage.records().await.len(), 1);
    }
}
