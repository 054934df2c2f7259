//! Session Storage Port - Interface for the durable session collection.
//!
//! The backing store is a single collection of `{id, data}` records that is
//! read and rewritten as a whole. Records are returned raw so a single
//! malformed record can be validated and replaced without failing the load.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::SessionKey;

/// One stored session: `id` is `"<user_id>:<chat_id>"`, `data` the session
/// document as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub data: Value,
}

impl SessionRecord {
    pub fn new(key: SessionKey, data: Value) -> Self {
        Self {
            id: key.to_string(),
            data,
        }
    }

    /// Parses the record id. `None` for ids that are not `user:chat`.
    pub fn key(&self) -> Option<SessionKey> {
        self.id.parse().ok()
    }
}

/// Errors that can occur during session storage operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStorageError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Failed to serialize sessions: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize sessions: {0}")]
    DeserializationFailed(String),
}

impl From<std::io::Error> for SessionStorageError {
    fn from(err: std::io::Error) -> Self {
        SessionStorageError::IoError(err.to_string())
    }
}

/// Port for reading and writing the whole session collection
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load every record.
    ///
    /// A missing collection is empty, not an error.
    ///
    /// # Errors
    /// Returns `SessionStorageError` if the medium cannot be read
    async fn load_all(&self) -> Result<Vec<SessionRecord>, SessionStorageError>;

    /// Replace the whole collection.
    ///
    /// Implementations must make the replacement atomic: readers see either
    /// the old or the new collection, never a mix.
    ///
    /// # Errors
    /// Returns `SessionStorageError` if the write fails; the previous
    /// collection is then still intact
    async fn save_all(&self, records: &[SessionRecord]) -> Result<(), SessionStorageError>;
}
