//! Session store errors.

use std::time::Duration;

use crate::domain::foundation::{SessionKey, ValidationError};
use crate::ports::SessionStorageError;

/// Errors surfaced by [`super::SessionStore`] writes.
///
/// `get` never returns these: read failures are recovered by substituting a
/// default session.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] SessionStorageError),

    #[error("Timed out after {timeout:?} waiting for the lock on session {key}")]
    LockTimeout { key: SessionKey, timeout: Duration },

    #[error("Invalid session: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to serialize session: {0}")]
    Serialization(String),
}

impl SessionStoreError {
    /// True if the durable collection could not be read or written.
    pub fn is_storage(&self) -> bool {
        matches!(self, SessionStoreError::Storage(_))
    }
}
