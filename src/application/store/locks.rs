//! Per-key session locks.
//!
//! One fair (FIFO) async mutex per session key, created on demand and
//! dropped from the map once nobody holds or waits for it. Keys never block
//! each other.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::SessionStoreError;
use crate::domain::foundation::SessionKey;

/// What to do when a key lock cannot be acquired in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTimeoutPolicy {
    /// Log a warning and continue without the lock.
    #[default]
    Proceed,
    /// Return `SessionStoreError::LockTimeout`.
    Fail,
}

type LockMap = HashMap<SessionKey, Arc<Mutex<()>>>;

#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    map: Arc<StdMutex<LockMap>>,
}

/// Held for the duration of one read-modify-write.
///
/// `held` is false when the lock timed out and the policy let the caller
/// proceed anyway.
#[derive(Debug)]
pub(crate) struct KeyGuard {
    key: SessionKey,
    lock: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
    map: Arc<StdMutex<LockMap>>,
}

impl KeyGuard {
    pub(crate) fn held(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        self.guard.take();

        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        let unused = map
            .get(&self.key)
            .is_some_and(|entry| Arc::ptr_eq(entry, &self.lock) && Arc::strong_count(entry) == 2);
        if unused {
            map.remove(&self.key);
        }
    }
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, waiting at most `timeout`.
    pub(crate) async fn acquire(
        &self,
        key: SessionKey,
        timeout: Duration,
        policy: LockTimeoutPolicy,
    ) -> Result<KeyGuard, SessionStoreError> {
        let lock = {
            let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(key).or_default())
        };

        let guard = match tokio::time::timeout(timeout, Arc::clone(&lock).lock_owned()).await {
            Ok(guard) => Some(guard),
            Err(_) => match policy {
                LockTimeoutPolicy::Proceed => {
                    tracing::warn!(
                        %key,
                        timeout_ms = timeout.as_millis() as u64,
                        "Session lock timed out, proceeding without it"
                    );
                    None
                }
                LockTimeoutPolicy::Fail => {
                    tracing::warn!(%key, timeout_ms = timeout.as_millis() as u64, "Session lock timed out");
                    // Dropping a guard without the lock still cleans up the map entry.
                    drop(KeyGuard {
                        key,
                        lock,
                        guard: None,
                        map: Arc::clone(&self.map),
                    });
                    return Err(SessionStoreError::LockTimeout { key, timeout });
                }
            },
        };

        Ok(KeyGuard {
            key,
            lock,
            guard,
            map: Arc::clone(&self.map),
        })
    }

    /// Number of keys with a live lock entry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
