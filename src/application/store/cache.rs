//! Read-through cache of validated sessions.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::domain::foundation::SessionKey;
use crate::domain::session::Session;

#[derive(Debug, Clone)]
struct CacheEntry {
    session: Session,
    stored_at: Instant,
}

/// TTL-bounded, capacity-bounded session cache.
///
/// Expired entries are evicted lazily on access and before inserts. When the
/// cache is full the oldest entry makes room.
#[derive(Debug)]
pub(crate) struct SessionCache {
    entries: HashMap<SessionKey, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl SessionCache {
    pub(crate) fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries,
        }
    }

    pub(crate) fn get(&mut self, key: &SessionKey) -> Option<Session> {
        let fresh = self
            .entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;
        if fresh {
            self.entries.get(key).map(|entry| entry.session.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    pub(crate) fn insert(&mut self, key: SessionKey, session: Session) {
        if self.max_entries == 0 || self.ttl.is_zero() {
            return;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_expired();
            if self.entries.len() >= self.max_entries {
                self.evict_oldest();
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                session,
                stored_at: Instant::now(),
            },
        );
    }

    pub(crate) fn remove(&mut self, key: &SessionKey) {
        self.entries.remove(key);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn evict_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
