//! SessionStore - durable, concurrency-safe per-(user, chat) session state.
//!
//! # Read path
//!
//! `get` serves a cached copy while it is fresh. Otherwise the record is read
//! from storage, parsed and validated; a record that fails validation is
//! replaced by a default session which is persisted immediately. `get` never
//! fails: when storage cannot be read it returns a default without writing.
//!
//! # Write path
//!
//! Every write for a key runs under that key's lock. The session is
//! normalized, validated and, if oversized, compacted before the whole
//! collection is rewritten under the collection write lock. The cache is
//! updated only after the write succeeded.
//!
//! # Leases
//!
//! [`SessionStore::checkout`] holds the key lock for a full
//! read-modify-write spanning several awaits (the event handler's
//! load → transition → effects → persist cycle).

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;

use super::cache::SessionCache;
use super::error::SessionStoreError;
use super::locks::{KeyGuard, KeyLocks, LockTimeoutPolicy};
use crate::domain::compaction::{SessionOptimizer, SweepOutcome};
use crate::domain::foundation::{Language, SessionKey, Timestamp};
use crate::domain::session::{Session, SessionPatch};
use crate::ports::{SessionRecord, SessionStorage, SessionStorageError};

/// Store tuning.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// How long a cached session is served without re-reading storage.
    pub cache_ttl: Duration,
    /// Upper bound on cached sessions.
    pub cache_max_entries: usize,
    /// How long a writer waits for a key lock.
    pub lock_timeout: Duration,
    pub lock_timeout_policy: LockTimeoutPolicy,
    /// Language of freshly created sessions.
    pub default_language: Language,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 10_000,
            lock_timeout: Duration::from_secs(10),
            lock_timeout_policy: LockTimeoutPolicy::default(),
            default_language: Language::default(),
        }
    }
}

/// The canonical owner of every session at rest.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    optimizer: SessionOptimizer,
    config: SessionStoreConfig,
    cache: StdMutex<SessionCache>,
    locks: KeyLocks,
    write_lock: Mutex<()>,
}

/// Exclusive access to one session for a read-modify-write.
///
/// Holds the key lock until committed or dropped. Dropping without
/// committing discards nothing durable.
pub struct SessionLease<'a> {
    store: &'a SessionStore,
    key: SessionKey,
    session: Session,
    guard: KeyGuard,
}

impl SessionLease<'_> {
    pub fn key(&self) -> SessionKey {
        self.key
    }

    /// The session as loaded when the lease was taken.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// False if the lock timed out and the store was configured to proceed.
    pub fn is_exclusive(&self) -> bool {
        self.guard.held()
    }

    /// Persists `session` and releases the lock.
    ///
    /// Returns the session as stored, which may be compacted. On error the
    /// durable copy is unchanged and `session` is untouched.
    pub async fn commit(self, session: &Session) -> Result<Session, SessionStoreError> {
        self.store.store_locked(self.key, session).await
    }
}

impl SessionStore {
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        optimizer: SessionOptimizer,
        config: SessionStoreConfig,
    ) -> Self {
        let cache = SessionCache::new(config.cache_ttl, config.cache_max_entries);
        Self {
            storage,
            optimizer,
            config,
            cache: StdMutex::new(cache),
            locks: KeyLocks::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SessionStoreConfig {
        &self.config
    }

    pub fn optimizer(&self) -> &SessionOptimizer {
        &self.optimizer
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the session for `key`, creating it on first access.
    ///
    /// A fresh cache hit is served without waiting for the key lock: the
    /// cache only ever holds committed sessions.
    pub async fn get(&self, key: SessionKey) -> Session {
        let cached = self.cache().get(&key);
        if let Some(session) = cached {
            return session;
        }

        // Reads always proceed past a lock timeout.
        let _guard = self
            .locks
            .acquire(key, self.config.lock_timeout, LockTimeoutPolicy::Proceed)
            .await
            .ok();
        self.load(key).await
    }

    /// Every stored session that passes validation.
    ///
    /// Invalid records are skipped, not repaired.
    pub async fn list_all(&self) -> Result<Vec<(SessionKey, Session)>, SessionStoreError> {
        let records = self.storage.load_all().await?;
        Ok(records.into_iter().filter_map(parse_record).collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates, compacts if needed and persists `session`.
    ///
    /// Returns the session as stored.
    pub async fn save(
        &self,
        key: SessionKey,
        session: &Session,
    ) -> Result<Session, SessionStoreError> {
        let _guard = self.lock(key).await?;
        self.store_locked(key, session).await
    }

    /// Merges `patch` into the stored session and persists the result.
    ///
    /// Reads storage directly, never the cache.
    pub async fn update(
        &self,
        key: SessionKey,
        patch: SessionPatch,
    ) -> Result<Session, SessionStoreError> {
        let _guard = self.lock(key).await?;

        let records = self.storage.load_all().await?;
        let mut session = self
            .find_valid(key, &records)
            .unwrap_or_else(|| self.fresh_session());
        patch.apply_to(&mut session);

        self.store_locked(key, &session).await
    }

    /// Removes the session. Returns true if a record existed.
    pub async fn delete(&self, key: SessionKey) -> Result<bool, SessionStoreError> {
        let _guard = self.lock(key).await?;
        let id = key.to_string();

        let removed = {
            let _write = self.write_lock.lock().await;
            let mut records = self.storage.load_all().await?;
            let before = records.len();
            records.retain(|record| record.id != id);
            let removed = records.len() != before;
            if removed {
                self.storage.save_all(&records).await?;
            }
            self.cache().remove(&key);
            removed
        };

        tracing::info!(%key, removed, "Session deleted");
        Ok(removed)
    }

    /// Loads the session and holds its lock until the lease is committed or
    /// dropped.
    pub async fn checkout(&self, key: SessionKey) -> Result<SessionLease<'_>, SessionStoreError> {
        let guard = self.lock(key).await?;
        let session = self.load(key).await;
        Ok(SessionLease {
            store: self,
            key,
            session,
            guard,
        })
    }

    /// Deletes expired sessions, clears stale selections and compacts
    /// oversized sessions in one pass over the collection.
    ///
    /// Records that cannot be parsed are deleted too. Key locks are not
    /// taken; a write racing the sweep wins.
    pub async fn sweep(&self, now: Timestamp) -> Result<SweepOutcome, SessionStoreError> {
        let _write = self.write_lock.lock().await;
        let records = self.storage.load_all().await?;

        let mut sessions = Vec::with_capacity(records.len());
        let mut unreadable = HashSet::new();
        for record in &records {
            match parse_record(record.clone()) {
                Some(entry) => sessions.push(entry),
                None => {
                    unreadable.insert(record.id.clone());
                }
            }
        }

        let plan = self.optimizer.plan_sweep(&sessions, now);
        let mut outcome = plan.outcome;
        outcome.examined = records.len();
        outcome.removed += unreadable.len();

        if plan.is_empty() && unreadable.is_empty() {
            tracing::debug!(examined = outcome.examined, "Sweep found nothing to do");
            return Ok(outcome);
        }

        let mut doomed = unreadable;
        doomed.extend(plan.removals.iter().map(|(key, _)| key.to_string()));

        let mut replacements: HashMap<String, Value> = HashMap::new();
        for (key, session) in &plan.replacements {
            replacements.insert(key.to_string(), to_document(session)?);
        }

        let kept: Vec<SessionRecord> = records
            .into_iter()
            .filter(|record| !doomed.contains(&record.id))
            .map(|record| match replacements.remove(&record.id) {
                Some(data) => SessionRecord { id: record.id, data },
                None => record,
            })
            .collect();

        self.storage.save_all(&kept).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to write swept session collection");
            e
        })?;

        {
            let mut cache = self.cache();
            for (key, reason) in &plan.removals {
                tracing::debug!(%key, ?reason, "Session expired");
                cache.remove(key);
            }
            for (key, session) in plan.replacements {
                cache.insert(key, session);
            }
        }

        tracing::info!(
            examined = outcome.examined,
            removed = outcome.removed,
            optimized = outcome.optimized_count,
            selections_cleared = outcome.selections_cleared,
            bytes_saved = outcome.bytes_saved,
            "Session sweep complete"
        );
        Ok(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn cache(&self) -> MutexGuard<'_, SessionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_session(&self) -> Session {
        Session::new(self.config.default_language)
    }

    async fn lock(&self, key: SessionKey) -> Result<KeyGuard, SessionStoreError> {
        self.locks
            .acquire(key, self.config.lock_timeout, self.config.lock_timeout_policy)
            .await
    }

    /// Cache, then storage, then a default. Caller holds the key lock.
    async fn load(&self, key: SessionKey) -> Session {
        let cached = self.cache().get(&key);
        if let Some(session) = cached {
            return session;
        }

        let records = match self.storage.load_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(%key, error = %e, "Failed to read sessions, serving a default");
                return self.fresh_session();
            }
        };

        if let Some(session) = self.find_valid(key, &records) {
            self.cache().insert(key, session.clone());
            return session;
        }

        let session = self.fresh_session();
        if let Err(e) = self.persist(key, &session).await {
            tracing::error!(%key, error = %e, "Failed to persist default session");
        }
        session
    }

    /// Looks up and validates the record for `key`. `None` if it is missing
    /// or invalid.
    fn find_valid(&self, key: SessionKey, records: &[SessionRecord]) -> Option<Session> {
        let id = key.to_string();
        let record = records.iter().find(|record| record.id == id)?;

        match Session::from_stored(record.data.clone()) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(%key, error = %e, "Stored session is invalid, replacing with default");
                None
            }
        }
    }

    /// Normalizes, validates, compacts and persists. Caller holds the key lock.
    async fn store_locked(
        &self,
        key: SessionKey,
        session: &Session,
    ) -> Result<Session, SessionStoreError> {
        let mut session = session.clone();
        session.normalize();
        session.validate()?;

        let size = self.optimizer.check_size(&session);
        if size.is_oversized {
            let (optimized, report) = self.optimizer.optimize(&session);
            tracing::debug!(
                %key,
                original_bytes = report.original_bytes,
                optimized_bytes = report.optimized_bytes,
                reasons = ?size.reasons,
                "Compacted oversized session"
            );
            session = optimized;
        }

        self.persist(key, &session).await?;
        Ok(session)
    }

    /// Patches the record for `key` into the collection and rewrites it.
    async fn persist(&self, key: SessionKey, session: &Session) -> Result<(), SessionStoreError> {
        let record = SessionRecord::new(key, to_document(session)?);

        let _write = self.write_lock.lock().await;
        let mut records = self.storage.load_all().await?;
        match records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }

        self.storage
            .save_all(&records)
            .await
            .map_err(|e: SessionStorageError| {
                tracing::error!(%key, error = %e, "Failed to write session");
                e
            })?;

        self.cache().insert(key, session.clone());
        Ok(())
    }
}

fn to_document(session: &Session) -> Result<Value, SessionStoreError> {
    serde_json::to_value(session).map_err(|e| SessionStoreError::Serialization(e.to_string()))
}

fn parse_record(record: SessionRecord) -> Option<(SessionKey, Session)> {
    let Some(key) = record.key() else {
        tracing::warn!(id = %record.id, "Skipping session record with malformed id");
        return None;
    };
    match Session::from_stored(record.data) {
        Ok(session) => Some((key, session)),
        Err(e) => {
            tracing::warn!(%key, error = %e, "Skipping invalid session record");
            None
        }
    }
}
