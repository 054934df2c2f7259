//! Session storage configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::{LockTimeoutPolicy, SessionStoreConfig};
use crate::domain::foundation::Language;

/// Session storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the session collection
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Seconds a cached session is served without re-reading storage
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Maximum cached sessions (0 disables the cache)
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Seconds a writer waits for a session lock
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_secs: u64,

    /// What happens when the lock wait runs out
    #[serde(default)]
    pub lock_timeout_policy: LockTimeoutPolicy,
}

impl StorageConfig {
    /// Session store settings for this configuration
    pub fn store_config(&self, default_language: Language) -> SessionStoreConfig {
        SessionStoreConfig {
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cache_max_entries: self.cache_max_entries,
            lock_timeout: Duration::from_secs(self.lock_timeout_secs),
            lock_timeout_policy: self.lock_timeout_policy,
            default_language,
        }
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.path"));
        }
        if self.lock_timeout_secs == 0 || self.lock_timeout_secs > 300 {
            return Err(ValidationError::InvalidLockTimeout);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            cache_ttl_secs: default_cache_ttl(),
            cache_max_entries: default_cache_max_entries(),
            lock_timeout_secs: default_lock_timeout(),
            lock_timeout_policy: LockTimeoutPolicy::default(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/sessions.json")
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    10_000
}

fn default_lock_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.path, PathBuf::from("./data/sessions.json"));
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.lock_timeout_policy, LockTimeoutPolicy::Proceed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_config_conversion() {
        let config = StorageConfig {
            lock_timeout_secs: 3,
            lock_timeout_policy: LockTimeoutPolicy::Fail,
            ..Default::default()
        };

        let store = config.store_config(Language::Uz);

        assert_eq!(store.lock_timeout, Duration::from_secs(3));
        assert_eq!(store.lock_timeout_policy, LockTimeoutPolicy::Fail);
        assert_eq!(store.cache_ttl, Duration::from_secs(300));
        assert_eq!(store.default_language, Language::Uz);
    }

    #[test]
    fn test_validation_empty_path() {
        let config = StorageConfig {
            path: PathBuf::new(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("storage.path"))
        );
    }

    #[test]
    fn test_validation_invalid_lock_timeout() {
        let config = StorageConfig {
            lock_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLockTimeout));
    }
}
