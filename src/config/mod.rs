//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ORDERFLOW` prefix and nested values use double underscores as separators.
//! Every setting has a default, so an empty environment is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use orderflow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Sessions stored in {}", config.storage.path.display());
//! ```

mod compaction;
mod error;
mod runtime;
mod storage;

pub use compaction::CompactionConfig;
pub use error::{ConfigError, ValidationError};
pub use runtime::{Environment, RuntimeConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Runtime configuration (environment, logging, default language)
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Session storage configuration (file, cache, locks)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Compaction limits and sweep schedule
    #[serde(default)]
    pub compaction: CompactionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ORDERFLOW` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ORDERFLOW__STORAGE__PATH=/var/lib/orderflow/sessions.json` -> `storage.path`
    /// - `ORDERFLOW__STORAGE__LOCK_TIMEOUT_POLICY=fail` -> `storage.lock_timeout_policy`
    /// - `ORDERFLOW__COMPACTION__MAX_INACTIVE_SECS=3600` -> `compaction.max_inactive_secs`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ORDERFLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.runtime.validate()?;
        self.storage.validate()?;
        self.compaction.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::LockTimeoutPolicy;
    use crate::domain::foundation::Language;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "ORDERFLOW__RUNTIME__ENVIRONMENT",
        "ORDERFLOW__RUNTIME__DEFAULT_LANGUAGE",
        "ORDERFLOW__STORAGE__PATH",
        "ORDERFLOW__STORAGE__LOCK_TIMEOUT_POLICY",
        "ORDERFLOW__COMPACTION__MIN_IMPROVEMENT_RATIO",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.storage.lock_timeout_secs, 10);
        assert_eq!(config.compaction.max_product_quantities, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ORDERFLOW__RUNTIME__DEFAULT_LANGUAGE", "ru");
        env::set_var("ORDERFLOW__STORAGE__PATH", "/tmp/orderflow/sessions.json");
        env::set_var("ORDERFLOW__STORAGE__LOCK_TIMEOUT_POLICY", "fail");
        env::set_var("ORDERFLOW__COMPACTION__MIN_IMPROVEMENT_RATIO", "0.25");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.runtime.default_language, Language::Ru);
        assert_eq!(
            config.storage.path,
            std::path::PathBuf::from("/tmp/orderflow/sessions.json")
        );
        assert_eq!(config.storage.lock_timeout_policy, LockTimeoutPolicy::Fail);
        assert_eq!(config.compaction.min_improvement_ratio, 0.25);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ORDERFLOW__RUNTIME__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_validate_rejects_bad_section() {
        let mut config = AppConfig::default();
        config.compaction.max_age_secs = 1;

        assert_eq!(config.validate(), Err(ValidationError::MaxAgeBelowInactivity));
    }
}
