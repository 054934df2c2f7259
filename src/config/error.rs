//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid lock timeout (must be 1..=300 seconds)")]
    InvalidLockTimeout,

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("{0} must not exceed {1} seconds")]
    DurationTooLong(&'static str, u64),

    #[error("min_improvement_ratio must be within [0, 1]")]
    InvalidImprovementRatio,

    #[error("max_age_secs must not be shorter than max_inactive_secs")]
    MaxAgeBelowInactivity,
}
