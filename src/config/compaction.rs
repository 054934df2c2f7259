//! Compaction and sweep configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::compaction::CompactionLimits;

/// Upper bound for every `*_secs` setting: ten years.
const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Compaction configuration
///
/// Defaults mirror [`CompactionLimits::default`], plus the sweep interval.
#[derive(Debug, Clone, Deserialize)]
pub struct CompactionConfig {
    #[serde(default = "default_max_session_bytes")]
    pub max_session_bytes: usize,

    #[serde(default = "default_max_product_quantities")]
    pub max_product_quantities: usize,

    #[serde(default = "default_max_history_depth")]
    pub max_history_depth: usize,

    /// Reporting threshold only; carts are never trimmed
    #[serde(default = "default_max_cart_items")]
    pub max_cart_items: usize,

    #[serde(default = "default_max_inactive")]
    pub max_inactive_secs: u64,

    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    #[serde(default = "default_min_improvement_ratio")]
    pub min_improvement_ratio: f64,

    #[serde(default = "default_selection_ttl")]
    pub selection_ttl_secs: u64,

    /// Seconds between background sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl CompactionConfig {
    pub fn limits(&self) -> CompactionLimits {
        CompactionLimits {
            max_session_bytes: self.max_session_bytes,
            max_product_quantities: self.max_product_quantities,
            max_history_depth: self.max_history_depth,
            max_cart_items: self.max_cart_items,
            max_inactive_secs: self.max_inactive_secs,
            max_age_secs: self.max_age_secs,
            min_improvement_ratio: self.min_improvement_ratio,
            selection_ttl_secs: self.selection_ttl_secs,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate compaction configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("compaction.max_session_bytes", self.max_session_bytes as u64),
            ("compaction.max_product_quantities", self.max_product_quantities as u64),
            ("compaction.max_history_depth", self.max_history_depth as u64),
            ("compaction.max_inactive_secs", self.max_inactive_secs),
            ("compaction.sweep_interval_secs", self.sweep_interval_secs),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ValidationError::MustBePositive(*name));
        }
        let durations = [
            ("compaction.max_inactive_secs", self.max_inactive_secs),
            ("compaction.max_age_secs", self.max_age_secs),
            ("compaction.selection_ttl_secs", self.selection_ttl_secs),
            ("compaction.sweep_interval_secs", self.sweep_interval_secs),
        ];
        if let Some((name, _)) = durations
            .iter()
            .find(|(_, value)| *value > MAX_DURATION_SECS)
        {
            return Err(ValidationError::DurationTooLong(*name, MAX_DURATION_SECS));
        }
        if !(0.0..=1.0).contains(&self.min_improvement_ratio) {
            return Err(ValidationError::InvalidImprovementRatio);
        }
        if self.max_age_secs < self.max_inactive_secs {
            return Err(ValidationError::MaxAgeBelowInactivity);
        }
        Ok(())
    }
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            max_session_bytes: default_max_session_bytes(),
            max_product_quantities: default_max_product_quantities(),
            max_history_depth: default_max_history_depth(),
            max_cart_items: default_max_cart_items(),
            max_inactive_secs: default_max_inactive(),
            max_age_secs: default_max_age(),
            min_improvement_ratio: default_min_improvement_ratio(),
            selection_ttl_secs: default_selection_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_max_session_bytes() -> usize {
    100 * 1024
}

fn default_max_product_quantities() -> usize {
    20
}

fn default_max_history_depth() -> usize {
    10
}

fn default_max_cart_items() -> usize {
    50
}

fn default_max_inactive() -> u64 {
    24 * 60 * 60
}

fn default_max_age() -> u64 {
    7 * 24 * 60 * 60
}

fn default_min_improvement_ratio() -> f64 {
    0.1
}

fn default_selection_ttl() -> u64 {
    60 * 60
}

fn default_sweep_interval() -> u64 {
    60 * 60
}
