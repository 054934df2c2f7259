//! Compaction Module - Pure domain services bounding session size and age.
//!
//! # Components
//!
//! - `CompactionLimits` - Thresholds for size, age and transient data
//! - `SessionOptimizer` - `check_size`, `optimize` and `plan_sweep`
//! - `SweepPlan` - What a sweep would remove or rewrite, for the store to apply
//!
//! Nothing here performs I/O. The session store runs `optimize` reactively
//! on save and applies sweep plans produced from a snapshot of all sessions.

mod limits;
mod optimizer;
mod size;
mod sweep;

pub use limits::CompactionLimits;
pub use optimizer::{OptimizationReport, RemovedField, SessionOptimizer};
pub use size::{serialized_size, OversizeReason, SizeReport};
pub use sweep::{ExpiryReason, SweepOutcome, SweepPlan};
