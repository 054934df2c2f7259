//! Session optimizer.
//!
//! Rewrites a session into a smaller equivalent by dropping data that can be
//! refetched or that no longer matters to the conversation. Identity-critical
//! data (profile, cart lines, scene position) is never touched.

use serde::{Deserialize, Serialize};

use super::limits::CompactionLimits;
use super::size::{inspect, serialized_size, SizeReport};
use super::sweep::{self, SweepPlan};
use crate::domain::foundation::{SessionKey, Timestamp};
use crate::domain::session::{PendingInput, Session};

/// A piece of data `optimize` dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum RemovedField {
    CachedBranches,
    CachedCategories,
    CachedProducts,
    CategoryDetails,
    ProductDetails,
    ProductQuantities { dropped: usize },
    PendingInput { input: PendingInput },
    History { dropped: usize },
}

/// What `optimize` did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub original_bytes: usize,
    pub optimized_bytes: usize,
    /// `optimized_bytes / original_bytes`; 1.0 means nothing was saved.
    pub compression_ratio: f64,
    pub removed_fields: Vec<RemovedField>,
}

impl OptimizationReport {
    pub fn bytes_saved(&self) -> usize {
        self.original_bytes.saturating_sub(self.optimized_bytes)
    }

    /// Fraction of the original size that was saved.
    pub fn savings_ratio(&self) -> f64 {
        1.0 - self.compression_ratio
    }

    pub fn changed(&self) -> bool {
        !self.removed_fields.is_empty()
    }
}

/// Size and age policy for sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionOptimizer {
    limits: CompactionLimits,
}

impl SessionOptimizer {
    pub fn new(limits: CompactionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &CompactionLimits {
        &self.limits
    }

    /// Measures a session against the size limits.
    pub fn check_size(&self, session: &Session) -> SizeReport {
        inspect(session, &self.limits)
    }

    /// Returns a compacted copy of `session`.
    ///
    /// Deterministic and idempotent: optimizing the result again removes
    /// nothing. Cart lines are never changed.
    pub fn optimize(&self, session: &Session) -> (Session, OptimizationReport) {
        let original_bytes = serialized_size(session);
        let mut optimized = session.clone();
        let mut removed = Vec::new();

        let selection = &mut optimized.selection;
        if selection.cached_branches.take().is_some() {
            removed.push(RemovedField::CachedBranches);
        }
        if selection.cached_categories.take().is_some() {
            removed.push(RemovedField::CachedCategories);
        }
        if selection.cached_products.take().is_some() {
            removed.push(RemovedField::CachedProducts);
        }

        if let Some(category) = selection.category.as_mut() {
            if category.is_detailed() {
                *category = category.demoted();
                removed.push(RemovedField::CategoryDetails);
            }
        }
        if let Some(product) = selection.product.as_mut() {
            if product.is_detailed() {
                *product = product.demoted();
                removed.push(RemovedField::ProductDetails);
            }
        }

        let dropped = selection
            .quantities
            .truncate_to_recent(self.limits.max_product_quantities);
        if dropped > 0 {
            removed.push(RemovedField::ProductQuantities { dropped });
        }

        let scene = &mut optimized.scene;
        if let Some(input) = scene.pending {
            if !input.is_owned_by(scene.current) {
                scene.pending = None;
                removed.push(RemovedField::PendingInput { input });
            }
        }

        let overflow = scene
            .history
            .len()
            .saturating_sub(self.limits.max_history_depth);
        if overflow > 0 {
            scene.history.drain(..overflow);
            removed.push(RemovedField::History { dropped: overflow });
        }

        let optimized_bytes = serialized_size(&optimized);
        let compression_ratio = if original_bytes == 0 {
            1.0
        } else {
            optimized_bytes as f64 / original_bytes as f64
        };

        let report = OptimizationReport {
            original_bytes,
            optimized_bytes,
            compression_ratio,
            removed_fields: removed,
        };
        (optimized, report)
    }

    /// Decides what a sweep over `sessions` should delete and rewrite.
    pub fn plan_sweep(&self, sessions: &[(SessionKey, Session)], now: Timestamp) -> SweepPlan {
        sweep::plan(self, sessions, now)
    }
}
