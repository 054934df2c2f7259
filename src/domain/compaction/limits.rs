use serde::{Deserialize, Serialize};

/// Thresholds used by the optimizer and the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionLimits {
    /// Serialized size above which a session is oversized.
    pub max_session_bytes: usize,
    /// Product-quantity entries kept by `optimize`.
    pub max_product_quantities: usize,
    /// Visited scenes kept by `optimize`.
    pub max_history_depth: usize,
    /// Cart lines above which the size report flags the cart.
    pub max_cart_items: usize,
    /// Sessions without activity for this long are deleted.
    pub max_inactive_secs: u64,
    /// Sessions created this long ago are deleted regardless of activity.
    pub max_age_secs: u64,
    /// Minimum fraction of bytes an optimization must save to be applied
    /// by the sweep.
    pub min_improvement_ratio: f64,
    /// Transient selections untouched for this long are cleared.
    pub selection_ttl_secs: u64,
}

impl Default for CompactionLimits {
    fn default() -> Self {
        Self {
            max_session_bytes: 100 * 1024,
            max_product_quantities: 20,
            max_history_depth: 10,
            max_cart_items: 50,
            max_inactive_secs: 24 * 60 * 60,
            max_age_secs: 7 * 24 * 60 * 60,
            min_improvement_ratio: 0.1,
            selection_ttl_secs: 60 * 60,
        }
    }
}
