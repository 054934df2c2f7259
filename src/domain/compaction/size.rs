//! Size inspection.

use serde::{Deserialize, Serialize};

use super::limits::CompactionLimits;
use crate::domain::session::Session;

/// Why a session is considered large.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversizeReason {
    /// Catalog listings are cached in the transient selection.
    CachedCatalog,
    /// The in-flight product-quantity map is over its cap.
    OversizedQuantityMap,
    /// The cart has more lines than expected.
    OversizedCart,
    /// The visited-scenes stack is over its cap.
    OversizedHistory,
}

/// Result of `check_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReport {
    pub is_oversized: bool,
    pub size_bytes: usize,
    pub reasons: Vec<OversizeReason>,
}

/// Byte length of the session's JSON form.
pub fn serialized_size(session: &Session) -> usize {
    serde_json::to_vec(session).map_or(0, |bytes| bytes.len())
}

pub(super) fn inspect(session: &Session, limits: &CompactionLimits) -> SizeReport {
    let size_bytes = serialized_size(session);
    let mut reasons = Vec::new();

    if session.selection.has_cached_listings() {
        reasons.push(OversizeReason::CachedCatalog);
    }
    let quantities_over = session.selection.quantities.len() > limits.max_product_quantities;
    if quantities_over {
        reasons.push(OversizeReason::OversizedQuantityMap);
    }
    if session.cart.line_count() > limits.max_cart_items {
        reasons.push(OversizeReason::OversizedCart);
    }
    let history_over = session.scene.history.len() > limits.max_history_depth;
    if history_over {
        reasons.push(OversizeReason::OversizedHistory);
    }

    // Hard caps on transient data count as oversized at any byte size.
    let is_oversized = size_bytes > limits.max_session_bytes || quantities_over || history_over;

    SizeReport {
        is_oversized,
        size_bytes,
        reasons,
    }
}
