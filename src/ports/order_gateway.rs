//! Order Gateway Port - Submits orders and feedback.

use async_trait::async_trait;

use crate::domain::conversation::OrderDraft;
use crate::domain::foundation::SessionKey;

/// Identifier assigned by the order system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: String,
}

/// Errors from the order system
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Order system unavailable: {0}")]
    Unavailable(String),

    #[error("Order rejected: {0}")]
    Rejected(String),
}

/// Port for the downstream order system
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order on behalf of a session.
    ///
    /// # Errors
    /// Returns `GatewayError` if the order was not accepted
    async fn place_order(
        &self,
        key: SessionKey,
        order: &OrderDraft,
    ) -> Result<OrderReceipt, GatewayError>;

    /// Submit customer feedback.
    async fn send_feedback(
        &self,
        key: SessionKey,
        text: &str,
        rating: u8,
    ) -> Result<(), GatewayError>;
}
