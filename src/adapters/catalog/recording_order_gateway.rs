//! Recording Order Gateway Adapter
//!
//! Accepts every order and keeps it in memory. Stands in for the order
//! system in development and tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::conversation::OrderDraft;
use crate::domain::foundation::SessionKey;
use crate::ports::{GatewayError, OrderGateway, OrderReceipt};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedOrder {
    pub key: SessionKey,
    pub order_id: String,
    pub order: OrderDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFeedback {
    pub key: SessionKey,
    pub text: String,
    pub rating: u8,
}

/// Order gateway that records submissions
#[derive(Debug, Clone, Default)]
pub struct RecordingOrderGateway {
    orders: Arc<Mutex<Vec<RecordedOrder>>>,
    feedback: Arc<Mutex<Vec<RecordedFeedback>>>,
    reject_with: Arc<Mutex<Option<String>>>,
}

impl RecordingOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject subsequent orders with `reason`; `None` accepts again
    pub async fn reject_orders(&self, reason: Option<String>) {
        *self.reject_with.lock().await = reason;
    }

    pub async fn orders(&self) -> Vec<RecordedOrder> {
        self.orders.lock().await.clone()
    }

    pub async fn feedback(&self) -> Vec<RecordedFeedback> {
        self.feedback.lock().await.clone()
    }
}

#[async_trait]
impl OrderGateway for RecordingOrderGateway {
    async fn place_order(
        &self,
        key: SessionKey,
        order: &OrderDraft,
    ) -> Result<OrderReceipt, GatewayError> {
        if let Some(reason) = self.reject_with.lock().await.clone() {
            return Err(GatewayError::Rejected(reason));
        }

        let order_id = uuid::Uuid::new_v4().to_string();
        self.orders.lock().await.push(RecordedOrder {
            key,
            order_id: order_id.clone(),
            order: order.clone(),
        });
        tracing::info!(%key, order_id = %order_id, total = order.total, "Order recorded");
        Ok(OrderReceipt { order_id })
    }

    async fn send_feedback(
        &self,
        key: SessionKey,
        text: &str,
        rating: u8,
    ) -> Result<(), GatewayError> {
        self.feedback.lock().await.push(RecordedFeedback {
            key,
            text: text.to_string(),
            rating,
        });
        Ok(())
    }
}
