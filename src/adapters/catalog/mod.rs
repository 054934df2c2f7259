//! Catalog Adapters
//!
//! - **InMemoryCatalog** - Fixture catalog for development and tests
//! - **RecordingOrderGateway** - Order gateway that records submissions

mod in_memory_catalog;
mod recording_order_gateway;

pub use in_memory_catalog::InMemoryCatalog;
pub use recording_order_gateway::{RecordedFeedback, RecordedOrder, RecordingOrderGateway};
