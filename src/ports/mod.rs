//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStorage` - Durable whole-collection session storage
//! - `CatalogClient` - Read-only catalog lookups
//! - `OrderGateway` - Order and feedback submission

mod catalog_client;
mod order_gateway;
mod session_storage;

pub use catalog_client::{CatalogClient, CatalogError};
pub use order_gateway::{GatewayError, OrderGateway, OrderReceipt};
pub use session_storage::{SessionRecord, SessionStorage, SessionStorageError};
