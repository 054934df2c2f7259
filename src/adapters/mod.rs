//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Session collection storage (JSON file, in-memory)
//! - `catalog` - Fixture catalog and recording order gateway
//! - `transport` - Line-delimited JSON events on stdin/stdout

pub mod catalog;
pub mod storage;
pub mod transport;

pub use catalog::{InMemoryCatalog, RecordingOrderGateway};
pub use storage::{FileSessionStorage, InMemorySessionStorage};
pub use transport::JsonLinesTransport;
