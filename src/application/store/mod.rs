//! Session store service.
//!
//! - `SessionStore` - cache, per-key locks, validation, compaction and
//!   whole-collection persistence
//! - `SessionLease` - a held key lock spanning one read-modify-write
//! - `LockTimeoutPolicy` - proceed or fail when a key lock times out

mod cache;
mod error;
mod locks;
mod session_store;

pub use error::SessionStoreError;
pub use locks::LockTimeoutPolicy;
pub use session_store::{SessionLease, SessionStore, SessionStoreConfig};
