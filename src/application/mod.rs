//! Application layer - Services and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The session store owns persistence; handlers drive the scene machine and
//! the background sweep through it.

pub mod handlers;
pub mod store;

pub use handlers::{
    EventOutcome, HandleEventCommand, HandleEventError, HandleEventHandler, SweepSessionsConfig,
    SweepSessionsHandler,
};
pub use store::{
    LockTimeoutPolicy, SessionLease, SessionStore, SessionStoreConfig, SessionStoreError,
};
