//! Application handlers.
//!
//! - `HandleEventHandler` - one conversation event, start to persisted finish
//! - `SweepSessionsHandler` - periodic session cleanup loop

mod handle_event;
mod sweep_sessions;

pub use handle_event::{EventOutcome, HandleEventCommand, HandleEventError, HandleEventHandler};
pub use sweep_sessions::{SweepSessionsConfig, SweepSessionsHandler};
