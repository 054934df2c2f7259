//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the ordering domain.

mod errors;
mod ids;
mod language;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{BranchId, CategoryId, ChatId, CityId, ProductId, SessionKey, UserId};
pub use language::Language;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
