//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalog` - Catalog entities and the snapshots sessions keep of them
//! - `cart` - Cart aggregate
//! - `session` - Per-(user, chat) session state
//! - `compaction` - Pure size/age policy: size checks, optimization, sweep planning
//! - `conversation` - Scene graph, guards and the scene machine

pub mod cart;
pub mod catalog;
pub mod compaction;
pub mod conversation;
pub mod foundation;
pub mod session;
