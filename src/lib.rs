//! Orderflow - Session store and conversation state machine for chat ordering
//!
//! This crate keeps one durable session per (user, chat) pair and drives it
//! through a guarded scene graph: language and registration, browsing, cart,
//! checkout. Sessions survive restarts, are serialized per key under
//! concurrent events, and are compacted and expired so storage stays bounded.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
