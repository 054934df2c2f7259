//! Cart module.
//!
//! The cart is a value embedded in every session. It has no durability of
//! its own: it is persisted through the session that owns it.

mod aggregate;

pub use aggregate::{Cart, CartItem, MAX_ITEM_QUANTITY};
