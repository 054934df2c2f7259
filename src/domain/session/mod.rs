//! Session domain module.
//!
//! The durable per-(user, chat) state container: profile choices, the
//! embedded cart, the conversation position and transient browsing state.

mod aggregate;
mod checkout;
mod patch;
mod pending;
mod selection;
mod validation;

pub use aggregate::{SceneState, Session};
pub use checkout::{
    normalize_phone, CheckoutDraft, DeliveryAddress, DeliveryType, GeoPoint, OrderTime,
    PaymentMethod,
};
pub use patch::SessionPatch;
pub use pending::PendingInput;
pub use selection::{ProductQuantities, QuantityEntry, TransientSelection};
