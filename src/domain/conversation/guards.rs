//! Transition guards.
//!
//! A guard is a predicate over the session that must hold before a scene
//! can be entered. A failing guard is not an error: the machine redirects
//! to the guard's recovery scene and remembers where the user was headed.

use serde::{Deserialize, Serialize};

use super::Scene;
use crate::domain::session::{DeliveryType, Session};

/// Preconditions a scene can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Registration finished with a phone number.
    Authenticated,
    /// A city has been chosen.
    CitySelected,
    /// Pickup or delivery has been chosen.
    DeliveryTypeChosen,
    /// Pickup orders need a branch.
    PickupBranchSelected,
    /// Delivery orders need an address.
    DeliveryAddressProvided,
    /// Products are browsed within a category.
    CategorySelected,
    /// Checkout needs something to buy.
    CartNonEmpty,
    /// Time, payment and cutlery have been chosen.
    CheckoutComplete,
}

impl Guard {
    /// Evaluates the guard against a session.
    pub fn holds(&self, session: &Session) -> bool {
        match self {
            Guard::Authenticated => session.is_authenticated(),
            Guard::CitySelected => session.selected_city.is_some(),
            Guard::DeliveryTypeChosen => session.delivery_type.is_some(),
            Guard::PickupBranchSelected => {
                session.delivery_type != Some(DeliveryType::Pickup)
                    || session.selected_branch.is_some()
            }
            Guard::DeliveryAddressProvided => {
                session.delivery_type != Some(DeliveryType::Delivery)
                    || session.checkout.address.is_some()
            }
            Guard::CategorySelected => session.selection.category.is_some(),
            Guard::CartNonEmpty => !session.cart.is_empty(),
            Guard::CheckoutComplete => session.checkout.is_complete(),
        }
    }

    /// Scene that can satisfy the guard.
    pub fn recovery(&self) -> Scene {
        match self {
            Guard::Authenticated => Scene::Registration,
            Guard::CitySelected => Scene::ChangeCity,
            Guard::DeliveryTypeChosen => Scene::ChooseDeliveryType,
            Guard::PickupBranchSelected => Scene::Pickup,
            Guard::DeliveryAddressProvided => Scene::Delivery,
            Guard::CategorySelected => Scene::Categories,
            Guard::CartNonEmpty => Scene::Categories,
            Guard::CheckoutComplete => Scene::TimeSelect,
        }
    }
}

/// Returns the first guard of `guards` that does not hold.
pub fn first_failing(guards: &[Guard], session: &Session) -> Option<Guard> {
    guards.iter().copied().find(|guard| !guard.holds(session))
}
