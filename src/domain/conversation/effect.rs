//! Side effects requested by scene transitions.
//!
//! The machine only describes what should happen; the application layer
//! executes effects against the catalog and order gateway.

use serde::{Deserialize, Serialize};

use crate::domain::cart::CartItem;
use crate::domain::foundation::{BranchId, CategoryId, CityId, Language};
use crate::domain::session::{DeliveryAddress, DeliveryType, OrderTime, PaymentMethod, Session};

/// Work to run after a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SceneEffect {
    /// Cache the branches of a city in the session.
    LoadBranches { city_id: CityId },
    /// Cache the categories available in a city.
    LoadCategories { city_id: CityId },
    /// Cache the products of a category.
    LoadProducts { category_id: CategoryId },
    /// Submit the order.
    PlaceOrder { order: OrderDraft },
    /// Submit feedback with its rating.
    SendFeedback { text: String, rating: u8 },
}

impl SceneEffect {
    /// True for effects that only refresh cached listings.
    pub fn is_listing_load(&self) -> bool {
        matches!(
            self,
            SceneEffect::LoadBranches { .. }
                | SceneEffect::LoadCategories { .. }
                | SceneEffect::LoadProducts { .. }
        )
    }
}

/// An order ready to be submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub language: Language,
    pub phone: String,
    pub name: Option<String>,
    pub city_id: CityId,
    pub branch_id: Option<BranchId>,
    pub delivery_type: DeliveryType,
    pub address: Option<DeliveryAddress>,
    pub order_time: OrderTime,
    pub payment: PaymentMethod,
    pub cutlery: bool,
    pub items: Vec<CartItem>,
    pub total: i64,
}

impl OrderDraft {
    /// Builds the order from a session, or `None` if anything required is
    /// still missing.
    pub fn from_session(session: &Session) -> Option<Self> {
        if session.cart.is_empty() {
            return None;
        }

        let delivery_type = session.delivery_type?;
        let address = match delivery_type {
            DeliveryType::Delivery => Some(session.checkout.address.clone()?),
            DeliveryType::Pickup => None,
        };
        let branch_id = match delivery_type {
            DeliveryType::Pickup => Some(session.selected_branch?),
            DeliveryType::Delivery => session.selected_branch,
        };

        Some(Self {
            language: session.language,
            phone: session.phone.clone()?,
            name: session.name.clone(),
            city_id: session.selected_city?,
            branch_id,
            delivery_type,
            address,
            order_time: session.checkout.order_time?,
            payment: session.checkout.payment?,
            cutlery: session.checkout.cutlery?,
            items: session.cart.items().to_vec(),
            total: session.cart.total(),
        })
    }
}
