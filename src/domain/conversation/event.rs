//! Inbound conversation events.
//!
//! The transport turns messages, commands and button presses into these
//! values before they reach the machine. Catalog ids carried by an event are
//! resolved by the caller into a [`CatalogLookup`], so the machine itself
//! never performs I/O.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Branch, Category, City, Product};
use crate::domain::foundation::{BranchId, CategoryId, CityId, Language, ProductId};
use crate::domain::session::{DeliveryType, GeoPoint, OrderTime, PaymentMethod};

/// Main menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuItem {
    Order,
    Settings,
    OrderHistory,
    Feedback,
}

/// Settings entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsItem {
    Language,
    Name,
    Phone,
    City,
    Branch,
    About,
}

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    // Global commands, honoured in every scene.
    Restart,
    Back,
    Refresh,
    Home,

    // Free-form input, routed by the pending-input sub-state.
    Text { text: String },
    Contact { phone: String, first_name: Option<String> },
    Location { point: GeoPoint },

    // Buttons.
    ChooseLanguage { language: Language },
    Continue,
    OpenMenu { item: MenuItem },
    OpenSetting { item: SettingsItem },
    ChooseCity { city_id: CityId },
    ChooseBranch { branch_id: BranchId },
    ChooseDeliveryType { delivery_type: DeliveryType },
    ChooseCategory { category_id: CategoryId },
    ChooseProduct { product_id: ProductId },
    SetProductQuantity { product_id: ProductId, quantity: u32 },
    AddToCart,
    OpenCart,
    ContinueShopping,
    ChangeCartQuantity { product_id: ProductId, quantity: i64 },
    RemoveFromCart { product_id: ProductId },
    ClearCart,
    Checkout,
    ChooseTime { time: OrderTime },
    ChoosePayment { method: PaymentMethod },
    ConfirmPhone,
    ChooseCutlery { cutlery: bool },
    ConfirmOrder,
    CancelOrder,
    Rate { rating: u8 },
}

/// A catalog entity an event refers to by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogRef {
    City(CityId),
    Branch(BranchId),
    Category(CategoryId),
    Product(ProductId),
}

impl ConversationEvent {
    /// True for commands that preempt the current scene's own handling.
    pub fn is_global(&self) -> bool {
        matches!(
            self,
            ConversationEvent::Restart
                | ConversationEvent::Back
                | ConversationEvent::Refresh
                | ConversationEvent::Home
        )
    }

    /// Catalog entity the caller must resolve before dispatching.
    pub fn catalog_ref(&self) -> Option<CatalogRef> {
        match self {
            ConversationEvent::ChooseCity { city_id } => Some(CatalogRef::City(*city_id)),
            ConversationEvent::ChooseBranch { branch_id } => Some(CatalogRef::Branch(*branch_id)),
            ConversationEvent::ChooseCategory { category_id } => {
                Some(CatalogRef::Category(*category_id))
            }
            ConversationEvent::ChooseProduct { product_id } => {
                Some(CatalogRef::Product(*product_id))
            }
            _ => None,
        }
    }
}

/// Catalog entities resolved for one event. Absent means "not found".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogLookup {
    pub city: Option<City>,
    pub branch: Option<Branch>,
    pub category: Option<Category>,
    pub product: Option<Product>,
}

impl CatalogLookup {
    /// A lookup that resolved nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: City) -> Self {
        self.city = Some(city);
        self
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branch = Some(branch);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.product = Some(product);
        self
    }
}
