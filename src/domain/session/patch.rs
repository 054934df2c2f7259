//! Partial session updates.
//!
//! A patch names only the fields it changes. Optional fields use
//! `Option<Option<T>>` so that "leave as is" and "clear" stay distinct.

use super::aggregate::{SceneState, Session};
use super::checkout::{CheckoutDraft, DeliveryType};
use super::selection::TransientSelection;
use crate::domain::cart::Cart;
use crate::domain::foundation::{BranchId, CityId, Language};

/// Changes to merge into a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub language: Option<Language>,
    pub registered: Option<bool>,
    pub phone: Option<Option<String>>,
    pub name: Option<Option<String>>,
    pub selected_city: Option<Option<CityId>>,
    pub selected_branch: Option<Option<BranchId>>,
    pub delivery_type: Option<Option<DeliveryType>>,
    pub cart: Option<Cart>,
    pub scene: Option<SceneState>,
    pub selection: Option<TransientSelection>,
    pub checkout: Option<CheckoutDraft>,
}

impl SessionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Marks the user registered with the given phone.
    pub fn register(mut self, phone: impl Into<String>) -> Self {
        self.registered = Some(true);
        self.phone = Some(Some(phone.into()));
        self
    }

    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.phone = Some(phone);
        self
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = Some(name);
        self
    }

    pub fn selected_city(mut self, city: Option<CityId>) -> Self {
        self.selected_city = Some(city);
        self
    }

    pub fn selected_branch(mut self, branch: Option<BranchId>) -> Self {
        self.selected_branch = Some(branch);
        self
    }

    pub fn delivery_type(mut self, delivery_type: Option<DeliveryType>) -> Self {
        self.delivery_type = Some(delivery_type);
        self
    }

    pub fn cart(mut self, cart: Cart) -> Self {
        self.cart = Some(cart);
        self
    }

    pub fn scene(mut self, scene: SceneState) -> Self {
        self.scene = Some(scene);
        self
    }

    pub fn selection(mut self, selection: TransientSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn checkout(mut self, checkout: CheckoutDraft) -> Self {
        self.checkout = Some(checkout);
        self
    }

    /// True if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the patch into `session`, leaving unnamed fields untouched.
    pub fn apply_to(self, session: &mut Session) {
        if let Some(language) = self.language {
            session.language = language;
        }
        if let Some(registered) = self.registered {
            session.registered = registered;
        }
        if let Some(phone) = self.phone {
            session.phone = phone;
        }
        if let Some(name) = self.name {
            session.name = name;
        }
        if let Some(city) = self.selected_city {
            session.selected_city = city;
        }
        if let Some(branch) = self.selected_branch {
            session.selected_branch = branch;
        }
        if let Some(delivery_type) = self.delivery_type {
            session.delivery_type = delivery_type;
        }
        if let Some(cart) = self.cart {
            session.cart = cart;
        }
        if let Some(scene) = self.scene {
            session.scene = scene;
        }
        if let Some(selection) = self.selection {
            session.selection = selection;
        }
        if let Some(checkout) = self.checkout {
            session.checkout = checkout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_changes_nothing() {
        let mut session = Session::default();
        let before = session.clone();

        let patch = SessionPatch::new();
        assert!(patch.is_empty());
        patch.apply_to(&mut session);

        assert_eq!(session, before);
    }

    #[test]
    fn patch_only_touches_named_fields() {
        let mut session = Session::default();
        session.selected_city = Some(CityId(1));

        SessionPatch::new()
            .language(Language::Uz)
            .register("+998901234567")
            .apply_to(&mut session);

        assert_eq!(session.language, Language::Uz);
        assert!(session.registered);
        assert_eq!(session.phone.as_deref(), Some("+998901234567"));
        assert_eq!(session.selected_city, Some(CityId(1)));
    }

    #[test]
    fn patch_can_clear_optional_fields() {
        let mut session = Session::default();
        session.selected_branch = Some(BranchId(4));

        SessionPatch::new()
            .selected_branch(None)
            .apply_to(&mut session);

        assert!(session.selected_branch.is_none());
    }
}
