//! Session aggregate.
//!
//! One session exists per (user, chat) pair. It carries the user's
//! profile choices, the cart, the conversation position and the transient
//! browsing state.
//!
//! # Invariants
//!
//! - `language` is always one of the supported languages
//! - `registered` implies `phone` is set
//! - `selected_city` / `selected_branch` are positive when set
//! - the embedded cart satisfies the cart invariants

use serde::{Deserialize, Serialize};

use super::checkout::{CheckoutDraft, DeliveryType};
use super::pending::PendingInput;
use super::selection::TransientSelection;
use crate::domain::cart::Cart;
use crate::domain::conversation::Scene;
use crate::domain::foundation::{BranchId, CityId, Language, Timestamp};

/// Position of a session in the scene graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SceneState {
    /// Scene the user is in.
    #[serde(default)]
    pub current: Scene,

    /// Scene the user was in before the last scene change.
    #[serde(default)]
    pub previous: Option<Scene>,

    /// Visited scenes, oldest first. Bounded.
    #[serde(default)]
    pub history: Vec<Scene>,

    /// Input the current scene is waiting for.
    #[serde(default)]
    pub pending: Option<PendingInput>,

    /// Scene to resume once a guard's recovery scene completes.
    #[serde(default)]
    pub resume: Option<Scene>,
}

impl SceneState {
    /// Creates a scene state positioned at `scene` with no history.
    pub fn at(scene: Scene) -> Self {
        Self {
            current: scene,
            ..Self::default()
        }
    }

    /// True if the current scene is waiting for `input`.
    pub fn awaits(&self, input: PendingInput) -> bool {
        self.pending == Some(input)
    }
}

/// Durable per-(user, chat) conversation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub language: Language,

    #[serde(default)]
    pub registered: bool,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub selected_city: Option<CityId>,

    #[serde(default)]
    pub selected_branch: Option<BranchId>,

    #[serde(default)]
    pub delivery_type: Option<DeliveryType>,

    #[serde(default)]
    pub cart: Cart,

    #[serde(default)]
    pub scene: SceneState,

    #[serde(default)]
    pub selection: TransientSelection,

    #[serde(default)]
    pub checkout: CheckoutDraft,

    /// Feedback text waiting for its rating.
    #[serde(default)]
    pub feedback_draft: Option<String>,

    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Session {
    /// Creates a fresh session at the language selection scene.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            registered: false,
            phone: None,
            name: None,
            selected_city: None,
            selected_branch: None,
            delivery_type: None,
            cart: Cart::new(),
            scene: SceneState::default(),
            selection: TransientSelection::default(),
            checkout: CheckoutDraft::default(),
            feedback_draft: None,
            created_at: Some(Timestamp::now()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// True if the user completed registration with a phone number.
    pub fn is_authenticated(&self) -> bool {
        self.registered && self.phone.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Liveness signal used by the sweep. `None` means maximally stale.
    pub fn last_activity(&self) -> Option<&Timestamp> {
        self.cart.updated_at()
    }

    /// Current scene.
    pub fn current_scene(&self) -> Scene {
        self.scene.current
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Records activity at `at`.
    pub fn touch_at(&mut self, at: Timestamp) {
        self.cart.touch_at(at);
    }

    /// Records activity now.
    pub fn touch(&mut self) {
        self.touch_at(Timestamp::now());
    }

    /// Replaces everything with defaults. Only the storage key survives.
    pub fn reset(&mut self, language: Language) {
        *self = Session::new(language);
    }

    /// Sets the city and drops everything scoped to the previous city.
    pub fn select_city(&mut self, city: CityId) {
        if self.selected_city != Some(city) {
            self.selected_branch = None;
            self.selection.branch = None;
            self.selection.clear_cached_listings();
        }
        self.selected_city = Some(city);
    }

    /// Forgets the checkout choices after an order is placed or cancelled.
    pub fn clear_checkout(&mut self) {
        self.checkout = CheckoutDraft::default();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::BranchSnapshot;

    #[test]
    fn new_session_has_defaults() {
        let session = Session::new(Language::En);

        assert_eq!(session.language, Language::En);
        assert!(!session.registered);
        assert!(session.phone.is_none());
        assert!(session.cart.is_empty());
        assert_eq!(session.current_scene(), Scene::LanguageSelect);
        assert!(session.created_at.is_some());
    }

    #[test]
    fn new_session_has_no_liveness_signal() {
        assert!(Session::default().last_activity().is_none());
    }

    #[test]
    fn authenticated_requires_phone() {
        let mut session = Session::default();
        session.registered = true;
        assert!(!session.is_authenticated());

        session.phone = Some("+998901234567".to_string());
        assert!(session.is_authenticated());
    }

    #[test]
    fn reset_drops_everything() {
        let mut session = Session::default();
        session.registered = true;
        session.phone = Some("+998901234567".to_string());
        session.selected_city = Some(CityId(1));
        session.scene = SceneState::at(Scene::Cart);

        session.reset(Language::Ru);

        assert_eq!(session.language, Language::Ru);
        assert!(!session.registered);
        assert!(session.selected_city.is_none());
        assert_eq!(session.current_scene(), Scene::LanguageSelect);
    }

    #[test]
    fn changing_city_drops_branch() {
        let mut session = Session::default();
        session.selected_city = Some(CityId(1));
        session.selected_branch = Some(BranchId(10));
        session.selection.branch = Some(BranchSnapshot {
            id: BranchId(10),
            name: "Center".to_string(),
            address: None,
        });

        session.select_city(CityId(2));

        assert_eq!(session.selected_city, Some(CityId(2)));
        assert!(session.selected_branch.is_none());
        assert!(session.selection.branch.is_none());
    }

    #[test]
    fn reselecting_same_city_keeps_branch() {
        let mut session = Session::default();
        session.selected_city = Some(CityId(1));
        session.selected_branch = Some(BranchId(10));

        session.select_city(CityId(1));

        assert_eq!(session.selected_branch, Some(BranchId(10)));
    }

    #[test]
    fn missing_language_fails_deserialization() {
        let result: Result<Session, _> = serde_json::from_value(serde_json::json!({
            "registered": false
        }));
        assert!(result.is_err());
    }

    #[test]
    fn minimal_record_deserializes_with_defaults() {
        let session: Session =
            serde_json::from_value(serde_json::json!({ "language": "uz" })).unwrap();
        assert_eq!(session.language, Language::Uz);
        assert_eq!(session.current_scene(), Scene::LanguageSelect);
        assert!(session.created_at.is_none());
    }
}
