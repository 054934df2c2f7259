//! Pending-input sub-states.
//!
//! "Awaiting X" is data, not a suspended call: the scene records which kind
//! of free-form input it expects next, and the machine routes text, contact
//! and location messages by it.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::Scene;

/// The input a scene is currently waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingInput {
    /// A phone number, typed or shared as a contact.
    Phone,
    /// A display name.
    Name,
    /// A delivery address, typed or shared as a location.
    DeliveryAddress,
    /// A custom order time (`HH:MM`).
    OrderTime,
    /// Whether cutlery should be packed.
    CutleryChoice,
    /// Free-form feedback text.
    FeedbackText,
    /// A 1–5 rating.
    ReviewRating,
}

impl PendingInput {
    /// Scenes whose flow owns this input.
    pub fn owners(&self) -> &'static [Scene] {
        match self {
            Self::Phone => &[Scene::Registration, Scene::ChangePhone, Scene::PhoneConfirm],
            Self::Name => &[Scene::ChangeName],
            Self::DeliveryAddress => &[Scene::Delivery],
            Self::OrderTime => &[Scene::TimeSelect],
            Self::CutleryChoice => &[Scene::CutleryChoice],
            Self::FeedbackText => &[Scene::Feedback],
            Self::ReviewRating => &[Scene::Review],
        }
    }

    /// True if `scene` is still in the flow that asked for this input.
    pub fn is_owned_by(&self, scene: Scene) -> bool {
        self.owners().contains(&scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_is_owned_by_every_phone_scene() {
        assert!(PendingInput::Phone.is_owned_by(Scene::Registration));
        assert!(PendingInput::Phone.is_owned_by(Scene::PhoneConfirm));
        assert!(!PendingInput::Phone.is_owned_by(Scene::MainMenu));
    }

    #[test]
    fn cutlery_choice_is_owned_only_by_its_scene() {
        assert!(PendingInput::CutleryChoice.is_owned_by(Scene::CutleryChoice));
        assert!(!PendingInput::CutleryChoice.is_owned_by(Scene::OrderConfirm));
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&PendingInput::DeliveryAddress).unwrap();
        assert_eq!(json, "\"delivery_address\"");
    }
}
