//! Conversation scenes.
//!
//! A scene is one screen of the ordering flow. The static scene graph in
//! [`super::graph`] describes how scenes relate; this module only names them.

use serde::{Deserialize, Serialize};

use super::graph;
use crate::domain::foundation::StateMachine;

/// A named state of the conversation.
///
/// Discriminants index the static scene graph table, so variants must stay
/// in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    #[default]
    LanguageSelect,
    Registration,
    Welcome,
    MainMenu,

    Settings,
    ChangeLanguage,
    ChangeName,
    ChangePhone,
    ChangeCity,
    ChangeBranch,
    About,

    /// Group node: entering it enters `ChooseDeliveryType`.
    OrderFlow,
    ChooseDeliveryType,
    Pickup,
    Delivery,
    Categories,
    Products,
    Cart,

    /// Group node: entering it enters `TimeSelect`.
    Checkout,
    TimeSelect,
    PaymentSelect,
    PhoneConfirm,
    CutleryChoice,
    OrderConfirm,
    OrderPlaced,

    OrderHistory,
    Feedback,
    Review,
}

impl Scene {
    /// Every scene, in table order.
    pub const ALL: [Scene; 28] = [
        Scene::LanguageSelect,
        Scene::Registration,
        Scene::Welcome,
        Scene::MainMenu,
        Scene::Settings,
        Scene::ChangeLanguage,
        Scene::ChangeName,
        Scene::ChangePhone,
        Scene::ChangeCity,
        Scene::ChangeBranch,
        Scene::About,
        Scene::OrderFlow,
        Scene::ChooseDeliveryType,
        Scene::Pickup,
        Scene::Delivery,
        Scene::Categories,
        Scene::Products,
        Scene::Cart,
        Scene::Checkout,
        Scene::TimeSelect,
        Scene::PaymentSelect,
        Scene::PhoneConfirm,
        Scene::CutleryChoice,
        Scene::OrderConfirm,
        Scene::OrderPlaced,
        Scene::OrderHistory,
        Scene::Feedback,
        Scene::Review,
    ];

    /// Position in the scene graph table.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// True for grouping nodes that only forward to a child.
    pub fn is_group(&self) -> bool {
        graph::node(*self).entry.is_some()
    }

    /// True for scenes that are part of checkout.
    pub fn is_checkout_step(&self) -> bool {
        matches!(
            self,
            Scene::TimeSelect
                | Scene::PaymentSelect
                | Scene::PhoneConfirm
                | Scene::CutleryChoice
                | Scene::OrderConfirm
        )
    }
}

impl StateMachine for Scene {
    fn valid_transitions(&self) -> Vec<Self> {
        graph::node(*self).next.to_vec()
    }
}
