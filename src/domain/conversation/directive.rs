//! Transition results handed back to the transport.

use serde::{Deserialize, Serialize};

use super::effect::SceneEffect;
use super::guards::Guard;
use super::Scene;
use crate::domain::session::PendingInput;

/// Short message shown alongside the rendered scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    InvalidPhone,
    InvalidName,
    InvalidAddress,
    InvalidTime,
    InvalidQuantity,
    InvalidRating,
    UnknownItem,
    BranchClosed,
    AddedToCart,
    CartUpdated,
    CartCleared,
    OrderCancelled,
    FeedbackThanks,
    /// The scene was entered through a guard's recovery scene.
    GuardFailed(Guard),
}

/// What the transport should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderDirective {
    pub scene: Scene,
    /// Root-first path to the scene; empty when the scene hides it.
    pub breadcrumbs: Vec<Scene>,
    /// Input the scene is waiting for.
    pub prompt: Option<PendingInput>,
    pub can_go_back: bool,
    pub notice: Option<Notice>,
}

/// How the machine arrived at the resulting scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Followed a declared edge.
    Forward,
    /// Navigated back.
    Back,
    /// Session reset to defaults.
    Restart,
    /// A guard failed and its recovery scene was entered instead.
    Redirect(Guard),
    /// Returned to the scene a guard redirect interrupted.
    Resume,
    /// Re-entered the current scene.
    Reenter,
    /// Stayed in the current scene after handling the event.
    Stay,
    /// The event does not apply to the current scene.
    Ignored,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: Scene,
    pub to: Scene,
    pub kind: TransitionKind,
    pub directive: RenderDirective,
    pub effects: Vec<SceneEffect>,
}

impl Transition {
    /// True if the scene changed.
    pub fn moved(&self) -> bool {
        self.from != self.to
    }

    /// True if the event was dropped.
    pub fn is_ignored(&self) -> bool {
        self.kind == TransitionKind::Ignored
    }
}
