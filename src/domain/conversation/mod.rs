//! Conversation domain module.
//!
//! The scene graph of the ordering flow and the machine that moves a
//! session through it.

mod directive;
mod effect;
mod event;
pub mod graph;
mod guards;
mod machine;
mod scene;

pub use directive::{Notice, RenderDirective, Transition, TransitionKind};
pub use effect::{OrderDraft, SceneEffect};
pub use event::{CatalogLookup, CatalogRef, ConversationEvent, MenuItem, SettingsItem};
pub use graph::{BackTarget, SceneNode};
pub use guards::Guard;
pub use machine::{SceneMachine, DEFAULT_HISTORY_DEPTH, MAX_NAME_CHARS};
pub use scene::Scene;
