//! State machine trait for enums with a fixed transition table.
//!
//! Scenes of the conversation implement this against the static scene
//! graph, so every transition the machine applies can be checked against
//! the declared edges.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors declare their outgoing edges and get validated
/// transitions for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for Scene {
///     fn valid_transitions(&self) -> Vec<Self> {
///         scene_graph::node(*self).next.to_vec()
///     }
/// }
///
/// let next = Scene::Cart.transition_to(Scene::TimeSelect)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
