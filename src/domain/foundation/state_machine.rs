//! State machine trait for lifecycle enums.
//!
//! Gives every lifecycle enum the same vocabulary for checking and
//! performing transitions. The connection session lifecycle is the main
//! implementor.

use super::ValidationError;

/// Trait for enums that represent a finite state machine.
///
/// Implementors describe the legal edges; validated transitions and the
/// terminal check come for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for SessionState {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!(
///             (self, target),
///             (AwaitingFrame, Decoding) | (Decoding, Responding) | ...
///         )
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             AwaitingFrame => vec![Decoding, Terminated],
///             ...
///         }
///     }
/// }
///
/// let next = SessionState::AwaitingFrame.transition_to(SessionState::Decoding)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

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
