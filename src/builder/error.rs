//! Build errors for machine and transition builders.

use crate::core::StateId;
use crate::error::ConfigurationError;
use thiserror::Error;

/// Errors that can occur when building state machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition event not specified; call .event::<E>() or TransitionBuilder::on::<E>()")]
    MissingEvent,

    #[error("State {0} does not belong to this builder")]
    UnknownState(StateId),

    #[error("State machine configuration is invalid: {}", join(.0))]
    Invalid(Vec<ConfigurationError>),
}

impl BuildError {
    /// Structural defects found by validation, empty for other errors.
    pub fn defects(&self) -> &[ConfigurationError] {
        match self {
            Self::Invalid(defects) => defects.as_slice(),
            _ => &[],
        }
    }
}

fn join(defects: &[ConfigurationError]) -> String {
    defects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_defect() {
        let err = BuildError::Invalid(vec![
            ConfigurationError::NoStates,
            ConfigurationError::FinalStateHasChildren {
                state: "done".to_string(),
            },
        ]);

        assert_eq!(
            err.to_string(),
            "State machine configuration is invalid: State machine has no states. \
             Add at least one child to the root; Final state 'done' cannot have children"
        );
        assert_eq!(err.defects().len(), 2);
        assert!(BuildError::MissingEvent.defects().is_empty());
    }
}
