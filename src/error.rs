//! Runtime error taxonomy.
//!
//! Two families of failure exist: configuration defects in the state tree,
//! which are structural and detected either at build time or the moment the
//! engine reaches them, and misuse of the machine's lifecycle (starting
//! twice, reentrant processing). An unmatched event is not an error.

use crate::core::StateId;
use thiserror::Error;

/// Error type listeners may return.
///
/// Whatever a listener returns is handed back to the caller of
/// [`StateMachine::start`](crate::StateMachine::start) or
/// [`StateMachine::process_event`](crate::StateMachine::process_event)
/// inside [`MachineError::Listener`].
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Structural defects in a state tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("State machine has no states. Add at least one child to the root")]
    NoStates,

    #[error("Composite state '{state}' has no initial child")]
    MissingInitialChild { state: String },

    #[error("Initial child '{child}' is not a child of '{state}'")]
    ForeignInitialChild { state: String, child: String },

    #[error("Final state '{state}' cannot have children")]
    FinalStateHasChildren { state: String },

    #[error("Final state '{state}' cannot own transitions")]
    TransitionFromFinalState { state: String },

    #[error("Transition target {target} is not a state of this machine")]
    UnknownTarget { target: StateId },
}

/// Errors surfaced by [`StateMachine`](crate::StateMachine) operations.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("State machine is already started")]
    AlreadyStarted,

    #[error("State machine is not started. Call .start() first")]
    NotStarted,

    #[error("Reentrant call: the machine is already processing")]
    Reentrant,

    #[error("Listener failed: {source}")]
    Listener {
        #[source]
        source: ListenerError,
    },
}

impl MachineError {
    /// The error a listener returned, if this is a listener failure.
    pub fn listener_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Listener { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_converts_into_machine_error() {
        let err: MachineError = ConfigurationError::NoStates.into();
        assert!(matches!(
            err,
            MachineError::Configuration(ConfigurationError::NoStates)
        ));
    }

    #[test]
    fn listener_error_is_preserved() {
        let source: ListenerError = "disk on fire".into();
        let err = MachineError::Listener { source };

        assert_eq!(err.to_string(), "Listener failed: disk on fire");
        let inner = err.listener_error().map(|e| e.to_string());
        assert_eq!(inner.as_deref(), Some("disk on fire"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_initial_child_names_the_state() {
        let err = ConfigurationError::MissingInitialChild {
            state: "connected".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Composite state 'connected' has no initial child"
        );
    }
}
