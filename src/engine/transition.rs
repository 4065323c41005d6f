//! Transition records and target rules.

use super::machine::StateMachine;
use crate::core::{Argument, Direction, Event, EventKind, Guard, StateId};
use std::cell::RefCell;
use std::fmt;

/// Late-bound target computation.
pub type TargetFn = Box<dyn Fn(&dyn Event, &StateMachine) -> Option<StateId>>;

/// How a transition finds its destination.
pub enum TargetRule {
    /// Always the same state.
    Fixed(StateId),

    /// Computed when the transition is considered. `None` means stay.
    Computed(TargetFn),

    /// Internal transition: fire listeners, change nothing.
    None,
}

impl fmt::Debug for TargetRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(state) => f.debug_tuple("Fixed").field(state).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
            Self::None => f.write_str("None"),
        }
    }
}

/// An edge owned by one state (the root for machine-wide transitions),
/// bound to one event kind.
#[derive(Debug)]
pub struct Transition {
    pub(crate) name: Option<String>,
    pub(crate) source: StateId,
    pub(crate) event: EventKind,
    pub(crate) target: TargetRule,
    pub(crate) guard: Option<Guard>,
    pub(crate) argument: RefCell<Argument>,
}

impl Transition {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// State the transition is declared on.
    pub fn source(&self) -> StateId {
        self.source
    }

    pub fn event_kind(&self) -> EventKind {
        self.event
    }

    pub fn target_rule(&self) -> &TargetRule {
        &self.target
    }

    /// Whether the event's kind is the one this transition is bound to.
    pub fn matches(&self, event: &dyn Event) -> bool {
        self.event.matches(event)
    }

    /// Evaluate the target rule.
    pub(crate) fn resolve_target(
        &self,
        event: &dyn Event,
        machine: &StateMachine,
    ) -> Option<StateId> {
        match &self.target {
            TargetRule::Fixed(state) => Some(*state),
            TargetRule::Computed(compute) => compute(event, machine),
            TargetRule::None => None,
        }
    }

    /// Whether the guard, if any, accepts the proposed direction.
    pub fn admits(&self, event: &dyn Event, direction: &Direction) -> bool {
        self.guard
            .as_ref()
            .is_none_or(|guard| guard.check(event, direction))
    }

    pub(crate) fn label(&self, id: impl fmt::Display) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}#{}", self.event.name(), id),
        }
    }
}
