//! Listener registry and the contexts listeners receive.
//!
//! Listeners are registered while the machine is being built and are
//! immutable afterwards. Every context carries a shared reference to the
//! machine, so listeners can inspect the active configuration; calling
//! back into `start` or `process_event` from a listener is reported as an
//! error rather than corrupting the traversal.

use super::machine::StateMachine;
use crate::core::{Direction, Event, StateId, StateNode, TransitionId};
use crate::error::{ListenerError, MachineError};
use std::any::Any;

/// Result every listener produces.
pub type ListenerResult = Result<(), ListenerError>;

pub(crate) type StateListener = Box<dyn Fn(&StateContext<'_>) -> ListenerResult>;
pub(crate) type TriggerListener = Box<dyn Fn(&TransitionContext<'_>) -> ListenerResult>;
pub(crate) type EventListener = Box<dyn Fn(&EventContext<'_>) -> ListenerResult>;
pub(crate) type MachineListener = Box<dyn Fn(&StateMachine) -> ListenerResult>;

/// The event and transition driving the current traversal.
#[derive(Clone, Copy, Debug)]
pub struct Step<'a> {
    pub event: &'a dyn Event,
    pub transition: TransitionId,
    pub direction: Direction,
}

/// Passed to entry, exit, finished and state-changed listeners.
pub struct StateContext<'a> {
    pub(crate) machine: &'a StateMachine,
    pub(crate) state: StateId,
    pub(crate) step: Option<Step<'a>>,
}

impl<'a> StateContext<'a> {
    pub fn machine(&self) -> &'a StateMachine {
        self.machine
    }

    /// The state this notification is about.
    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn node(&self) -> &'a StateNode {
        self.machine.tree().node(self.state)
    }

    pub fn name(&self) -> &'a str {
        self.node().name()
    }

    /// `None` while `start` enters the initial configuration.
    pub fn step(&self) -> Option<Step<'a>> {
        self.step
    }

    pub fn event(&self) -> Option<&'a dyn Event> {
        self.step.map(|step| step.event)
    }

    pub fn transition(&self) -> Option<TransitionId> {
        self.step.map(|step| step.transition)
    }

    pub fn direction(&self) -> Option<Direction> {
        self.step.map(|step| step.direction)
    }

    /// Argument the firing transition carries, if any and of type `T`.
    pub fn argument<T: Any + Clone>(&self) -> Option<T> {
        self.transition()
            .and_then(|transition| self.machine.argument::<T>(transition))
    }
}

/// Passed to trigger and machine-wide transition listeners.
pub struct TransitionContext<'a> {
    pub(crate) machine: &'a StateMachine,
    pub(crate) step: Step<'a>,
}

impl<'a> TransitionContext<'a> {
    pub fn machine(&self) -> &'a StateMachine {
        self.machine
    }

    pub fn event(&self) -> &'a dyn Event {
        self.step.event
    }

    pub fn transition(&self) -> TransitionId {
        self.step.transition
    }

    pub fn direction(&self) -> Direction {
        self.step.direction
    }

    /// Store a value for the destination's entry listeners to read.
    pub fn set_argument<T: Any>(&self, value: T) {
        self.machine
            .transition_at(self.step.transition)
            .argument
            .borrow_mut()
            .set(value);
    }

    pub fn argument<T: Any + Clone>(&self) -> Option<T> {
        self.machine.argument::<T>(self.step.transition)
    }
}

/// Passed to ignored-event listeners.
pub struct EventContext<'a> {
    pub(crate) machine: &'a StateMachine,
    pub(crate) event: &'a dyn Event,
}

impl<'a> EventContext<'a> {
    pub fn machine(&self) -> &'a StateMachine {
        self.machine
    }

    pub fn event(&self) -> &'a dyn Event {
        self.event
    }
}

#[derive(Default)]
pub(crate) struct StateListeners {
    pub(crate) entry: Vec<StateListener>,
    pub(crate) exit: Vec<StateListener>,
    pub(crate) finished: Vec<StateListener>,
}

#[derive(Default)]
pub(crate) struct MachineListeners {
    pub(crate) started: Vec<MachineListener>,
    pub(crate) transition: Vec<TriggerListener>,
    pub(crate) state_changed: Vec<StateListener>,
    pub(crate) ignored: Vec<EventListener>,
}

/// All listeners of one machine, indexed by state and transition handle.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    pub(crate) states: Vec<StateListeners>,
    pub(crate) transitions: Vec<Vec<TriggerListener>>,
    pub(crate) machine: MachineListeners,
}

impl ListenerRegistry {
    pub(crate) fn state_mut(&mut self, state: StateId) -> &mut StateListeners {
        if self.states.len() <= state.0 {
            self.states.resize_with(state.0 + 1, StateListeners::default);
        }
        &mut self.states[state.0]
    }

    pub(crate) fn transition_mut(&mut self, transition: TransitionId) -> &mut Vec<TriggerListener> {
        if self.transitions.len() <= transition.0 {
            self.transitions.resize_with(transition.0 + 1, Vec::new);
        }
        &mut self.transitions[transition.0]
    }

    pub(crate) fn state(&self, state: StateId) -> Option<&StateListeners> {
        self.states.get(state.0)
    }

    pub(crate) fn triggered(&self, transition: TransitionId) -> &[TriggerListener] {
        self.transitions
            .get(transition.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Run listeners in registration order, stopping at the first failure.
pub(crate) fn notify<L>(
    listeners: &[L],
    call: impl Fn(&L) -> ListenerResult,
) -> Result<(), MachineError> {
    listeners
        .iter()
        .try_for_each(call)
        .map_err(|source| MachineError::Listener { source })
}
