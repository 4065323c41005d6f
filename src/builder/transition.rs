//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{Argument, Direction, Event, EventKind, Guard, StateId};
use crate::engine::{ListenerResult, StateMachine, TargetRule, Transition, TransitionContext};
use crate::engine::listener::TriggerListener;
use std::cell::RefCell;

/// Builder for constructing transitions with a fluent API.
///
/// A transition without a source is machine-wide: it is declared on the
/// root and therefore considered from every active state, after every
/// state-level transition on the active path.
///
/// # Example
///
/// ```rust
/// use treestate::builder::{MachineBuilder, TransitionBuilder};
/// use treestate::event;
///
/// event! {
///     pub struct Toggle;
/// }
///
/// let mut builder = MachineBuilder::new();
/// let root = builder.root();
/// let off = builder.initial_state(root, "off");
/// let on = builder.state(root, "on");
///
/// builder
///     .transition(TransitionBuilder::on::<Toggle>().from(off).to(on))
///     .unwrap();
/// builder
///     .transition(TransitionBuilder::on::<Toggle>().from(on).to(off))
///     .unwrap();
///
/// let machine = builder.build().unwrap();
/// machine.start().unwrap();
/// machine.process_event(&Toggle).unwrap();
/// assert!(machine.is_active(on));
/// ```
pub struct TransitionBuilder {
    name: Option<String>,
    source: Option<StateId>,
    event: Option<EventKind>,
    target: TargetRule,
    guard: Option<Guard>,
    triggered: Vec<TriggerListener>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            name: None,
            source: None,
            event: None,
            target: TargetRule::None,
            guard: None,
            triggered: Vec::new(),
        }
    }

    /// Start a transition bound to event kind `E`.
    pub fn on<E: ?Sized + 'static>() -> Self {
        Self::new().event::<E>()
    }

    /// Bind to event kind `E` (required). `E` may be a concrete event, a
    /// category marker, or `dyn Event` to match everything.
    pub fn event<E: ?Sized + 'static>(mut self) -> Self {
        self.event = Some(EventKind::of::<E>());
        self
    }

    /// Bind to every event.
    pub fn any_event(mut self) -> Self {
        self.event = Some(EventKind::any());
        self
    }

    /// Diagnostic name used in logs and history.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the owning state. Omit for a machine-wide transition.
    pub fn from(mut self, state: StateId) -> Self {
        self.source = Some(state);
        self
    }

    /// Fixed target state.
    pub fn to(mut self, state: StateId) -> Self {
        self.target = TargetRule::Fixed(state);
        self
    }

    /// Target computed each time the transition is considered.
    pub fn to_computed<F>(mut self, compute: F) -> Self
    where
        F: Fn(&dyn Event, &StateMachine) -> Option<StateId> + 'static,
    {
        self.target = TargetRule::Computed(Box::new(compute));
        self
    }

    /// No target: fire listeners without changing states (the default).
    pub fn stay(mut self) -> Self {
        self.target = TargetRule::None;
        self
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&dyn Event, &Direction) -> bool + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    pub fn on_triggered<F>(self, listener: F) -> Self
    where
        F: Fn(&TransitionContext<'_>) + 'static,
    {
        self.try_on_triggered(move |ctx| {
            listener(ctx);
            Ok(())
        })
    }

    pub fn try_on_triggered<F>(mut self, listener: F) -> Self
    where
        F: Fn(&TransitionContext<'_>) -> ListenerResult + 'static,
    {
        self.triggered.push(Box::new(listener));
        self
    }

    /// Build the transition, owned by `root` when no source was set.
    pub(crate) fn build(
        self,
        root: StateId,
    ) -> Result<(Transition, Vec<TriggerListener>), BuildError> {
        let event = self.event.ok_or(BuildError::MissingEvent)?;

        let transition = Transition {
            name: self.name,
            source: self.source.unwrap_or(root),
            event,
            target: self.target,
            guard: self.guard,
            argument: RefCell::new(Argument::new()),
        };
        Ok((transition, self.triggered))
    }
}

impl Default for TransitionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
