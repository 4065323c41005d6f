//! The state machine aggregate.
//!
//! Processing is single-threaded and runs to completion: `process_event`
//! resolves, exits, enters and notifies synchronously before returning.
//! The machine is driven through `&self`; a reentrancy flag rejects calls
//! made from inside listeners, which is the only concurrency control the
//! engine needs. Sharing a machine across threads is the caller's concern
//! (`StateMachine` is neither `Send` nor `Sync`).

use super::listener::{
    notify, EventContext, ListenerRegistry, StateContext, Step, TransitionContext,
};
use super::resolver::{self, Route};
use super::transition::Transition;
use crate::config::MachineOptions;
use crate::core::{
    Event, Outcome, StateId, StateNode, StateTree, TransitionHistory, TransitionId,
    TransitionRecord,
};
use crate::error::{ConfigurationError, MachineError};
use chrono::Utc;
use std::any::Any;
use std::cell::{Cell, RefCell};
use uuid::Uuid;

/// Result of processing one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Processed {
    /// A transition matched and fired, whether or not it changed states.
    Fired(TransitionId),

    /// No transition on the active path matched the event.
    Ignored,
}

impl Processed {
    pub fn is_fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    pub fn transition(&self) -> Option<TransitionId> {
        match self {
            Self::Fired(id) => Some(*id),
            Self::Ignored => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Hook {
    Entry,
    Exit,
    Finished,
}

/// Clears the processing flag when a call ends, including by unwinding.
struct Processing<'a>(&'a Cell<bool>);

impl<'a> Processing<'a> {
    fn begin(flag: &'a Cell<bool>) -> Result<Self, MachineError> {
        if flag.replace(true) {
            return Err(MachineError::Reentrant);
        }
        Ok(Self(flag))
    }
}

impl Drop for Processing<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Hierarchical state machine.
///
/// Built with [`MachineBuilder`](crate::builder::MachineBuilder). Owns the
/// state tree, the transition table and the listener registry, and caches
/// the active path from the root to the active leaf.
pub struct StateMachine {
    id: Uuid,
    options: MachineOptions,
    tree: StateTree,
    transitions: Vec<Transition>,
    listeners: ListenerRegistry,
    active_path: RefCell<Vec<StateId>>,
    started: Cell<bool>,
    processing: Cell<bool>,
    history: RefCell<TransitionHistory>,
}

impl StateMachine {
    pub(crate) fn from_parts(
        options: MachineOptions,
        tree: StateTree,
        transitions: Vec<Transition>,
        listeners: ListenerRegistry,
    ) -> Self {
        let history = match options.history_limit {
            Some(limit) => TransitionHistory::with_limit(limit),
            None => TransitionHistory::new(),
        };

        Self {
            id: Uuid::new_v4(),
            options,
            tree,
            transitions,
            listeners,
            active_path: RefCell::new(Vec::new()),
            started: Cell::new(false),
            processing: Cell::new(false),
            history: RefCell::new(history),
        }
    }

    /// Instance id, included in log output.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    pub fn tree(&self) -> &StateTree {
        &self.tree
    }

    pub fn root(&self) -> StateId {
        self.tree.root()
    }

    pub fn state(&self, id: StateId) -> Option<&StateNode> {
        self.tree.get(id)
    }

    /// First state declared with `name`.
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.tree.find(name)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(id.0)
    }

    pub(crate) fn transition_at(&self, id: TransitionId) -> &Transition {
        &self.transitions[id.0]
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions
            .iter()
            .enumerate()
            .map(|(index, transition)| (TransitionId(index), transition))
    }

    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Whether a `start` or `process_event` call is in progress.
    pub fn is_processing(&self) -> bool {
        self.processing.get()
    }

    pub fn is_active(&self, id: StateId) -> bool {
        self.tree.get(id).is_some_and(StateNode::is_active)
    }

    /// Innermost active state, `None` before `start`.
    pub fn active_leaf(&self) -> Option<StateId> {
        self.active_path.borrow().last().copied()
    }

    /// Active states from the root down to the active leaf.
    pub fn active_path(&self) -> Vec<StateId> {
        self.active_path.borrow().clone()
    }

    /// Whether a final state directly under the root is active.
    pub fn is_finished(&self) -> bool {
        self.active_path
            .borrow()
            .get(1)
            .is_some_and(|state| self.tree.node(*state).is_final())
    }

    /// Snapshot of the audit history.
    pub fn history(&self) -> TransitionHistory {
        self.history.borrow().clone()
    }

    /// Argument most recently stored on a transition, if of type `T`.
    pub fn argument<T: Any + Clone>(&self, transition: TransitionId) -> Option<T> {
        self.transitions
            .get(transition.0)?
            .argument
            .borrow()
            .get::<T>()
            .cloned()
    }

    /// Enter the initial configuration.
    ///
    /// Descends initial children from the root to a leaf, marking each
    /// state active and firing its entry listeners root first.
    ///
    /// # Errors
    ///
    /// - [`MachineError::AlreadyStarted`] on a second call; the active
    ///   configuration is left untouched.
    /// - [`ConfigurationError`] when the root has no children or a
    ///   composite state on the initial path has no initial child.
    /// - [`MachineError::Listener`] when a listener fails.
    pub fn start(&self) -> Result<(), MachineError> {
        if self.started.get() {
            return Err(MachineError::AlreadyStarted);
        }
        let _processing = Processing::begin(&self.processing)?;

        let root = self.tree.root();
        if self.tree.has_no_states() {
            return Err(ConfigurationError::NoStates.into());
        }
        let mut initial = vec![root];
        initial.extend(
            self.tree
                .initial_descent(root, self.options.initial_child_policy)?,
        );

        self.started.set(true);
        tracing::debug!(machine = %self.options.name, id = %self.id, "starting state machine");

        let result = initial
            .iter()
            .try_for_each(|state| self.enter(*state, None))
            .and_then(|()| self.notify_finished(&initial, None))
            .and_then(|()| notify(&self.listeners.machine.started, |listener| listener(self)));

        if let Err(err) = result {
            tracing::warn!(
                machine = %self.options.name,
                id = %self.id,
                error = %err,
                "listener failed while starting"
            );
            if self.options.rollback_on_error {
                self.restore(&[]);
                self.started.set(false);
            }
            return Err(err);
        }

        tracing::debug!(
            machine = %self.options.name,
            id = %self.id,
            state = self.leaf_name(),
            "state machine started"
        );
        Ok(())
    }

    /// Process one event to completion.
    ///
    /// Returns [`Processed::Fired`] with the winning transition, or
    /// [`Processed::Ignored`] when nothing on the active path matched.
    ///
    /// # Errors
    ///
    /// - [`MachineError::NotStarted`] before `start`.
    /// - [`MachineError::Reentrant`] when called from inside a listener.
    /// - [`ConfigurationError`] when the traversal reaches a composite
    ///   state without an initial child, or a computed target is foreign.
    /// - [`MachineError::Listener`] when a listener fails. Active flags
    ///   reflect the steps that ran, unless `rollback_on_error` is set.
    pub fn process_event(&self, event: &dyn Event) -> Result<Processed, MachineError> {
        if !self.started.get() {
            return Err(MachineError::NotStarted);
        }
        let _processing = Processing::begin(&self.processing)?;

        let leaf = self.current_leaf();
        let Some((transition_id, direction)) = self.select(event, leaf)? else {
            tracing::debug!(
                machine = %self.options.name,
                id = %self.id,
                event = event.name(),
                state = self.tree.node(leaf).name(),
                "event ignored"
            );
            self.record(event, None, leaf, Outcome::Ignored);
            let ctx = EventContext {
                machine: self,
                event,
            };
            notify(&self.listeners.machine.ignored, |listener| listener(&ctx))?;
            return Ok(Processed::Ignored);
        };

        let transition = self.transition_at(transition_id);
        transition.argument.borrow_mut().clear();

        let policy = self.options.initial_child_policy;
        let route = direction
            .target()
            .map(|target| resolver::route(&self.tree, leaf, target, policy))
            .transpose()?;

        tracing::debug!(
            machine = %self.options.name,
            id = %self.id,
            event = event.name(),
            transition = %transition.label(transition_id.index()),
            from = self.tree.node(leaf).name(),
            to = direction.target().map(|target| self.tree.node(target).name()),
            "transition triggered"
        );

        let step = Step {
            event,
            transition: transition_id,
            direction,
        };
        let ctx = TransitionContext {
            machine: self,
            step,
        };
        notify(self.listeners.triggered(transition_id), |listener| listener(&ctx))?;
        notify(&self.listeners.machine.transition, |listener| listener(&ctx))?;

        let Some(route) = route else {
            self.record(event, Some(transition_id), leaf, Outcome::Stayed);
            return Ok(Processed::Fired(transition_id));
        };

        let snapshot = self.options.rollback_on_error.then(|| self.active_path());
        if let Err(err) = self.traverse(&route, step) {
            tracing::warn!(
                machine = %self.options.name,
                id = %self.id,
                error = %err,
                rollback = snapshot.is_some(),
                "traversal aborted"
            );
            if let Some(snapshot) = snapshot {
                self.restore(&snapshot);
            }
            return Err(err);
        }

        self.record(event, Some(transition_id), leaf, Outcome::Transitioned);
        let ctx = StateContext {
            machine: self,
            state: self.current_leaf(),
            step: Some(step),
        };
        notify(&self.listeners.machine.state_changed, |listener| listener(&ctx))?;
        Ok(Processed::Fired(transition_id))
    }

    fn traverse(&self, route: &Route, step: Step<'_>) -> Result<(), MachineError> {
        for state in &route.exits {
            self.exit(*state, step)?;
        }
        for state in &route.entries {
            self.enter(*state, Some(step))?;
        }
        self.notify_finished(&route.entries, Some(step))
    }

    fn enter(&self, state: StateId, step: Option<Step<'_>>) -> Result<(), MachineError> {
        self.tree.node(state).active.set(true);
        self.active_path.borrow_mut().push(state);
        tracing::trace!(
            machine = %self.options.name,
            state = self.tree.node(state).name(),
            "entered"
        );

        let ctx = StateContext {
            machine: self,
            state,
            step,
        };
        self.fire(Hook::Entry, &ctx)
    }

    fn exit(&self, state: StateId, step: Step<'_>) -> Result<(), MachineError> {
        let ctx = StateContext {
            machine: self,
            state,
            step: Some(step),
        };
        self.fire(Hook::Exit, &ctx)?;

        self.tree.node(state).active.set(false);
        self.active_path.borrow_mut().pop();
        tracing::trace!(
            machine = %self.options.name,
            state = self.tree.node(state).name(),
            "exited"
        );
        Ok(())
    }

    /// A final state's own listeners, then its parent's.
    fn notify_finished(
        &self,
        entered: &[StateId],
        step: Option<Step<'_>>,
    ) -> Result<(), MachineError> {
        for &state in entered {
            let node = self.tree.node(state);
            if !node.is_final() {
                continue;
            }
            tracing::debug!(
                machine = %self.options.name,
                state = node.name(),
                "final state entered"
            );

            let finished = std::iter::once(state).chain(node.parent());
            for state in finished {
                let ctx = StateContext {
                    machine: self,
                    state,
                    step,
                };
                self.fire(Hook::Finished, &ctx)?;
            }
        }
        Ok(())
    }

    fn fire(&self, hook: Hook, ctx: &StateContext<'_>) -> Result<(), MachineError> {
        let Some(listeners) = self.listeners.state(ctx.state) else {
            return Ok(());
        };
        let listeners = match hook {
            Hook::Entry => &listeners.entry,
            Hook::Exit => &listeners.exit,
            Hook::Finished => &listeners.finished,
        };
        notify(listeners, |listener| listener(ctx))
    }

    fn restore(&self, snapshot: &[StateId]) {
        let mut path = self.active_path.borrow_mut();
        for state in path.iter() {
            self.tree.node(*state).active.set(false);
        }
        for state in snapshot {
            self.tree.node(*state).active.set(true);
        }
        *path = snapshot.to_vec();
    }

    fn current_leaf(&self) -> StateId {
        self.active_leaf().unwrap_or_else(|| self.tree.root())
    }

    fn leaf_name(&self) -> &str {
        self.tree.node(self.current_leaf()).name()
    }

    fn record(
        &self,
        event: &dyn Event,
        transition: Option<TransitionId>,
        from: StateId,
        outcome: Outcome,
    ) {
        if !self.options.record_history {
            return;
        }
        let record = TransitionRecord {
            event: event.name().to_string(),
            transition: transition.map(|id| self.transition_at(id).label(id.index())),
            from: self.tree.node(from).name().to_string(),
            to: self.leaf_name().to_string(),
            outcome,
            timestamp: Utc::now(),
        };
        self.history.borrow_mut().append(record);
    }
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("name", &self.options.name)
            .field("states", &self.tree.len())
            .field("transitions", &self.transitions.len())
            .field("active_path", &self.active_path.borrow())
            .field("started", &self.started.get())
            .finish()
    }
}
