//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::config::{InitialChildPolicy, MachineOptions};
use crate::core::{StateId, StateTree, TransitionId};
use crate::engine::listener::ListenerRegistry;
use crate::engine::{
    EventContext, ListenerResult, StateContext, StateMachine, TargetRule, Transition,
    TransitionContext,
};
use crate::error::ConfigurationError;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Arena-backed builder for a state tree, its transitions and listeners.
///
/// States are created under an explicit parent handle and every call
/// returns the new state's handle.
///
/// # Panics
///
/// Methods taking a [`StateId`] or [`TransitionId`] panic when handed a
/// handle that was not produced by this builder.
pub struct MachineBuilder {
    options: MachineOptions,
    tree: StateTree,
    transitions: Vec<Transition>,
    listeners: ListenerRegistry,
}

impl MachineBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::with_options(MachineOptions::default())
    }

    pub fn with_options(options: MachineOptions) -> Self {
        let mut listeners = ListenerRegistry::default();
        let tree = StateTree::new(options.name.clone());
        listeners.state_mut(tree.root());

        Self {
            options,
            tree,
            transitions: Vec::new(),
            listeners,
        }
    }

    /// The root state. Machine-wide transitions and listeners hang off it.
    pub fn root(&self) -> StateId {
        self.tree.root()
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    /// Add a state under `parent`.
    pub fn state(&mut self, parent: StateId, name: impl Into<String>) -> StateId {
        self.add(parent, name.into(), false)
    }

    /// Add a final state under `parent`.
    pub fn final_state(&mut self, parent: StateId, name: impl Into<String>) -> StateId {
        self.add(parent, name.into(), true)
    }

    /// Add a state under `parent` and make it the parent's initial child.
    pub fn initial_state(&mut self, parent: StateId, name: impl Into<String>) -> StateId {
        let state = self.state(parent, name);
        self.set_initial(parent, state);
        state
    }

    /// Designate `child` as the state entered by default when `parent` is.
    pub fn set_initial(&mut self, parent: StateId, child: StateId) -> &mut Self {
        self.tree.node_mut(parent).initial = Some(child);
        self
    }

    fn add(&mut self, parent: StateId, name: String, is_final: bool) -> StateId {
        let state = self.tree.add(parent, name, is_final);
        self.listeners.state_mut(state);
        state
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(&mut self, builder: TransitionBuilder) -> Result<TransitionId, BuildError> {
        let (transition, triggered) = builder.build(self.tree.root())?;
        if !self.tree.contains(transition.source) {
            return Err(BuildError::UnknownState(transition.source));
        }

        let id = TransitionId(self.transitions.len());
        self.tree.node_mut(transition.source).transitions.push(id);
        self.transitions.push(transition);
        self.listeners.transition_mut(id).extend(triggered);
        Ok(id)
    }

    pub fn on_entry<F>(&mut self, state: StateId, listener: F) -> &mut Self
    where
        F: Fn(&StateContext<'_>) + 'static,
    {
        self.try_on_entry(state, infallible(listener))
    }

    pub fn try_on_entry<F>(&mut self, state: StateId, listener: F) -> &mut Self
    where
        F: Fn(&StateContext<'_>) -> ListenerResult + 'static,
    {
        self.listeners.state_mut(state).entry.push(Box::new(listener));
        self
    }

    pub fn on_exit<F>(&mut self, state: StateId, listener: F) -> &mut Self
    where
        F: Fn(&StateContext<'_>) + 'static,
    {
        self.try_on_exit(state, infallible(listener))
    }

    pub fn try_on_exit<F>(&mut self, state: StateId, listener: F) -> &mut Self
    where
        F: Fn(&StateContext<'_>) -> ListenerResult + 'static,
    {
        self.listeners.state_mut(state).exit.push(Box::new(listener));
        self
    }

    /// Fires when `state` is a final state and is entered, or when one of
    /// its final children is entered.
    pub fn on_finished<F>(&mut self, state: StateId, listener: F) -> &mut Self
    where
        F: Fn(&StateContext<'_>) + 'static,
    {
        self.try_on_finished(state, infallible(listener))
    }

    pub fn try_on_finished<F>(&mut self, state: StateId, listener: F) -> &mut Self
    where
        F: Fn(&StateContext<'_>) -> ListenerResult + 'static,
    {
        self.listeners
            .state_mut(state)
            .finished
            .push(Box::new(listener));
        self
    }

    pub fn on_triggered<F>(&mut self, transition: TransitionId, listener: F) -> &mut Self
    where
        F: Fn(&TransitionContext<'_>) + 'static,
    {
        self.try_on_triggered(transition, move |ctx| {
            listener(ctx);
            Ok(())
        })
    }

    pub fn try_on_triggered<F>(&mut self, transition: TransitionId, listener: F) -> &mut Self
    where
        F: Fn(&TransitionContext<'_>) -> ListenerResult + 'static,
    {
        self.listeners
            .transition_mut(transition)
            .push(Box::new(listener));
        self
    }

    /// Fires once `start` has entered the initial configuration.
    pub fn on_started<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&StateMachine) + 'static,
    {
        self.try_on_started(move |machine| {
            listener(machine);
            Ok(())
        })
    }

    pub fn try_on_started<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&StateMachine) -> ListenerResult + 'static,
    {
        self.listeners.machine.started.push(Box::new(listener));
        self
    }

    /// Fires for every fired transition, after its own trigger listeners.
    pub fn on_transition<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&TransitionContext<'_>) + 'static,
    {
        self.try_on_transition(move |ctx| {
            listener(ctx);
            Ok(())
        })
    }

    pub fn try_on_transition<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&TransitionContext<'_>) -> ListenerResult + 'static,
    {
        self.listeners.machine.transition.push(Box::new(listener));
        self
    }

    /// Fires with the new active leaf after every completed traversal.
    pub fn on_state_changed<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&StateContext<'_>) + 'static,
    {
        self.try_on_state_changed(infallible(listener))
    }

    pub fn try_on_state_changed<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&StateContext<'_>) -> ListenerResult + 'static,
    {
        self.listeners.machine.state_changed.push(Box::new(listener));
        self
    }

    pub fn on_ignored_event<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&EventContext<'_>) + 'static,
    {
        self.try_on_ignored_event(move |ctx| {
            listener(ctx);
            Ok(())
        })
    }

    pub fn try_on_ignored_event<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&EventContext<'_>) -> ListenerResult + 'static,
    {
        self.listeners.machine.ignored.push(Box::new(listener));
        self
    }

    /// Check the tree, accumulating every defect instead of stopping at
    /// the first.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigurationError>> {
        let mut checks: Vec<Check> = Vec::new();

        checks.push(check(!self.tree.has_no_states(), || {
            ConfigurationError::NoStates
        }));
        for id in self.tree.ids() {
            checks.extend(self.state_checks(id));
        }
        for transition in &self.transitions {
            checks.push(self.target_check(transition));
        }

        // Accumulate ALL defects using all_vec
        Validation::all_vec(checks).map(|_| ())
    }

    fn state_checks(&self, id: StateId) -> [Check; 3] {
        let node = self.tree.node(id);
        let state = || node.name().to_string();

        let initial = match node.initial_child() {
            Some(child) if !node.children().contains(&child) => {
                let child = self
                    .tree
                    .get(child)
                    .map_or_else(|| child.to_string(), |c| c.name().to_string());
                Validation::fail(ConfigurationError::ForeignInitialChild {
                    state: state(),
                    child,
                })
            }
            None if node.is_composite()
                && self.options.initial_child_policy == InitialChildPolicy::Explicit =>
            {
                Validation::fail(ConfigurationError::MissingInitialChild { state: state() })
            }
            _ => Validation::success(()),
        };

        [
            check(!(node.is_final() && node.is_composite()), || {
                ConfigurationError::FinalStateHasChildren { state: state() }
            }),
            check(!(node.is_final() && !node.transitions().is_empty()), || {
                ConfigurationError::TransitionFromFinalState { state: state() }
            }),
            initial,
        ]
    }

    /// Fixed targets must be states of this machine. Computed targets are
    /// checked when they are resolved.
    fn target_check(&self, transition: &Transition) -> Check {
        match transition.target {
            TargetRule::Fixed(target) => check(self.tree.contains(target), || {
                ConfigurationError::UnknownTarget { target }
            }),
            _ => Validation::success(()),
        }
    }

    /// Build the state machine.
    /// Returns an error listing every structural defect.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        match self.validate() {
            Validation::Success(()) => Ok(self.build_unchecked()),
            Validation::Failure(defects) => {
                Err(BuildError::Invalid(defects.iter().cloned().collect()))
            }
        }
    }

    /// Build without validation. Defects on the paths the machine takes
    /// surface as [`ConfigurationError`]s when they are reached.
    pub fn build_unchecked(self) -> StateMachine {
        StateMachine::from_parts(self.options, self.tree, self.transitions, self.listeners)
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

type Check = Validation<(), NonEmptyVec<ConfigurationError>>;

fn check(passes: bool, defect: impl FnOnce() -> ConfigurationError) -> Check {
    if passes {
        Validation::success(())
    } else {
        Validation::fail(defect())
    }
}

fn infallible<F>(listener: F) -> impl Fn(&StateContext<'_>) -> ListenerResult + 'static
where
    F: Fn(&StateContext<'_>) + 'static,
{
    move |ctx| {
        listener(ctx);
        Ok(())
    }
}
