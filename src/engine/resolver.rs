//! Transition lookup and exit/entry path computation.
//!
//! Lookup walks from the active leaf towards the root. The first state
//! owning a transition that matches the event and passes its guard wins;
//! within one state, transitions are tried in declaration order.
//!
//! Once a target is known, the exit and entry sequences are bounded by a
//! boundary state that is neither exited nor entered:
//! - the least common ancestor of the leaf and the target, or
//! - the target's parent when the target is already active, so that the
//!   target itself is exited and re-entered, or
//! - the root when the target is the root.

use super::machine::StateMachine;
use crate::config::InitialChildPolicy;
use crate::core::{Direction, Event, StateId, StateTree, TransitionId};
use crate::error::ConfigurationError;

/// Exit and entry sequences for one traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Route {
    pub(crate) boundary: StateId,
    /// Innermost first
    pub(crate) exits: Vec<StateId>,
    /// Outermost first, including the initial descent below the target
    pub(crate) entries: Vec<StateId>,
}

pub(crate) fn route(
    tree: &StateTree,
    leaf: StateId,
    target: StateId,
    policy: InitialChildPolicy,
) -> Result<Route, ConfigurationError> {
    let root = tree.root();
    let boundary = if target == root {
        root
    } else if tree.is_within(leaf, target) {
        tree.node(target).parent().unwrap_or(root)
    } else {
        tree.lca(leaf, target)
    };

    let exits: Vec<StateId> = tree
        .ancestors(leaf)
        .take_while(|state| *state != boundary)
        .collect();

    let mut entries: Vec<StateId> = tree
        .ancestors(target)
        .take_while(|state| *state != boundary)
        .collect();
    entries.reverse();
    entries.extend(tree.initial_descent(target, policy)?);

    Ok(Route {
        boundary,
        exits,
        entries,
    })
}

impl StateMachine {
    /// Find the transition that handles `event`, innermost state first.
    pub(crate) fn select(
        &self,
        event: &dyn Event,
        leaf: StateId,
    ) -> Result<Option<(TransitionId, Direction)>, ConfigurationError> {
        for state in self.tree().ancestors(leaf) {
            for &id in self.tree().node(state).transitions() {
                let transition = self.transition_at(id);
                if !transition.matches(event) {
                    continue;
                }

                let direction = self.direction_of(transition.resolve_target(event, self))?;
                if transition.admits(event, &direction) {
                    return Ok(Some((id, direction)));
                }
            }
        }
        Ok(None)
    }

    fn direction_of(&self, target: Option<StateId>) -> Result<Direction, ConfigurationError> {
        let Some(target) = target else {
            return Ok(Direction::Stay);
        };

        match self.tree().get(target) {
            None => Err(ConfigurationError::UnknownTarget { target }),
            Some(node) if node.is_active() => Ok(Direction::SelfLoop(target)),
            Some(_) => Ok(Direction::Target(target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // root
    // ├── idle
    // └── connected (initial: handshake)
    //     ├── handshake
    //     └── session (initial: active)
    //         ├── active
    //         └── paused
    struct Fixture {
        tree: StateTree,
        idle: StateId,
        connected: StateId,
        handshake: StateId,
        session: StateId,
        active: StateId,
        paused: StateId,
    }

    fn fixture() -> Fixture {
        let mut tree = StateTree::new("root");
        let root = tree.root();
        let idle = tree.add(root, "idle".to_string(), false);
        let connected = tree.add(root, "connected".to_string(), false);
        let handshake = tree.add(connected, "handshake".to_string(), false);
        let session = tree.add(connected, "session".to_string(), false);
        let active = tree.add(session, "active".to_string(), false);
        let paused = tree.add(session, "paused".to_string(), false);
        tree.node_mut(root).initial = Some(idle);
        tree.node_mut(connected).initial = Some(handshake);
        tree.node_mut(session).initial = Some(active);
        Fixture {
            tree,
            idle,
            connected,
            handshake,
            session,
            active,
            paused,
        }
    }

    #[test]
    fn sibling_leaves_exit_and_enter_one_state_each() {
        let f = fixture();
        let route = route(&f.tree, f.active, f.paused, InitialChildPolicy::Explicit).unwrap();

        assert_eq!(route.boundary, f.session);
        assert_eq!(route.exits, vec![f.active]);
        assert_eq!(route.entries, vec![f.paused]);
    }

    #[test]
    fn leaving_a_subtree_exits_innermost_first() {
        let f = fixture();
        let route = route(&f.tree, f.paused, f.idle, InitialChildPolicy::Explicit).unwrap();

        assert_eq!(route.boundary, f.tree.root());
        assert_eq!(route.exits, vec![f.paused, f.session, f.connected]);
        assert_eq!(route.entries, vec![f.idle]);
    }

    #[test]
    fn composite_target_descends_initial_children() {
        let f = fixture();
        let route = route(&f.tree, f.idle, f.connected, InitialChildPolicy::Explicit).unwrap();

        assert_eq!(route.exits, vec![f.idle]);
        assert_eq!(route.entries, vec![f.connected, f.handshake]);
    }

    #[test]
    fn deep_target_enters_outermost_first() {
        let f = fixture();
        let route = route(&f.tree, f.idle, f.paused, InitialChildPolicy::Explicit).unwrap();

        assert_eq!(route.entries, vec![f.connected, f.session, f.paused]);
    }

    #[test]
    fn self_transition_exits_and_reenters_leaf() {
        let f = fixture();
        let route = route(&f.tree, f.idle, f.idle, InitialChildPolicy::Explicit).unwrap();

        assert_eq!(route.boundary, f.tree.root());
        assert_eq!(route.exits, vec![f.idle]);
        assert_eq!(route.entries, vec![f.idle]);
    }

    #[test]
    fn active_ancestor_target_is_reentered() {
        let f = fixture();
        let route = route(&f.tree, f.paused, f.session, InitialChildPolicy::Explicit).unwrap();

        assert_eq!(route.boundary, f.connected);
        assert_eq!(route.exits, vec![f.paused, f.session]);
        assert_eq!(route.entries, vec![f.session, f.active]);
    }

    #[test]
    fn root_target_restarts_below_root() {
        let f = fixture();
        let route = route(&f.tree, f.active, f.tree.root(), InitialChildPolicy::Explicit).unwrap();

        assert_eq!(route.exits, vec![f.active, f.session, f.connected]);
        assert_eq!(route.entries, vec![f.idle]);
    }

    #[test]
    fn missing_initial_child_on_descent_is_reported() {
        let mut f = fixture();
        f.tree.node_mut(f.session).initial = None;

        let result = route(&f.tree, f.idle, f.session, InitialChildPolicy::Explicit);
        assert_eq!(
            result,
            Err(ConfigurationError::MissingInitialChild {
                state: "session".to_string()
            })
        );
    }
}
