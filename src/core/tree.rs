//! Arena-backed state hierarchy and the pure traversal queries over it.

use super::state::{StateId, StateNode};
use crate::config::InitialChildPolicy;
use crate::error::ConfigurationError;

/// The state hierarchy of one machine.
///
/// The root is always at index zero. Nodes are only ever appended, so a
/// [`StateId`] handed out by the builder stays valid for the lifetime of
/// the machine.
#[derive(Debug)]
pub struct StateTree {
    nodes: Vec<StateNode>,
}

impl StateTree {
    pub(crate) fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![StateNode::new(root_name.into(), None, false)],
        }
    }

    /// Append a child under `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub(crate) fn add(&mut self, parent: StateId, name: String, is_final: bool) -> StateId {
        let id = StateId(self.nodes.len());
        self.nodes.push(StateNode::new(name, Some(parent), is_final));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn node_mut(&mut self, id: StateId) -> &mut StateNode {
        &mut self.nodes[id.0]
    }

    /// Node lookup for handles already known to be valid.
    pub(crate) fn node(&self, id: StateId) -> &StateNode {
        &self.nodes[id.0]
    }

    pub fn root(&self) -> StateId {
        StateId(0)
    }

    pub fn get(&self, id: StateId) -> Option<&StateNode> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: StateId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Number of states including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been declared below the root.
    pub fn has_no_states(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.nodes.len()).map(StateId)
    }

    /// First state with the given name, in declaration order.
    pub fn find(&self, name: &str) -> Option<StateId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(StateId)
    }

    /// `id`, its parent, and so on up to and including the root.
    pub fn ancestors(&self, id: StateId) -> impl Iterator<Item = StateId> + '_ {
        std::iter::successors(Some(id), move |current| self.node(*current).parent)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: StateId) -> usize {
        self.ancestors(id).count() - 1
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    pub fn is_within(&self, id: StateId, ancestor: StateId) -> bool {
        self.ancestors(id).any(|s| s == ancestor)
    }

    /// Path from the root down to `id`, both inclusive.
    pub fn path_to(&self, id: StateId) -> Vec<StateId> {
        let mut path: Vec<StateId> = self.ancestors(id).collect();
        path.reverse();
        path
    }

    /// Deepest state that contains both `a` and `b`.
    pub fn lca(&self, a: StateId, b: StateId) -> StateId {
        let (mut a, mut b) = (a, b);
        let (mut depth_a, mut depth_b) = (self.depth(a), self.depth(b));

        while depth_a > depth_b {
            a = self.up(a);
            depth_a -= 1;
        }
        while depth_b > depth_a {
            b = self.up(b);
            depth_b -= 1;
        }
        while a != b {
            a = self.up(a);
            b = self.up(b);
        }
        a
    }

    fn up(&self, id: StateId) -> StateId {
        self.node(id).parent.unwrap_or(id)
    }

    /// Child entered when `id` is entered without a more specific target.
    ///
    /// Returns `Ok(None)` for leaves.
    pub fn initial_child(
        &self,
        id: StateId,
        policy: InitialChildPolicy,
    ) -> Result<Option<StateId>, ConfigurationError> {
        let node = self.node(id);
        if node.is_leaf() {
            return Ok(None);
        }

        match (node.initial, policy) {
            (Some(child), _) if node.children.contains(&child) => Ok(Some(child)),
            (Some(child), _) => Err(ConfigurationError::ForeignInitialChild {
                state: node.name.clone(),
                child: self
                    .get(child)
                    .map_or_else(|| child.to_string(), |foreign| foreign.name.clone()),
            }),
            (None, InitialChildPolicy::FirstChild) => Ok(node.children.first().copied()),
            (None, InitialChildPolicy::Explicit) => Err(ConfigurationError::MissingInitialChild {
                state: node.name.clone(),
            }),
        }
    }

    /// States entered below `id` by following initial children to a leaf,
    /// outermost first. `id` itself is not included.
    pub fn initial_descent(
        &self,
        id: StateId,
        policy: InitialChildPolicy,
    ) -> Result<Vec<StateId>, ConfigurationError> {
        let mut descent = Vec::new();
        let mut current = id;
        while let Some(child) = self.initial_child(current, policy)? {
            descent.push(child);
            current = child;
        }
        Ok(descent)
    }
}
