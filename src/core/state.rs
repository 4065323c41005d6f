//! State handles and tree nodes.
//!
//! States live in an arena owned by the machine. They are addressed by
//! [`StateId`] handles; a node refers to its parent by handle only, so
//! upward navigation never follows an owning pointer.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;

/// Stable handle to a state within one machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) usize);

impl StateId {
    /// Position of the state in the machine's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// Stable handle to a transition within one machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(pub(crate) usize);

impl TransitionId {
    /// Position of the transition in the machine's transition table.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transition#{}", self.0)
    }
}

/// A node in the state hierarchy.
///
/// Structure (name, parent, children, initial child, finality and owned
/// transitions) is fixed once the machine is built. Only the active flag
/// changes afterwards, and only the engine flips it.
pub struct StateNode {
    pub(crate) name: String,
    pub(crate) parent: Option<StateId>,
    pub(crate) children: Vec<StateId>,
    pub(crate) initial: Option<StateId>,
    pub(crate) is_final: bool,
    pub(crate) active: Cell<bool>,
    pub(crate) transitions: Vec<TransitionId>,
}

impl StateNode {
    pub(crate) fn new(name: String, parent: Option<StateId>, is_final: bool) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            initial: None,
            is_final,
            active: Cell::new(false),
            transitions: Vec::new(),
        }
    }

    /// Diagnostic name. Names are not required to be unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent state, `None` for the root.
    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[StateId] {
        &self.children
    }

    /// Explicitly designated initial child.
    pub fn initial_child(&self) -> Option<StateId> {
        self.initial
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// A state with at least one child.
    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the state is part of the active configuration.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Transitions declared on this state, in declaration order.
    pub fn transitions(&self) -> &[TransitionId] {
        &self.transitions
    }
}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("initial", &self.initial)
            .field("is_final", &self.is_final)
            .field("active", &self.active.get())
            .finish()
    }
}
