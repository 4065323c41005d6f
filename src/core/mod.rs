//! Core state machine types.
//!
//! This module contains the building blocks the engine operates on:
//! - The arena-backed state tree and its traversal queries
//! - Events and the kinds transitions are bound to
//! - Guards, resolved directions, and transition arguments
//! - The serializable audit history
//!
//! Nothing in here drives a machine; the engine owns all mutation.

mod argument;
mod direction;
mod event;
mod guard;
mod history;
mod state;
mod tree;

pub use argument::Argument;
pub use direction::Direction;
pub use event::{AsAny, Event, EventKind};
pub use guard::Guard;
pub use history::{Outcome, TransitionHistory, TransitionRecord};
pub use state::{StateId, StateNode, TransitionId};
pub use tree::StateTree;
