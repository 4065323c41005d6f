//! Event processing.
//!
//! The engine owns the built machine: it selects the transition for an
//! event, computes the exit and entry sequences, flips active flags and
//! notifies listeners in a fixed order.

pub(crate) mod listener;
mod machine;
mod resolver;
mod transition;

pub use listener::{EventContext, ListenerResult, StateContext, Step, TransitionContext};
pub use machine::{Processed, StateMachine};
pub use transition::{TargetFn, TargetRule, Transition};
