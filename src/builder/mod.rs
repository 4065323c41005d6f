//! Builder API for ergonomic state machine construction.
//!
//! [`MachineBuilder`] assembles the state tree, transitions and listeners,
//! validates the structure, and hands everything to the engine. The
//! [`event!`](crate::event) macro declares marker events.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;
