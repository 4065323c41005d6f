//! Treestate: a hierarchical finite state machine engine
//!
//! States form a tree. Exactly one root-to-leaf path is active at a time,
//! and every event is resolved against that path from the innermost state
//! outwards. Exit and entry listeners run in a fixed, auditable order
//! bounded by the least common ancestor of the source and target.
//!
//! # Core Concepts
//!
//! - **States**: arena-allocated tree nodes addressed by [`StateId`]
//! - **Events**: any `Debug + 'static` type implementing [`Event`]
//! - **Transitions**: edges bound to an [`EventKind`], with a fixed,
//!   computed or absent target and an optional [`Guard`]
//! - **Listeners**: entry, exit, finished and triggered callbacks
//! - **History**: a serializable audit log of processed events
//!
//! # Example
//!
//! ```rust
//! use treestate::builder::{MachineBuilder, TransitionBuilder};
//! use treestate::{event, Processed};
//!
//! event! {
//!     pub struct Connect;
//!     pub struct Disconnect;
//! }
//!
//! let mut builder = MachineBuilder::new();
//! let root = builder.root();
//! let offline = builder.initial_state(root, "offline");
//! let online = builder.state(root, "online");
//! let syncing = builder.initial_state(online, "syncing");
//!
//! builder
//!     .transition(TransitionBuilder::on::<Connect>().from(offline).to(online))
//!     .unwrap();
//! builder
//!     .transition(TransitionBuilder::on::<Disconnect>().to(offline))
//!     .unwrap();
//! builder.on_entry(syncing, |ctx| println!("entered {}", ctx.name()));
//!
//! let machine = builder.build().unwrap();
//! machine.start().unwrap();
//!
//! assert!(machine.process_event(&Connect).unwrap().is_fired());
//! assert_eq!(machine.active_path(), vec![root, online, syncing]);
//!
//! machine.process_event(&Disconnect).unwrap();
//! assert_eq!(machine.active_leaf(), Some(offline));
//!
//! // Nothing on the active path handles a second `Connect` from `online`.
//! machine.process_event(&Connect).unwrap();
//! assert_eq!(machine.process_event(&Connect).unwrap(), Processed::Ignored);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;

// Re-export commonly used types
pub use crate::builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use crate::config::{InitialChildPolicy, MachineOptions};
pub use crate::core::{Direction, Event, EventKind, Guard, StateId, TransitionHistory, TransitionId};
pub use crate::engine::{Processed, StateContext, StateMachine, TransitionContext};
pub use crate::error::{ConfigurationError, ListenerError, MachineError};
