//! Connection Lifecycle
//!
//! A nested protocol machine with global transitions, guards, event
//! categories and a final state.
//!
//! Key concepts:
//! - Composite states entered through their initial child
//! - Exit/entry ordering bounded by the common ancestor
//! - Machine-wide transitions declared on the root
//! - Guards reading event payloads
//! - Finished notifications
//!
//! Run with: cargo run --example connection_lifecycle

use std::cell::Cell;
use std::rc::Rc;
use treestate::builder::{MachineBuilder, TransitionBuilder};
use treestate::core::{Event, EventKind};
use treestate::{event, MachineOptions};

/// Category of events reporting a broken link.
pub struct LinkFailure;

event! {
    pub struct Dial;
    pub struct HandshakeDone;
    pub struct Pause;
    pub struct Resume;
    pub struct Hangup;
    pub struct Timeout: LinkFailure;
    pub struct Reset: LinkFailure;
}

/// Retry request carrying the attempt number.
#[derive(Debug)]
pub struct Retry {
    attempt: u32,
}

impl Event for Retry {}

const MAX_RETRIES: u32 = 3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Connection Lifecycle ===\n");

    let mut builder = MachineBuilder::with_options(MachineOptions::new("connection"));
    let root = builder.root();
    let idle = builder.initial_state(root, "idle");
    let connected = builder.state(root, "connected");
    let handshake = builder.initial_state(connected, "handshake");
    let session = builder.state(connected, "session");
    let active = builder.initial_state(session, "active");
    let paused = builder.state(session, "paused");
    let closed = builder.final_state(root, "closed");

    builder.transition(TransitionBuilder::on::<Dial>().from(idle).to(connected))?;
    builder.transition(
        TransitionBuilder::on::<HandshakeDone>()
            .from(handshake)
            .to(session),
    )?;
    builder.transition(TransitionBuilder::on::<Pause>().from(active).to(paused))?;
    builder.transition(TransitionBuilder::on::<Resume>().from(paused).to(active))?;
    builder.transition(
        TransitionBuilder::on::<LinkFailure>()
            .named("link lost")
            .from(connected)
            .to(idle),
    )?;
    builder.transition(
        TransitionBuilder::on::<Retry>()
            .from(idle)
            .to(connected)
            .when(|event, _| {
                event
                    .downcast_ref::<Retry>()
                    .is_some_and(|retry| retry.attempt <= MAX_RETRIES)
            }),
    )?;
    builder.transition(TransitionBuilder::on::<Hangup>().named("hangup").to(closed))?;

    for state in [idle, connected, handshake, session, active, paused, closed] {
        builder
            .on_entry(state, |ctx| println!("  enter {}", ctx.name()))
            .on_exit(state, |ctx| println!("  exit {}", ctx.name()));
    }

    let finished = Rc::new(Cell::new(false));
    let done = Rc::clone(&finished);
    builder
        .on_finished(root, move |ctx| {
            println!("  {} finished", ctx.name());
            done.set(true);
        })
        .on_ignored_event(|ctx| println!("  {} ignored", ctx.event().name()));

    let machine = builder.build()?;
    println!("start ->");
    machine.start()?;

    let script: Vec<Box<dyn Event>> = vec![
        Box::new(Dial),
        Box::new(HandshakeDone),
        Box::new(Pause),
        Box::new(Timeout),
        Box::new(Retry { attempt: 4 }),
        Box::new(Retry { attempt: 2 }),
        Box::new(Resume),
        Box::new(Reset),
        Box::new(Hangup),
    ];
    for event in &script {
        println!("\n{} ->", event.name());
        machine.process_event(&**event)?;
    }

    println!("\nTimeout is a LinkFailure: {}", EventKind::of::<LinkFailure>().matches(&Timeout));
    println!("Finished: {} ({})", machine.is_finished(), finished.get());
    println!("Leaf path: {}", machine.history().path().join(" -> "));

    println!("\n=== Example Complete ===");
    Ok(())
}
