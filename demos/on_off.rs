//! On/Off Switch
//!
//! The smallest useful machine: two states and two events.
//!
//! Key concepts:
//! - Declaring marker events with `event!`
//! - Entry, exit and trigger listeners
//! - Passing an argument from a trigger listener to an entry listener
//!
//! Run with: cargo run --example on_off

use treestate::builder::{MachineBuilder, TransitionBuilder};
use treestate::core::Event;
use treestate::event;

event! {
    pub struct SwitchOn;
    pub struct SwitchOff;
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== On/Off Switch ===\n");

    let mut builder = MachineBuilder::new();
    let root = builder.root();
    let off = builder.initial_state(root, "off");
    let on = builder.state(root, "on");

    builder.transition(
        TransitionBuilder::on::<SwitchOn>()
            .from(off)
            .to(on)
            .on_triggered(|ctx| {
                println!("  triggered by {}", ctx.event().name());
                ctx.set_argument(100u8);
            }),
    )?;
    builder.transition(TransitionBuilder::on::<SwitchOff>().from(on).to(off))?;

    for state in [off, on] {
        builder
            .on_entry(state, |ctx| match ctx.argument::<u8>() {
                Some(brightness) => println!("  enter {} at {brightness}%", ctx.name()),
                None => println!("  enter {}", ctx.name()),
            })
            .on_exit(state, |ctx| println!("  exit {}", ctx.name()));
    }

    let machine = builder.build()?;
    machine.start()?;

    let events: [&dyn Event; 4] = [&SwitchOn, &SwitchOff, &SwitchOff, &SwitchOn];
    for event in events {
        println!("\n{} ->", event.name());
        let processed = machine.process_event(event)?;
        if processed.is_ignored() {
            println!("  ignored");
        }
    }

    println!("\nHistory:");
    for record in machine.history().records() {
        println!("  {:<10} {} -> {} ({:?})", record.event, record.from, record.to, record.outcome);
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
