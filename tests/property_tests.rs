//! Property-based tests for state tree traversal.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated trees and event sequences.

use proptest::prelude::*;
use proptest::sample::Index;
use std::cell::RefCell;
use std::rc::Rc;
use treestate::core::Event;
use treestate::{event, MachineBuilder, Processed, StateId, StateMachine, TransitionBuilder};

event! {
    struct Unhandled;
}

#[derive(Debug)]
struct Jump(StateId);

impl Event for Jump {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Enter(StateId),
    Exit(StateId),
}

struct Fixture {
    machine: StateMachine,
    states: Vec<StateId>,
    log: Rc<RefCell<Vec<Step>>>,
}

/// Build a tree where node `i + 1` hangs under one of the nodes before it,
/// every composite starts in its first child, and `Jump` moves anywhere.
fn fixture(parents: &[Index]) -> Fixture {
    let mut builder = MachineBuilder::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut states = vec![builder.root()];
    let mut first_child: Vec<Option<StateId>> = vec![None];

    for (n, index) in parents.iter().enumerate() {
        let slot = index.index(states.len());
        let state = builder.state(states[slot], format!("s{n}"));
        if first_child[slot].is_none() {
            first_child[slot] = Some(state);
        }
        states.push(state);
        first_child.push(None);
    }
    for (slot, child) in first_child.iter().enumerate() {
        if let Some(child) = child {
            builder.set_initial(states[slot], *child);
        }
    }
    for &state in &states {
        let entered = Rc::clone(&log);
        builder.on_entry(state, move |ctx| entered.borrow_mut().push(Step::Enter(ctx.state())));
        let exited = Rc::clone(&log);
        builder.on_exit(state, move |ctx| exited.borrow_mut().push(Step::Exit(ctx.state())));
    }
    builder
        .transition(
            TransitionBuilder::on::<Jump>()
                .to_computed(|event, _| event.downcast_ref::<Jump>().map(|jump| jump.0)),
        )
        .unwrap();

    Fixture {
        machine: builder.build().unwrap(),
        states,
        log,
    }
}

fn initial_chain(machine: &StateMachine) -> Vec<StateId> {
    let mut chain = vec![machine.root()];
    while let Some(child) = chain
        .last()
        .and_then(|state| machine.state(*state))
        .and_then(|node| node.initial_child())
    {
        chain.push(child);
    }
    chain
}

fn assert_consistent(machine: &StateMachine) -> Result<(), TestCaseError> {
    let path = machine.active_path();
    prop_assert_eq!(path.first().copied(), Some(machine.root()));
    for pair in path.windows(2) {
        prop_assert_eq!(machine.state(pair[1]).and_then(|s| s.parent()), Some(pair[0]));
    }
    let leaf = machine.active_leaf().and_then(|id| machine.state(id));
    prop_assert!(leaf.is_some_and(|node| node.is_leaf()));

    let active = machine.tree().ids().filter(|id| machine.is_active(*id)).count();
    prop_assert_eq!(active, path.len());
    Ok(())
}

fn parents() -> impl Strategy<Value = Vec<Index>> {
    prop::collection::vec(any::<Index>(), 1..16)
}

proptest! {
    #[test]
    fn start_enters_initial_chain(parents in parents()) {
        let f = fixture(&parents);
        f.machine.start().unwrap();

        let chain = initial_chain(&f.machine);
        prop_assert_eq!(f.machine.active_path(), chain.clone());
        let entered: Vec<Step> = chain.into_iter().map(Step::Enter).collect();
        prop_assert_eq!(f.log.borrow().clone(), entered);
        assert_consistent(&f.machine)?;
    }

    #[test]
    fn unmatched_event_leaves_configuration_unchanged(
        parents in parents(),
        jumps in prop::collection::vec(any::<Index>(), 0..8),
    ) {
        let f = fixture(&parents);
        f.machine.start().unwrap();
        for jump in &jumps {
            f.machine.process_event(&Jump(f.states[jump.index(f.states.len())])).unwrap();
        }
        let before = f.machine.active_path();
        f.log.borrow_mut().clear();

        prop_assert_eq!(f.machine.process_event(&Unhandled).unwrap(), Processed::Ignored);
        prop_assert_eq!(f.machine.active_path(), before);
        prop_assert!(f.log.borrow().is_empty());
    }

    #[test]
    fn traversal_is_bounded_by_common_ancestor(
        parents in parents(),
        jumps in prop::collection::vec(any::<Index>(), 1..8),
    ) {
        let f = fixture(&parents);
        let tree = f.machine.tree();
        f.machine.start().unwrap();

        for jump in &jumps {
            let target = f.states[jump.index(f.states.len())];
            let leaf = f.machine.active_leaf().unwrap();
            let boundary = if target == tree.root() {
                tree.root()
            } else if f.machine.is_active(target) {
                tree.get(target).and_then(|node| node.parent()).unwrap()
            } else {
                tree.lca(leaf, target)
            };
            f.log.borrow_mut().clear();

            f.machine.process_event(&Jump(target)).unwrap();

            let log = f.log.borrow().clone();
            let exits: Vec<Step> = tree
                .ancestors(leaf)
                .take_while(|state| *state != boundary)
                .map(Step::Exit)
                .collect();
            prop_assert_eq!(&log[..exits.len()], exits.as_slice());

            let entries = &log[exits.len()..];
            prop_assert!(entries.iter().all(|step| matches!(step, Step::Enter(_))));
            let path = f.machine.active_path();
            let boundary_depth = tree.depth(boundary);
            let expected: Vec<Step> = path[boundary_depth + 1..]
                .iter()
                .copied()
                .map(Step::Enter)
                .collect();
            prop_assert_eq!(entries, expected.as_slice());
            prop_assert!(tree.is_within(f.machine.active_leaf().unwrap(), target));
            assert_consistent(&f.machine)?;
        }
    }
}
