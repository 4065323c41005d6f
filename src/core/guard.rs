//! Guard predicates for controlling transitions.
//!
//! A guard sees the submitted event and the direction the transition's
//! target rule resolved to. A rejecting guard makes its transition count
//! as not matching, and resolution moves on to the next candidate.

use super::direction::Direction;
use super::event::Event;

/// Predicate deciding whether a matched transition may fire.
///
/// # Example
///
/// ```rust
/// use treestate::core::{Direction, Event, Guard};
///
/// #[derive(Debug)]
/// struct Volume(u8);
/// impl Event for Volume {}
///
/// let not_too_loud = Guard::new(|event: &dyn Event, _: &Direction| {
///     event.downcast_ref::<Volume>().is_some_and(|v| v.0 <= 11)
/// });
///
/// assert!(not_too_loud.check(&Volume(3), &Direction::Stay));
/// assert!(!not_too_loud.check(&Volume(12), &Direction::Stay));
/// ```
pub struct Guard {
    predicate: Box<dyn Fn(&dyn Event, &Direction) -> bool>,
}

impl Guard {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Event, &Direction) -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that only looks at the event.
    pub fn on_event<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Event) -> bool + 'static,
    {
        Self::new(move |event, _| predicate(event))
    }

    pub fn check(&self, event: &dyn Event, direction: &Direction) -> bool {
        (self.predicate)(event, direction)
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateId;

    #[derive(Debug)]
    struct Knock(u32);
    impl Event for Knock {}

    #[derive(Debug)]
    struct Other;
    impl Event for Other {}

    #[test]
    fn guard_reads_event_payload() {
        let guard = Guard::on_event(|e| e.downcast_ref::<Knock>().is_some_and(|k| k.0 >= 3));

        assert!(guard.check(&Knock(3), &Direction::Stay));
        assert!(!guard.check(&Knock(2), &Direction::Stay));
        assert!(!guard.check(&Other, &Direction::Stay));
    }

    #[test]
    fn guard_sees_proposed_direction() {
        let guard = Guard::new(|_, direction| !direction.is_self_loop());

        assert!(guard.check(&Other, &Direction::Target(StateId(1))));
        assert!(!guard.check(&Other, &Direction::SelfLoop(StateId(1))));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|_, direction| direction.is_stay());
        let first = guard.check(&Other, &Direction::Stay);
        let second = guard.check(&Other, &Direction::Stay);
        assert_eq!(first, second);
    }
}
