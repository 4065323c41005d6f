//! Resolved outcome of a transition's target rule.

use super::state::StateId;

/// Where a matched transition leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Internal transition: listeners fire, the active configuration stays.
    Stay,

    /// An inactive state; exit and entry are bounded by the common ancestor.
    Target(StateId),

    /// A state that is already active. It is exited and re-entered.
    SelfLoop(StateId),
}

impl Direction {
    pub fn target(&self) -> Option<StateId> {
        match self {
            Self::Stay => None,
            Self::Target(state) | Self::SelfLoop(state) => Some(*state),
        }
    }

    pub fn is_stay(&self) -> bool {
        matches!(self, Self::Stay)
    }

    pub fn is_self_loop(&self) -> bool {
        matches!(self, Self::SelfLoop(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stay_has_no_target() {
        assert_eq!(Direction::Stay.target(), None);
        assert!(Direction::Stay.is_stay());
        assert!(!Direction::Stay.is_self_loop());
    }

    #[test]
    fn self_loop_keeps_its_target() {
        let direction = Direction::SelfLoop(StateId(2));
        assert_eq!(direction.target(), Some(StateId(2)));
        assert!(direction.is_self_loop());
        assert!(!Direction::Target(StateId(2)).is_self_loop());
    }
}
