//! Per-transition argument slot.

use std::any::Any;
use std::fmt;

/// Type-erased value a trigger listener hands to the destination's
/// entry listeners.
///
/// The slot belongs to a transition. It is cleared each time that
/// transition is selected, before its trigger listeners run, so a value
/// never leaks from one firing into the next.
#[derive(Default)]
pub struct Argument {
    value: Option<Box<dyn Any>>,
}

impl Argument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Any>(&mut self, value: T) {
        self.value = Some(Box::new(value));
    }

    /// The stored value, if one is set and has type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value.as_deref().and_then(|value| value.downcast_ref::<T>())
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_argument_reads_none() {
        let argument = Argument::new();
        assert!(!argument.is_set());
        assert_eq!(argument.get::<i32>(), None);
    }

    #[test]
    fn typed_read_requires_matching_type() {
        let mut argument = Argument::new();
        argument.set(1_i32);

        assert_eq!(argument.get::<i32>(), Some(&1));
        assert_eq!(argument.get::<u32>(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut argument = Argument::new();
        argument.set("first".to_string());
        argument.set(2_u8);

        assert_eq!(argument.get::<String>(), None);
        assert_eq!(argument.get::<u8>(), Some(&2));
    }

    #[test]
    fn clear_empties_the_slot() {
        let mut argument = Argument::new();
        argument.set(5_u64);
        argument.clear();
        assert!(!argument.is_set());
        assert_eq!(argument.get::<u64>(), None);
    }
}
