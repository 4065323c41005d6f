//! Macros for ergonomic state machine construction.

/// Declare unit-struct events.
///
/// Each struct derives `Debug`, `Clone`, `Copy`, `PartialEq` and `Eq` and
/// implements [`Event`](crate::core::Event). Categories listed after a
/// colon are matched by transitions bound to them.
///
/// # Example
///
/// ```
/// use treestate::core::{Event, EventKind};
/// use treestate::event;
///
/// /// Category for connection problems.
/// pub struct ConnectionEvent;
///
/// event! {
///     pub struct Connect;
///     pub struct Timeout: ConnectionEvent;
/// }
///
/// assert!(EventKind::of::<ConnectionEvent>().matches(&Timeout));
/// assert!(!EventKind::of::<ConnectionEvent>().matches(&Connect));
/// assert_eq!(Connect.name(), "Connect");
/// ```
#[macro_export]
macro_rules! event {
    (
        $(
            $(#[$meta:meta])*
            $vis:vis struct $name:ident $(: $($category:ty),+)?;
        )+
    ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            $vis struct $name;

            impl $crate::core::Event for $name {
                #[allow(unused_variables)]
                fn belongs_to(&self, kind: &$crate::core::EventKind) -> bool {
                    false $($(|| *kind == $crate::core::EventKind::of::<$category>())+)?
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Event, EventKind};

    struct Alarm;
    struct Hardware;

    event! {
        struct Reset;
        pub struct Overheat: Alarm, Hardware;
    }

    #[test]
    fn event_macro_generates_trait() {
        let event: &dyn Event = &Reset;
        assert_eq!(event.name(), "Reset");
        assert_eq!(event.kind(), EventKind::of::<Reset>());
        assert!(!event.belongs_to(&EventKind::of::<Alarm>()));
    }

    #[test]
    fn event_macro_declares_categories() {
        assert!(EventKind::of::<Alarm>().matches(&Overheat));
        assert!(EventKind::of::<Hardware>().matches(&Overheat));
        assert!(!EventKind::of::<Reset>().matches(&Overheat));
    }

    #[test]
    fn event_macro_supports_visibility() {
        // The macro should work with pub visibility
        event! {
            pub struct Public;
        }

        assert_eq!(Public, Public);
    }
}
