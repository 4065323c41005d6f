//! Events and the keys transitions match them by.
//!
//! An event's runtime type is its matching key. Marker types (unit
//! structs) and payload-carrying types are both events; the submitted
//! reference is threaded through to listeners unchanged, so listeners
//! can downcast to read the payload.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Upcast helper implemented for every sized `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A value submitted to a [`StateMachine`](crate::StateMachine).
///
/// Only [`belongs_to`](Event::belongs_to) is normally overridden, to
/// declare categories a transition can be bound to instead of the
/// concrete type.
///
/// # Example
///
/// ```rust
/// use treestate::core::{Event, EventKind};
///
/// /// Category marker; never submitted itself.
/// struct NetworkEvent;
///
/// #[derive(Debug)]
/// struct PacketLost {
///     sequence: u64,
/// }
///
/// impl Event for PacketLost {
///     fn belongs_to(&self, kind: &EventKind) -> bool {
///         *kind == EventKind::of::<NetworkEvent>()
///     }
/// }
///
/// let event: &dyn Event = &PacketLost { sequence: 7 };
/// assert!(EventKind::of::<PacketLost>().matches(event));
/// assert!(EventKind::of::<NetworkEvent>().matches(event));
/// assert_eq!(event.downcast_ref::<PacketLost>().map(|e| e.sequence), Some(7));
/// ```
pub trait Event: AsAny + fmt::Debug + 'static {
    /// Short name used in logs and history records.
    fn name(&self) -> &str {
        short_type_name(type_name::<Self>())
    }

    /// Declared supertypes of this event. Defaults to none.
    fn belongs_to(&self, kind: &EventKind) -> bool {
        let _ = kind;
        false
    }

    /// Runtime type key of this event. Not meant to be overridden.
    fn kind(&self) -> EventKind {
        EventKind::of::<Self>()
    }
}

impl dyn Event {
    /// Whether the event's runtime type is `T`.
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Matching key a transition is bound to.
///
/// Built from a concrete event type, a category marker, or `dyn Event`,
/// which matches every event.
#[derive(Clone, Copy)]
pub struct EventKind {
    id: TypeId,
    name: &'static str,
}

impl EventKind {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(type_name::<T>()),
        }
    }

    /// Kind matching every event.
    pub fn any() -> Self {
        Self::of::<dyn Event>()
    }

    pub fn is_any(&self) -> bool {
        self.id == TypeId::of::<dyn Event>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Same runtime type, wildcard, or a category the event declares.
    pub fn matches(&self, event: &dyn Event) -> bool {
        self.is_any() || event.kind() == *self || event.belongs_to(self)
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventKind {}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventKind({})", self.name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
