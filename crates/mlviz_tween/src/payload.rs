//! Opaque data handed to draw and completion callbacks

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

/// Data passed to a task's `draw` and `on_complete` callbacks
///
/// Ownership is part of the type: an `Owned` payload is dropped by the engine
/// when its task retires, a `Borrowed` payload is only ever observed through a
/// weak reference and stays with the caller.
pub enum Payload {
    /// Engine-managed; released exactly once at retirement
    Owned(Box<dyn Any>),
    /// Caller-managed; never released by the engine
    Borrowed(Weak<dyn Any>),
}

impl Payload {
    pub fn owned<T: Any>(value: T) -> Self {
        Payload::Owned(Box::new(value))
    }

    pub fn borrowed<T: Any>(value: &Rc<T>) -> Self {
        let weak: Weak<T> = Rc::downgrade(value);
        Payload::Borrowed(weak)
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Payload::Owned(_))
    }

    /// Run `f` with a view of the payload
    ///
    /// A borrowed payload whose owner has gone away is seen as `None`.
    pub(crate) fn with<R>(&self, f: impl FnOnce(Option<&dyn Any>) -> R) -> R {
        match self {
            Payload::Owned(value) => f(Some(&**value)),
            Payload::Borrowed(weak) => match weak.upgrade() {
                Some(value) => f(Some(&*value)),
                None => f(None),
            },
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Owned(_) => f.write_str("Payload::Owned(..)"),
            Payload::Borrowed(weak) => f
                .debug_struct("Payload::Borrowed")
                .field("alive", &(weak.strong_count() > 0))
                .finish(),
        }
    }
}

/// Run `f` with an optional payload
pub(crate) fn with_payload<R>(
    payload: Option<&Payload>,
    f: impl FnOnce(Option<&dyn Any>) -> R,
) -> R {
    match payload {
        Some(payload) => payload.with(f),
        None => f(None),
    }
}
