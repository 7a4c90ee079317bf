#![forbid(unsafe_code)]

//! Events and handler identity.
//!
//! An [`Event`] is a name plus a JSON payload. A [`Handler`] wraps an
//! `Rc<dyn Fn(&Event)>` and carries *identity*: two handlers compare equal
//! only when they share the same allocation, which is what makes the
//! `(emitter, event, handler)` binding triple well-defined.
//!
//! # Invariants
//!
//! 1. `Handler::ptr_eq` is reflexive over clones: any clone of a handler
//!    matches the original.
//! 2. Emitters store [`WeakHandler`]s only. The strong reference lives in
//!    the owning component's binding registry, so dropping the registry
//!    entry is enough to silence the handler even if the emitter could
//!    not be told (it prunes dead weaks lazily).
//!
//! # Failure Modes
//!
//! - A `WeakHandler` whose strong side was dropped upgrades to `None`;
//!   emitters treat that as "listener gone" and prune it.

use std::rc::{Rc, Weak};

use serde_json::Value;

/// The well-known disposal event every emitter must publish before
/// becoming unusable.
pub const DESTROY_EVENT: &str = "destroy";

/// The coarse change event a model emits after any attribute change,
/// following the per-attribute `change:{attr}` event.
pub const CHANGE_EVENT: &str = "change";

/// Name of the per-attribute change event for `attr`.
#[must_use]
pub fn change_event(attr: &str) -> String {
    format!("change:{attr}")
}

/// A named event with a JSON payload.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event name, e.g. `"change:email"` or `"destroy"`.
    pub name: String,
    /// Payload; `Value::Null` for pure signals.
    pub payload: Value,
}

impl Event {
    /// Create an event with a payload.
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Create a payload-less signal event.
    #[must_use]
    pub fn signal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Value::Null,
        }
    }
}

type HandlerFn = dyn Fn(&Event);

/// A clonable, identity-carrying event handler.
///
/// Cloning shares the underlying closure; [`ptr_eq`](Self::ptr_eq) treats
/// all clones as the same handler. That identity is what `bind`/`unbind`
/// key on.
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
    /// Wrap a closure as a handler.
    #[must_use]
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }

    /// Whether two handlers share the same underlying closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    /// Downgrade to the weak form emitters store.
    #[must_use]
    pub fn downgrade(&self) -> WeakHandler {
        WeakHandler(Rc::downgrade(&self.0))
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("ptr", &Rc::as_ptr(&self.0))
            .finish()
    }
}

/// Weak form of a [`Handler`], held by emitters.
#[derive(Clone)]
pub struct WeakHandler(Weak<HandlerFn>);

impl WeakHandler {
    /// Upgrade back to a callable handler, if the strong side is alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Handler> {
        self.0.upgrade().map(Handler)
    }

    /// Whether this weak handler points at the given strong handler.
    #[must_use]
    pub fn points_to(&self, handler: &Handler) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), Rc::as_ptr(&handler.0))
    }
}

impl std::fmt::Debug for WeakHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakHandler")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn signal_has_null_payload() {
        let ev = Event::signal(DESTROY_EVENT);
        assert_eq!(ev.name, "destroy");
        assert!(ev.payload.is_null());
    }

    #[test]
    fn change_event_name() {
        assert_eq!(change_event("email"), "change:email");
    }

    #[test]
    fn handler_calls_closure() {
        let hits = Rc::new(Cell::new(0));
        let h = {
            let hits = Rc::clone(&hits);
            Handler::new(move |_| hits.set(hits.get() + 1))
        };
        h.call(&Event::signal("ping"));
        h.call(&Event::signal("ping"));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn clones_share_identity() {
        let a = Handler::new(|_| {});
        let b = a.clone();
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn distinct_handlers_differ() {
        let a = Handler::new(|_| {});
        let b = Handler::new(|_| {});
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn weak_upgrades_while_strong_alive() {
        let a = Handler::new(|_| {});
        let w = a.downgrade();
        assert!(w.upgrade().is_some());
        assert!(w.points_to(&a));
    }

    #[test]
    fn weak_dies_with_strong() {
        let w = Handler::new(|_| {}).downgrade();
        assert!(w.upgrade().is_none());
    }

    #[test]
    fn weak_points_to_matches_clones_only() {
        let a = Handler::new(|_| {});
        let b = Handler::new(|_| {});
        let w = a.downgrade();
        assert!(w.points_to(&a.clone()));
        assert!(!w.points_to(&b));
    }
}
