#![forbid(unsafe_code)]

//! Publish/subscribe mediator.
//!
//! The mediator is the capability a component uses instead of a raw
//! global bus: every subscription is tagged with the owning component,
//! so disposal can guarantee unsubscription two ways — through the
//! component's binding registry (the mediator is an ordinary
//! [`Emitter`]) and through [`Mediator::unsubscribe_all`] as the final
//! sweep.
//!
//! # Process handle
//!
//! One mediator usually serves a whole application. [`install`] /
//! [`current`] / [`teardown`] manage a thread-local handle with explicit
//! lifecycle so tests instantiate isolated instances; nothing forces its
//! use — components accept an injected handle first and fall back to the
//! installed one.
//!
//! # Failure Modes
//!
//! - Double [`install`] without a [`teardown`] is an error, not a silent
//!   replacement.
//! - [`current`] with nothing installed returns `None`; the component
//!   layer turns that into its missing-mediator error.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use trellis_core::{ComponentId, Emitter, EmitterGone, EmitterId, Handler};

use crate::channel::EventChannel;

/// Owner-indexed pub/sub hub. Shared as `Rc<Mediator>`.
#[derive(Debug, Default)]
pub struct Mediator {
    events: EventChannel,
}

impl Mediator {
    /// Create a fresh, empty mediator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `payload` to every subscriber of `topic`.
    pub fn publish(&self, topic: &str, payload: &Value) {
        self.events.emit(topic, payload);
    }

    /// Subscribe `handler` to `topic` on behalf of `owner`.
    ///
    /// The handler is stored weakly; the owner's binding registry keeps
    /// the strong side, which is what makes unsubscribe-on-disposal a
    /// guarantee rather than a convention.
    pub fn subscribe(&self, topic: &str, handler: &Handler, owner: ComponentId) {
        self.events.on(topic, handler, owner);
    }

    /// Remove one subscription.
    ///
    /// # Errors
    ///
    /// [`EmitterGone`] if the mediator was destroyed.
    pub fn unsubscribe(&self, topic: &str, handler: &Handler) -> Result<(), EmitterGone> {
        self.events.off(topic, handler)
    }

    /// Drop every subscription `owner` holds, across all topics.
    pub fn unsubscribe_all(&self, owner: ComponentId) {
        self.events.off_owner(owner);
    }

    /// Live subscriber count for `topic`, for leak assertions.
    #[must_use]
    pub fn subscription_count(&self, topic: &str) -> usize {
        self.events.listener_count(topic)
    }
}

impl Emitter for Mediator {
    fn emitter_id(&self) -> EmitterId {
        self.events.emitter_id()
    }

    fn on(&self, event: &str, handler: &Handler, owner: ComponentId) {
        self.events.on(event, handler, owner);
    }

    fn off(&self, event: &str, handler: &Handler) -> Result<(), EmitterGone> {
        self.events.off(event, handler)
    }

    fn off_owner(&self, owner: ComponentId) {
        self.events.off_owner(owner);
    }

    fn is_destroyed(&self) -> bool {
        self.events.is_destroyed()
    }
}

/// Error from [`install`]: a mediator is already installed on this
/// thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediatorInstallError;

impl std::fmt::Display for MediatorInstallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a mediator is already installed on this thread")
    }
}

impl std::error::Error for MediatorInstallError {}

thread_local! {
    static CURRENT: RefCell<Option<Rc<Mediator>>> = const { RefCell::new(None) };
}

/// Install `mediator` as this thread's process-wide handle.
///
/// # Errors
///
/// [`MediatorInstallError`] if a handle is already installed; call
/// [`teardown`] first.
pub fn install(mediator: Rc<Mediator>) -> Result<(), MediatorInstallError> {
    CURRENT.with(|current| {
        let mut slot = current.borrow_mut();
        if slot.is_some() {
            return Err(MediatorInstallError);
        }
        *slot = Some(mediator);
        Ok(())
    })
}

/// The currently installed handle, if any.
#[must_use]
pub fn current() -> Option<Rc<Mediator>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Remove and return the installed handle.
pub fn teardown() -> Option<Rc<Mediator>> {
    CURRENT.with(|current| current.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn counting() -> (Handler, Rc<Cell<usize>>) {
        let hits = Rc::new(Cell::new(0));
        let h = {
            let hits = Rc::clone(&hits);
            Handler::new(move |_| hits.set(hits.get() + 1))
        };
        (h, hits)
    }

    #[test]
    fn publish_reaches_subscribers() {
        let mediator = Mediator::new();
        let (h, hits) = counting();
        mediator.subscribe("user:login", &h, ComponentId::next());

        mediator.publish("user:login", &Value::Null);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn unsubscribe_removes() {
        let mediator = Mediator::new();
        let (h, hits) = counting();
        mediator.subscribe("t", &h, ComponentId::next());
        mediator.unsubscribe("t", &h).unwrap();

        mediator.publish("t", &Value::Null);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn unsubscribe_all_sweeps_owner_only() {
        let mediator = Mediator::new();
        let me = ComponentId::next();
        let other = ComponentId::next();
        let (h1, c1) = counting();
        let (h2, c2) = counting();
        mediator.subscribe("a", &h1, me);
        mediator.subscribe("a", &h2, other);

        mediator.unsubscribe_all(me);
        mediator.publish("a", &Value::Null);
        assert_eq!(c1.get(), 0);
        assert_eq!(c2.get(), 1);
        assert_eq!(mediator.subscription_count("a"), 1);
    }

    #[test]
    fn dropped_handler_means_no_delivery() {
        let mediator = Mediator::new();
        {
            let (h, _) = counting();
            mediator.subscribe("t", &h, ComponentId::next());
        }
        mediator.publish("t", &Value::Null);
        assert_eq!(mediator.subscription_count("t"), 0);
    }

    // ── Process handle ──────────────────────────────────────────────

    #[test]
    fn install_current_teardown_cycle() {
        assert!(current().is_none());

        let mediator = Rc::new(Mediator::new());
        install(Rc::clone(&mediator)).unwrap();
        assert!(current().is_some());

        let removed = teardown().unwrap();
        assert!(Rc::ptr_eq(&removed, &mediator));
        assert!(current().is_none());
    }

    #[test]
    fn double_install_is_an_error() {
        install(Rc::new(Mediator::new())).unwrap();
        assert_eq!(
            install(Rc::new(Mediator::new())),
            Err(MediatorInstallError)
        );
        teardown();
    }

    #[test]
    fn teardown_without_install_is_none() {
        assert!(teardown().is_none());
    }
}
