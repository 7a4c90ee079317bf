#![forbid(unsafe_code)]

//! The single-threaded event channel.
//!
//! `EventChannel` is the one [`Emitter`] implementation everything else
//! delegates to. Listeners are stored weakly per event name, in
//! registration order, tagged with the owning component.
//!
//! # Invariants
//!
//! 1. Listeners fire in registration order.
//! 2. Emission snapshots the listener list first, so handlers may bind,
//!    unbind, destroy, or dispose re-entrantly without upsetting the
//!    walk. A handler removed mid-emission still fires for the current
//!    event; it will not fire for the next one.
//! 3. Dead weak handlers are pruned lazily during emission.
//! 4. `destroy` publishes [`DESTROY_EVENT`] exactly once, then clears
//!    every listener; it is idempotent, including against re-entrant
//!    calls from inside the destroy notification itself.
//!
//! # Failure Modes
//!
//! - `on` after destruction is ignored (logged at debug).
//! - `off` after destruction reports [`EmitterGone`]; bulk unbind paths
//!   suppress it.

use std::cell::{Cell, RefCell};

use ahash::AHashMap;
use serde_json::Value;

use trellis_core::{
    ComponentId, DESTROY_EVENT, Emitter, EmitterGone, EmitterId, Event, Handler, WeakHandler,
};

struct Listener {
    handler: WeakHandler,
    owner: ComponentId,
}

/// A single-threaded, weakly subscribed event channel.
///
/// Used as `Rc<EventChannel>` when bound directly; [`Model`],
/// [`Collection`], and [`Mediator`] embed one and delegate their
/// [`Emitter`] impls to it.
///
/// [`Model`]: crate::model::Model
/// [`Collection`]: crate::collection::Collection
/// [`Mediator`]: crate::mediator::Mediator
pub struct EventChannel {
    id: EmitterId,
    destroyed: Cell<bool>,
    destroying: Cell<bool>,
    listeners: RefCell<AHashMap<String, Vec<Listener>>>,
}

impl EventChannel {
    /// Create a fresh channel with a new emitter identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: EmitterId::next(),
            destroyed: Cell::new(false),
            destroying: Cell::new(false),
            listeners: RefCell::new(AHashMap::new()),
        }
    }

    /// Publish `event` to every live listener, in registration order.
    ///
    /// No-op after destruction.
    pub fn emit(&self, event: &str, payload: &Value) {
        if self.destroyed.get() {
            return;
        }
        // Prune dead weaks and snapshot the survivors before invoking, so
        // handlers may mutate the listener table re-entrantly.
        let snapshot: Vec<Handler> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(list) = listeners.get_mut(event) else {
                return;
            };
            list.retain(|l| l.handler.upgrade().is_some());
            list.iter().filter_map(|l| l.handler.upgrade()).collect()
        };
        if snapshot.is_empty() {
            return;
        }
        let ev = Event::new(event, payload.clone());
        for handler in snapshot {
            handler.call(&ev);
        }
    }

    /// Publish the `destroy` event, then drop every listener and mark the
    /// channel destroyed. Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.get() || self.destroying.get() {
            return;
        }
        self.destroying.set(true);
        self.emit(DESTROY_EVENT, &Value::Null);
        self.destroyed.set(true);
        self.listeners.borrow_mut().clear();
        tracing::debug!(emitter = %self.id, "channel destroyed");
    }

    /// Number of live listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .get(event)
            .map_or(0, |list| {
                list.iter().filter(|l| l.handler.upgrade().is_some()).count()
            })
    }

    /// Number of live listeners across all events.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.listeners
            .borrow()
            .values()
            .flatten()
            .filter(|l| l.handler.upgrade().is_some())
            .count()
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("id", &self.id)
            .field("destroyed", &self.destroyed.get())
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

impl Emitter for EventChannel {
    fn emitter_id(&self) -> EmitterId {
        self.id
    }

    fn on(&self, event: &str, handler: &Handler, owner: ComponentId) {
        if self.destroyed.get() {
            tracing::debug!(emitter = %self.id, event, "listener ignored: channel destroyed");
            return;
        }
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(Listener {
                handler: handler.downgrade(),
                owner,
            });
    }

    fn off(&self, event: &str, handler: &Handler) -> Result<(), EmitterGone> {
        if self.destroyed.get() {
            return Err(EmitterGone);
        }
        let mut listeners = self.listeners.borrow_mut();
        if let Some(list) = listeners.get_mut(event) {
            if let Some(pos) = list.iter().position(|l| l.handler.points_to(handler)) {
                list.remove(pos);
            }
        }
        Ok(())
    }

    fn off_owner(&self, owner: ComponentId) {
        if self.destroyed.get() {
            return;
        }
        let mut listeners = self.listeners.borrow_mut();
        for list in listeners.values_mut() {
            list.retain(|l| l.owner != owner);
        }
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}
