#![forbid(unsafe_code)]

//! The emitter protocol.
//!
//! Anything a component can bind to — a data model, a collection, the
//! pub/sub mediator — implements [`Emitter`]. The protocol is deliberately
//! narrow and object-safe: binding registries hold `Weak<dyn Emitter>` and
//! never learn the concrete type.
//!
//! # Contract
//!
//! 1. Listeners are stored weakly ([`WeakHandler`]); an emitter never
//!    keeps a component (or its handlers) alive.
//! 2. Listeners fire in registration order.
//! 3. Every emitter publishes [`DESTROY_EVENT`] exactly once before
//!    becoming unusable, so bound views can cascade their own disposal.
//! 4. After destruction, `on` is ignored and `off` reports
//!    [`EmitterGone`] — callers in bulk-teardown paths suppress it.
//!
//! [`WeakHandler`]: crate::event::WeakHandler
//! [`DESTROY_EVENT`]: crate::event::DESTROY_EVENT

use crate::error::EmitterGone;
use crate::event::Handler;
use crate::ids::{ComponentId, EmitterId};

/// Protocol for any object components can subscribe to.
pub trait Emitter {
    /// Stable identity of this emitter, used as a registry key.
    fn emitter_id(&self) -> EmitterId;

    /// Register `handler` for `event`, tagged with the owning component.
    ///
    /// The emitter stores the handler weakly; the caller must keep the
    /// strong side alive (a binding registry does). Registering on a
    /// destroyed emitter is a no-op.
    fn on(&self, event: &str, handler: &Handler, owner: ComponentId);

    /// Remove a previously registered handler for `event`.
    ///
    /// Removing a handler that was never registered is a no-op.
    ///
    /// # Errors
    ///
    /// [`EmitterGone`] if the emitter was already destroyed.
    fn off(&self, event: &str, handler: &Handler) -> Result<(), EmitterGone>;

    /// Remove every handler registered under `owner`, across all events.
    fn off_owner(&self, owner: ComponentId);

    /// Whether this emitter has been destroyed.
    fn is_destroyed(&self) -> bool;
}
