#![forbid(unsafe_code)]

//! Concrete emitters for Trellis.
//!
//! - [`EventChannel`]: the single-threaded emitter everything else is
//!   built from — weak listener storage, registration-order notification,
//!   re-entrancy-safe emission, idempotent destruction.
//! - [`Model`] / [`Collection`]: the external mutable state views bind
//!   to, with `change:{attr}` / `add` / `remove` / `reset` events and a
//!   `destroy` cascade.
//! - [`Mediator`]: the pub/sub capability injected into components, with
//!   an owner index so one component's subscriptions can be dropped in a
//!   single sweep, plus a thread-local process handle with explicit
//!   install/teardown so tests run against isolated instances.

pub mod channel;
pub mod collection;
pub mod mediator;
pub mod model;

pub use channel::EventChannel;
pub use collection::Collection;
pub use mediator::{Mediator, MediatorInstallError};
pub use model::Model;
