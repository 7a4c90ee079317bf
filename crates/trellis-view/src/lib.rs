#![forbid(unsafe_code)]

//! Disposal-safe view lifecycle and binding management.
//!
//! A [`View`] is a node in a UI tree. It owns named subviews, binds to
//! external emitters (models, collections, the pub/sub mediator), and
//! delegates events against its root element. Disposing a view — directly
//! or by cascade from an ancestor or a bound model's destruction — tears
//! all of that down exactly once, in a fixed order, and further
//! lifecycle or binding operations fail fast.
//!
//! # Architecture
//!
//! - [`LifecycleController`]: the per-view state machine
//!   (constructed → initializing → initialized → rendered → disposing →
//!   disposed) plus stage guards for re-entrancy.
//! - [`BindingRegistry`]: the table of `(emitter, event, handler)`
//!   triples a view holds. The registry owns the only strong handler
//!   references; emitters see weak ones.
//! - [`SubviewTree`]: named, insertion-ordered child ownership with
//!   replace-by-default attach and best-effort cascading disposal.
//! - [`EventDelegator`]: `(event, selector, handler)` triples applied
//!   against the root element and re-applied after each render.
//! - One-way binding (`View::pass`): model attribute → element sync,
//!   built on the registry.
//!
//! Hook ordering is a fixed template method: user-overridable steps live
//! on [`ViewBehavior`] and the guaranteed pre/post stages run around
//! them unconditionally — there is no super-call convention to forget.

pub mod binder;
pub mod bindings;
pub mod config;
pub mod delegate;
pub mod lifecycle;
pub mod subviews;
pub mod view;

pub use bindings::BindingRegistry;
pub use config::ViewConfig;
pub use delegate::EventDelegator;
pub use lifecycle::{LifecycleController, Stage};
pub use subviews::SubviewTree;
pub use view::{View, ViewBehavior, WeakView};
