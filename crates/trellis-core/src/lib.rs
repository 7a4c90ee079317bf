#![forbid(unsafe_code)]

//! Protocol types for Trellis.
//!
//! This crate holds everything the rest of the workspace agrees on:
//!
//! - [`Event`] and [`Handler`]: named events with JSON payloads, and
//!   identity-carrying handler wrappers. Emitters store handlers weakly;
//!   the strong side always lives in a component's binding registry.
//! - [`Emitter`]: the protocol any bindable object (model, collection,
//!   bus) implements, including the well-known [`DESTROY_EVENT`] it must
//!   emit before becoming unusable.
//! - [`ViewState`]: the monotonic six-state component lifecycle.
//! - [`ViewError`] / [`DisposalReport`]: the error taxonomy and the
//!   best-effort aggregate used by cascading disposal.
//! - [`TemplateProvider`] and [`DomAdapter`]: the narrow interfaces behind
//!   which templating and DOM mechanics stay external concerns.

pub mod dom;
pub mod emitter;
pub mod error;
pub mod event;
pub mod ids;
pub mod state;
pub mod template;

pub use dom::{DomAdapter, ElementRef, InsertMode, ListenerToken, RootSpec};
pub use emitter::Emitter;
pub use error::{DisposalReport, EmitterGone, ViewError};
pub use event::{CHANGE_EVENT, DESTROY_EVENT, Event, Handler, WeakHandler, change_event};
pub use ids::{ComponentId, EmitterId};
pub use state::ViewState;
pub use template::{CompiledTemplate, TemplateData, TemplateProvider};
