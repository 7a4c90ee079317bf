#![forbid(unsafe_code)]

//! Test collaborators for Trellis.
//!
//! Real template engines and DOM backends live behind the narrow
//! interfaces in `trellis-core`; this crate provides the fakes the
//! workspace tests drive those interfaces with:
//!
//! - [`MemoryDom`]: an in-memory element store implementing
//!   [`DomAdapter`](trellis_core::DomAdapter), with fabricated element
//!   trees, a deliberately tiny selector subset, listener bookkeeping,
//!   and a [`fire`](MemoryDom::fire) method to simulate delegated
//!   events.
//! - [`StubTemplates`]: a `{{key}}`-interpolating
//!   [`TemplateProvider`](trellis_core::TemplateProvider) that counts
//!   compiles, plus [`BrokenTemplates`] for error-path tests.
//! - [`probes`]: counting and recording handlers.

pub mod dom;
pub mod probes;
pub mod templates;

pub use dom::{ElementBuilder, ElementRecord, Insertion, MemoryDom};
pub use probes::{counting_handler, recording_handler};
pub use templates::{BrokenTemplates, StubTemplates};
