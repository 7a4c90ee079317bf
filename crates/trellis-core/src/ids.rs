#![forbid(unsafe_code)]

//! Process-unique identifiers for components and emitters.
//!
//! Ids are allocated from process-wide atomic counters and are never
//! reused. They exist for logging, equality, and registry keys only —
//! nothing dereferences an id.

use std::sync::atomic::{AtomicU64, Ordering};

static COMPONENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static EMITTER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a component (view) instance.
///
/// Also used as the *owner* tag on emitter subscriptions, so a mediator
/// can drop everything a component registered in one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Allocate the next unique component id.
    #[must_use]
    pub fn next() -> Self {
        Self(COMPONENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Unique identifier for an emitter instance.
///
/// Binding registries key their triples on this rather than on the
/// emitter pointer, so a registry entry stays identifiable even after
/// the emitter itself has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(u64);

impl EmitterId {
    /// Allocate the next unique emitter id.
    #[must_use]
    pub fn next() -> Self {
        Self(EMITTER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "emitter#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_ids_are_unique() {
        let a = ComponentId::next();
        let b = ComponentId::next();
        let c = ComponentId::next();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn emitter_ids_are_unique_and_ordered() {
        let a = EmitterId::next();
        let b = EmitterId::next();
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn display_formats() {
        let v = ComponentId::next();
        let e = EmitterId::next();
        assert!(v.to_string().starts_with("view#"));
        assert!(e.to_string().starts_with("emitter#"));
    }
}
