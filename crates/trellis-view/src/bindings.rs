#![forbid(unsafe_code)]

//! The per-view binding registry.
//!
//! Every subscription a view holds against an external emitter is
//! recorded here as an `(emitter, event, handler)` triple. The registry
//! owns the only *strong* handler references — emitters store weak ones —
//! so dropping an entry silences the handler even when the emitter can no
//! longer be told.
//!
//! # Invariants
//!
//! 1. No triple is registered twice: `bind` first unbinds an identical
//!    registration, so rebinding yields exactly one live subscription.
//! 2. `unbind_all` is best-effort and total: a dead or destroyed emitter
//!    is logged and skipped, never allowed to abort the remaining
//!    unbinds. The table is empty afterwards.
//! 3. Once closed (by disposal), `bind` fails with
//!    [`ViewError::Disposed`]; `unbind`/`unbind_all` stay idempotent
//!    no-ops.

use std::rc::{Rc, Weak};

use trellis_core::{ComponentId, Emitter, EmitterId, Handler, ViewError};

struct BindingEntry {
    emitter: Weak<dyn Emitter>,
    emitter_id: EmitterId,
    event: String,
    handler: Handler,
}

/// Insertion-ordered table of a view's emitter subscriptions.
pub struct BindingRegistry {
    owner: ComponentId,
    entries: Vec<BindingEntry>,
    closed: bool,
}

impl BindingRegistry {
    /// An open, empty registry owned by `owner`.
    #[must_use]
    pub fn new(owner: ComponentId) -> Self {
        Self {
            owner,
            entries: Vec::new(),
            closed: false,
        }
    }

    /// Register `handler` for `event` on `emitter` and record the triple.
    ///
    /// An identical prior registration is unbound first, so binding the
    /// same triple twice leaves exactly one live subscription.
    ///
    /// # Errors
    ///
    /// [`ViewError::Disposed`] once the registry has been closed by
    /// disposal.
    pub fn bind(
        &mut self,
        emitter: &Rc<dyn Emitter>,
        event: &str,
        handler: Handler,
    ) -> Result<(), ViewError> {
        if self.closed {
            return Err(ViewError::Disposed { id: self.owner });
        }
        self.unbind(emitter, event, &handler);
        emitter.on(event, &handler, self.owner);
        self.entries.push(BindingEntry {
            emitter: Rc::downgrade(emitter),
            emitter_id: emitter.emitter_id(),
            event: event.to_string(),
            handler,
        });
        Ok(())
    }

    /// Remove one registration from both the emitter and the record.
    /// No-op when the triple was never bound.
    pub fn unbind(&mut self, emitter: &Rc<dyn Emitter>, event: &str, handler: &Handler) {
        let emitter_id = emitter.emitter_id();
        let Some(pos) = self.entries.iter().position(|entry| {
            entry.emitter_id == emitter_id
                && entry.event == event
                && entry.handler.ptr_eq(handler)
        }) else {
            return;
        };
        let entry = self.entries.remove(pos);
        if emitter.off(event, handler).is_err() {
            tracing::debug!(
                owner = %self.owner,
                emitter = %entry.emitter_id,
                event,
                "unbind on destroyed emitter suppressed"
            );
        }
    }

    /// Unbind every recorded triple and close the registry.
    ///
    /// Dead or destroyed emitters are skipped with a debug line; sibling
    /// entries always still get unbound. Idempotent.
    pub fn unbind_all(&mut self) {
        for entry in self.entries.drain(..) {
            match entry.emitter.upgrade() {
                Some(emitter) => {
                    if emitter.off(&entry.event, &entry.handler).is_err() {
                        tracing::debug!(
                            owner = %self.owner,
                            emitter = %entry.emitter_id,
                            event = %entry.event,
                            "unbind on destroyed emitter suppressed"
                        );
                    }
                }
                None => {
                    tracing::debug!(
                        owner = %self.owner,
                        emitter = %entry.emitter_id,
                        event = %entry.event,
                        "emitter dropped before unbind"
                    );
                }
            }
        }
        self.closed = true;
    }

    /// Number of recorded triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no triples are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the registry has been closed by disposal.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("owner", &self.owner)
            .field("entries", &self.entries.len())
            .field("closed", &self.closed)
            .finish()
    }
}
