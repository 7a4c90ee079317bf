#![forbid(unsafe_code)]

//! Delegated element handlers.
//!
//! A delegation is an `(event, selector, handler)` triple recorded
//! against the view, applied to whatever root element currently exists.
//! Recording and applying are separate on purpose: a triple registered
//! before the first render is applied when the root appears, and every
//! re-render re-applies all triples against the fresh root.
//!
//! # Invariants
//!
//! 1. Delegating an identical triple first removes the prior
//!    registration (idempotence, mirroring the binding registry).
//! 2. `undelegate_all` runs unconditionally during disposal, removes
//!    every adapter-side listener, empties the table, and closes the
//!    delegator.
//! 3. Triples survive re-render; adapter listener tokens do not.

use std::rc::Rc;

use trellis_core::{ComponentId, DomAdapter, ElementRef, Handler, ListenerToken, ViewError};

struct Delegation {
    event: String,
    selector: Option<String>,
    handler: Handler,
    token: Option<ListenerToken>,
}

impl Delegation {
    fn matches(&self, event: &str, selector: Option<&str>, handler: &Handler) -> bool {
        self.event == event
            && self.selector.as_deref() == selector
            && self.handler.ptr_eq(handler)
    }
}

/// Table of a view's delegated element handlers.
pub struct EventDelegator {
    owner: ComponentId,
    entries: Vec<Delegation>,
    closed: bool,
}

impl EventDelegator {
    /// An open, empty delegator owned by `owner`.
    #[must_use]
    pub fn new(owner: ComponentId) -> Self {
        Self {
            owner,
            entries: Vec::new(),
            closed: false,
        }
    }

    /// Record a delegation and, when a root exists, register it with the
    /// adapter. An identical prior triple is removed first.
    ///
    /// # Errors
    ///
    /// [`ViewError::Disposed`] once the delegator has been closed by
    /// disposal.
    pub fn delegate(
        &mut self,
        dom: Option<&Rc<dyn DomAdapter>>,
        root: Option<ElementRef>,
        event: &str,
        selector: Option<&str>,
        handler: Handler,
    ) -> Result<(), ViewError> {
        if self.closed {
            return Err(ViewError::Disposed { id: self.owner });
        }
        self.undelegate(dom, event, selector, &handler);
        let token = match (dom, root) {
            (Some(dom), Some(root)) => Some(dom.add_listener(root, event, selector, &handler)),
            _ => None,
        };
        self.entries.push(Delegation {
            event: event.to_string(),
            selector: selector.map(str::to_string),
            handler,
            token,
        });
        Ok(())
    }

    /// Remove one delegation from the table and, if applied, from the
    /// adapter. No-op when the triple was never delegated.
    pub fn undelegate(
        &mut self,
        dom: Option<&Rc<dyn DomAdapter>>,
        event: &str,
        selector: Option<&str>,
        handler: &Handler,
    ) {
        let Some(pos) = self
            .entries
            .iter()
            .position(|d| d.matches(event, selector, handler))
        else {
            return;
        };
        let entry = self.entries.remove(pos);
        if let (Some(dom), Some(token)) = (dom, entry.token) {
            dom.remove_listener(token);
        }
    }

    /// Remove every delegation and close the delegator. Idempotent.
    pub fn undelegate_all(&mut self, dom: Option<&Rc<dyn DomAdapter>>) {
        for entry in self.entries.drain(..) {
            if let (Some(dom), Some(token)) = (dom, entry.token) {
                dom.remove_listener(token);
            }
        }
        self.closed = true;
    }

    /// Re-register every recorded triple against `root`, dropping any
    /// stale tokens from the previous root. Called after each render.
    pub fn reapply(&mut self, dom: &Rc<dyn DomAdapter>, root: ElementRef) {
        for entry in &mut self.entries {
            if let Some(stale) = entry.token.take() {
                dom.remove_listener(stale);
            }
            entry.token = Some(dom.add_listener(
                root,
                &entry.event,
                entry.selector.as_deref(),
                &entry.handler,
            ));
        }
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

    /// Whether the delegator has been closed by disposal.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl std::fmt::Debug for EventDelegator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDelegator")
            .field("owner", &self.owner)
            .field("entries", &self.entries.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use trellis_harness::MemoryDom;

    use super::*;

    fn dom() -> (Rc<dyn DomAdapter>, Rc<MemoryDom>) {
        let mem = Rc::new(MemoryDom::new());
        (Rc::clone(&mem) as Rc<dyn DomAdapter>, mem)
    }

    fn handler() -> Handler {
        Handler::new(|_| {})
    }

    #[test]
    fn delegate_without_root_records_only() {
        let mut delegator = EventDelegator::new(ComponentId::next());
        delegator
            .delegate(None, None, "click", Some("button"), handler())
            .unwrap();
        assert_eq!(delegator.len(), 1);
    }

    #[test]
    fn delegate_with_root_registers_listener() {
        let (dom_dyn, mem) = dom();
        let root = mem.create_root(&trellis_core::RootSpec::default(), "");
        let mut delegator = EventDelegator::new(ComponentId::next());

        delegator
            .delegate(Some(&dom_dyn), Some(root), "click", None, handler())
            .unwrap();
        assert_eq!(mem.listener_count(root), 1);
    }

    #[test]
    fn identical_triple_replaces_prior() {
        let (dom_dyn, mem) = dom();
        let root = mem.create_root(&trellis_core::RootSpec::default(), "");
        let mut delegator = EventDelegator::new(ComponentId::next());
        let h = handler();

        delegator
            .delegate(Some(&dom_dyn), Some(root), "click", Some("a"), h.clone())
            .unwrap();
        delegator
            .delegate(Some(&dom_dyn), Some(root), "click", Some("a"), h)
            .unwrap();
        assert_eq!(delegator.len(), 1);
        assert_eq!(mem.listener_count(root), 1);
    }

    #[test]
    fn selector_distinguishes_triples() {
        let mut delegator = EventDelegator::new(ComponentId::next());
        let h = handler();
        delegator
            .delegate(None, None, "click", Some("a"), h.clone())
            .unwrap();
        delegator.delegate(None, None, "click", None, h).unwrap();
        assert_eq!(delegator.len(), 2);
    }

    #[test]
    fn undelegate_removes_listener() {
        let (dom_dyn, mem) = dom();
        let root = mem.create_root(&trellis_core::RootSpec::default(), "");
        let mut delegator = EventDelegator::new(ComponentId::next());
        let h = handler();

        delegator
            .delegate(Some(&dom_dyn), Some(root), "click", None, h.clone())
            .unwrap();
        delegator.undelegate(Some(&dom_dyn), "click", None, &h);
        assert!(delegator.is_empty());
        assert_eq!(mem.listener_count(root), 0);
    }

    #[test]
    fn undelegate_all_clears_and_closes() {
        let (dom_dyn, mem) = dom();
        let root = mem.create_root(&trellis_core::RootSpec::default(), "");
        let mut delegator = EventDelegator::new(ComponentId::next());

        delegator
            .delegate(Some(&dom_dyn), Some(root), "click", None, handler())
            .unwrap();
        delegator
            .delegate(Some(&dom_dyn), Some(root), "input", Some("input"), handler())
            .unwrap();
        delegator.undelegate_all(Some(&dom_dyn));

        assert!(delegator.is_empty());
        assert!(delegator.is_closed());
        assert_eq!(mem.listener_count(root), 0);

        let err = delegator
            .delegate(None, None, "click", None, handler())
            .unwrap_err();
        assert!(matches!(err, ViewError::Disposed { .. }));
    }

    #[test]
    fn reapply_moves_listeners_to_new_root() {
        let (dom_dyn, mem) = dom();
        let old_root = mem.create_root(&trellis_core::RootSpec::default(), "");
        let mut delegator = EventDelegator::new(ComponentId::next());

        delegator
            .delegate(Some(&dom_dyn), Some(old_root), "click", None, handler())
            .unwrap();
        assert_eq!(mem.listener_count(old_root), 1);

        let new_root = mem.create_root(&trellis_core::RootSpec::default(), "");
        delegator.reapply(&dom_dyn, new_root);
        assert_eq!(mem.listener_count(old_root), 0);
        assert_eq!(mem.listener_count(new_root), 1);
    }

    #[test]
    fn reapply_applies_pre_render_recordings() {
        let (dom_dyn, mem) = dom();
        let mut delegator = EventDelegator::new(ComponentId::next());

        delegator
            .delegate(None, None, "click", Some("button"), handler())
            .unwrap();
        let root = mem.create_root(&trellis_core::RootSpec::default(), "");
        delegator.reapply(&dom_dyn, root);
        assert_eq!(mem.listener_count(root), 1);
    }
}
