#![forbid(unsafe_code)]

//! Attribute-map data model.
//!
//! A `Model` is the external mutable state views bind to: a string-keyed
//! JSON attribute map over an [`EventChannel`]. Setting an attribute to a
//! *different* value emits `change:{attr}` (payload: the new value) and
//! then the coarse `change` event (payload: `{ "attribute", "value" }`).
//! Setting an attribute to its current value emits nothing.
//!
//! Destroying a model publishes `destroy` before it becomes unusable;
//! bound views use that to cascade their own disposal.

use std::cell::RefCell;

use serde_json::{Value, json};

use trellis_core::{
    CHANGE_EVENT, ComponentId, Emitter, EmitterGone, EmitterId, Handler, TemplateData,
    change_event,
};

use crate::channel::EventChannel;

/// String-keyed JSON attribute map with change/destroy events.
///
/// Shared as `Rc<Model>`; views hold it weakly.
#[derive(Debug, Default)]
pub struct Model {
    attrs: RefCell<TemplateData>,
    events: EventChannel,
}

impl Model {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model pre-populated with attributes.
    #[must_use]
    pub fn with_attributes(attrs: TemplateData) -> Self {
        Self {
            attrs: RefCell::new(attrs),
            events: EventChannel::new(),
        }
    }

    /// Set an attribute. Returns whether the value actually changed.
    ///
    /// Emits `change:{attr}` then `change` on a real change; setting the
    /// current value is a no-op. Ignored after destruction.
    pub fn set(&self, attr: &str, value: Value) -> bool {
        if self.events.is_destroyed() {
            tracing::debug!(attr, "set ignored: model destroyed");
            return false;
        }
        let changed = {
            let mut attrs = self.attrs.borrow_mut();
            match attrs.get(attr) {
                Some(current) if *current == value => false,
                _ => {
                    attrs.insert(attr.to_string(), value.clone());
                    true
                }
            }
        };
        if changed {
            self.events.emit(&change_event(attr), &value);
            self.events
                .emit(CHANGE_EVENT, &json!({ "attribute": attr, "value": value }));
        }
        changed
    }

    /// Remove an attribute. Returns whether it was present.
    ///
    /// Emits the same change pair as [`set`](Self::set), with a null
    /// value.
    pub fn unset(&self, attr: &str) -> bool {
        if self.events.is_destroyed() {
            return false;
        }
        let removed = self.attrs.borrow_mut().remove(attr).is_some();
        if removed {
            self.events.emit(&change_event(attr), &Value::Null);
            self.events
                .emit(CHANGE_EVENT, &json!({ "attribute": attr, "value": Value::Null }));
        }
        removed
    }

    /// Read an attribute.
    #[must_use]
    pub fn get(&self, attr: &str) -> Option<Value> {
        self.attrs.borrow().get(attr).cloned()
    }

    /// Snapshot of all attributes — the default template data source.
    #[must_use]
    pub fn attributes(&self) -> TemplateData {
        self.attrs.borrow().clone()
    }

    /// Publish `destroy` and mark the model unusable. Idempotent.
    pub fn destroy(&self) {
        self.events.destroy();
    }

    /// Live listener count for `event`, for leak assertions.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.events.listener_count(event)
    }

    /// Live listener count across all events.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.events.total_listeners()
    }
}

impl Emitter for Model {
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
