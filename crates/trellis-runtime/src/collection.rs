#![forbid(unsafe_code)]

//! Ordered model collection.
//!
//! A thin ordered list of shared models over an [`EventChannel`]:
//! `add` / `remove` carry the affected index, `reset` carries the new
//! length, and `destroy` cascades exactly like a model's.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use trellis_core::{ComponentId, Emitter, EmitterGone, EmitterId, Handler};

use crate::channel::EventChannel;
use crate::model::Model;

/// Ordered list of `Rc<Model>` with add/remove/reset/destroy events.
#[derive(Debug, Default)]
pub struct Collection {
    models: RefCell<Vec<Rc<Model>>>,
    events: EventChannel,
}

impl Collection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a model; emits `add` with the new index. Ignored after
    /// destruction.
    pub fn add(&self, model: Rc<Model>) {
        if self.events.is_destroyed() {
            tracing::debug!("add ignored: collection destroyed");
            return;
        }
        let index = {
            let mut models = self.models.borrow_mut();
            models.push(model);
            models.len() - 1
        };
        self.events.emit("add", &json!(index));
    }

    /// Remove a model by identity; emits `remove` with its old index.
    pub fn remove(&self, model: &Rc<Model>) -> Option<Rc<Model>> {
        if self.events.is_destroyed() {
            return None;
        }
        let removed = {
            let mut models = self.models.borrow_mut();
            let pos = models.iter().position(|m| Rc::ptr_eq(m, model))?;
            Some((pos, models.remove(pos)))
        };
        removed.map(|(pos, model)| {
            self.events.emit("remove", &json!(pos));
            model
        })
    }

    /// Replace the entire contents; emits `reset` with the new length.
    pub fn reset(&self, models: Vec<Rc<Model>>) {
        if self.events.is_destroyed() {
            return;
        }
        let len = models.len();
        *self.models.borrow_mut() = models;
        self.events.emit("reset", &json!(len));
    }

    /// The model at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Rc<Model>> {
        self.models.borrow().get(index).cloned()
    }

    /// Number of models held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.borrow().len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.borrow().is_empty()
    }

    /// Publish `destroy` and mark the collection unusable. Idempotent.
    pub fn destroy(&self) {
        self.events.destroy();
    }
}

impl Emitter for Collection {
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
