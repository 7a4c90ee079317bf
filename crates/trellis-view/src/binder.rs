#![forbid(unsafe_code)]

//! One-way model→element binding.
//!
//! `pass(attribute, selector)` keeps one element in sync with one model
//! attribute: every `change:{attribute}` resolves `selector` against the
//! view's current root and writes the new value — into the value property
//! for form controls, into text content otherwise. There is no reverse
//! path.
//!
//! Registration goes through the view's binding registry, so the sync is
//! torn down with everything else on disposal.
//!
//! # Write semantics
//!
//! | Payload | Written text |
//! |---------|--------------|
//! | string  | the string, verbatim |
//! | null    | empty string |
//! | other   | canonical JSON text |
//!
//! A missing root or an unmatched selector at fire time is skipped with a
//! trace line; the element may simply not exist yet, and the next change
//! retries.

use std::rc::Rc;

use serde_json::Value;

use trellis_core::{Emitter, ViewError, change_event};

use crate::view::View;

/// Wire a one-way sync from `attribute` to the element at `selector`.
pub(crate) fn pass(view: &View, attribute: &str, selector: &str) -> Result<(), ViewError> {
    let model = view.model().ok_or(ViewError::MissingModel)?;
    let selector = selector.to_string();
    let handler = view.handler(move |view, event| write_target(view, &selector, &event.payload));
    let emitter: Rc<dyn Emitter> = model;
    view.bind(&emitter, &change_event(attribute), handler)
}

/// Resolve the selector and write the value, skipping quietly when the
/// target cannot be resolved yet.
fn write_target(view: &View, selector: &str, value: &Value) {
    let Some(dom) = view.dom_handle() else {
        tracing::trace!(selector, "one-way write skipped: no dom adapter");
        return;
    };
    let Some(root) = view.root() else {
        tracing::trace!(selector, "one-way write skipped: not rendered");
        return;
    };
    let Some(element) = dom.query(root, selector) else {
        tracing::trace!(selector, "one-way write skipped: no match under root");
        return;
    };
    let text = value_text(value);
    if dom.is_form_control(element) {
        dom.set_value(element, &text);
    } else {
        dom.set_text(element, &text);
    }
}

/// Render a JSON value as the text written into an element.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
