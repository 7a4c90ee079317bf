#![forbid(unsafe_code)]

//! In-memory DOM adapter.
//!
//! Elements are plain records in a table; tests fabricate the subtree
//! they need with [`ElementBuilder`] instead of parsing markup (markup
//! strings are stored verbatim on the root for assertions). Selector
//! support is a deliberately tiny subset — `tag`, `#id`, `.class`,
//! `tag[attr=value]` — because real selector matching is the production
//! adapter's concern, not this crate's.
//!
//! Listener bookkeeping mirrors what disposal tests need to observe:
//! every `add_listener` yields a token, `remove_listener` retires it,
//! and [`listener_count`](MemoryDom::listener_count) counts what is
//! still registered against a root. [`fire`](MemoryDom::fire) simulates
//! an event reaching the root, invoking unscoped listeners always and
//! scoped listeners only when the origin element matches their selector.
//!
//! `update_root` refreshes the stored markup but keeps fabricated
//! children, so a re-render does not wipe the subtree a test built.

use std::cell::RefCell;

use ahash::AHashMap;
use serde_json::Value;

use trellis_core::{
    DomAdapter, ElementRef, Event, Handler, InsertMode, ListenerToken, RootSpec, ViewError,
};

/// One element's record, snapshot-cloned out for assertions.
#[derive(Debug, Clone)]
pub struct ElementRecord {
    /// Tag name.
    pub tag: String,
    /// `id` attribute.
    pub id: Option<String>,
    /// Class list.
    pub classes: Vec<String>,
    /// Other attributes.
    pub attrs: AHashMap<String, String>,
    /// Form-control value property.
    pub value: String,
    /// Text content.
    pub text: String,
    /// Whether the element takes writes through `value`.
    pub form_control: bool,
    /// Rendered markup (roots only).
    pub markup: String,
    /// Child element ids, in insertion order.
    pub children: Vec<ElementRef>,
}

/// Builder for fabricated elements.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    record: ElementRecord,
}

impl ElementBuilder {
    /// Start an element with `tag`. `input`, `textarea`, and `select`
    /// are form controls automatically.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let form_control = matches!(tag.as_str(), "input" | "textarea" | "select");
        Self {
            record: ElementRecord {
                tag,
                id: None,
                classes: Vec::new(),
                attrs: AHashMap::new(),
                value: String::new(),
                text: String::new(),
                form_control,
                markup: String::new(),
                children: Vec::new(),
            },
        }
    }

    /// Set the `id` attribute.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.record.id = Some(id.into());
        self
    }

    /// Add a class.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.record.classes.push(class.into());
        self
    }

    /// Set an attribute (e.g. `name`).
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.attrs.insert(key.into(), value.into());
        self
    }

    /// Set initial text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.record.text = text.into();
        self
    }

    /// Override form-control detection.
    #[must_use]
    pub fn form_control(mut self, yes: bool) -> Self {
        self.record.form_control = yes;
        self
    }
}

/// A recorded container insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// The inserted root.
    pub root: ElementRef,
    /// Container target string.
    pub container: String,
    /// Insert mode wire name.
    pub mode: String,
}

struct ListenerRecord {
    token: ListenerToken,
    root: ElementRef,
    event: String,
    selector: Option<String>,
    handler: Handler,
}

#[derive(Default)]
struct DomState {
    elements: AHashMap<u64, ElementRecord>,
    next_element: u64,
    next_token: u64,
    listeners: Vec<ListenerRecord>,
    insertions: Vec<Insertion>,
    detached: Vec<ElementRef>,
}

/// In-memory [`DomAdapter`] implementation.
#[derive(Default)]
pub struct MemoryDom {
    state: RefCell<DomState>,
}

impl MemoryDom {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fabricate a child element under `parent`.
    pub fn add_child(&self, parent: ElementRef, builder: ElementBuilder) -> ElementRef {
        let mut state = self.state.borrow_mut();
        state.next_element += 1;
        let el = ElementRef::new(state.next_element);
        state.elements.insert(el.raw(), builder.record);
        if let Some(parent_record) = state.elements.get_mut(&parent.raw()) {
            parent_record.children.push(el);
        }
        el
    }

    /// Snapshot an element's record.
    #[must_use]
    pub fn element(&self, el: ElementRef) -> Option<ElementRecord> {
        self.state.borrow().elements.get(&el.raw()).cloned()
    }

    /// An element's current form value.
    #[must_use]
    pub fn value_of(&self, el: ElementRef) -> Option<String> {
        self.element(el).map(|record| record.value)
    }

    /// An element's current text content.
    #[must_use]
    pub fn text_of(&self, el: ElementRef) -> Option<String> {
        self.element(el).map(|record| record.text)
    }

    /// A root's most recently applied markup.
    #[must_use]
    pub fn markup_of(&self, root: ElementRef) -> Option<String> {
        self.element(root).map(|record| record.markup)
    }

    /// All recorded container insertions, in order.
    #[must_use]
    pub fn insertions(&self) -> Vec<Insertion> {
        self.state.borrow().insertions.clone()
    }

    /// Roots released via `detach`, in order.
    #[must_use]
    pub fn detached(&self) -> Vec<ElementRef> {
        self.state.borrow().detached.clone()
    }

    /// Listeners currently registered against `root`.
    #[must_use]
    pub fn listener_count(&self, root: ElementRef) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.root == root)
            .count()
    }

    /// Listeners currently registered, across all roots.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Simulate `event` reaching `root` from `origin`, invoking matching
    /// listeners. Unscoped listeners always fire; scoped listeners fire
    /// only when `origin` matches their selector. Returns how many fired.
    pub fn fire(
        &self,
        root: ElementRef,
        event: &str,
        origin: Option<ElementRef>,
        payload: &Value,
    ) -> usize {
        // Snapshot so handlers may delegate/undelegate re-entrantly.
        let matching: Vec<Handler> = {
            let state = self.state.borrow();
            state
                .listeners
                .iter()
                .filter(|l| l.root == root && l.event == event)
                .filter(|l| match (&l.selector, origin) {
                    (None, _) => true,
                    (Some(selector), Some(origin)) => state
                        .elements
                        .get(&origin.raw())
                        .is_some_and(|record| matches_selector(record, selector)),
                    (Some(_), None) => false,
                })
                .map(|l| l.handler.clone())
                .collect()
        };
        let ev = Event::new(event, payload.clone());
        for handler in &matching {
            handler.call(&ev);
        }
        matching.len()
    }
}

impl std::fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryDom")
            .field("elements", &state.elements.len())
            .field("listeners", &state.listeners.len())
            .field("insertions", &state.insertions.len())
            .finish()
    }
}

impl DomAdapter for MemoryDom {
    fn create_root(&self, spec: &RootSpec, markup: &str) -> ElementRef {
        let mut state = self.state.borrow_mut();
        state.next_element += 1;
        let el = ElementRef::new(state.next_element);
        state.elements.insert(
            el.raw(),
            ElementRecord {
                tag: spec.tag.clone(),
                id: spec.id.clone(),
                classes: spec.classes.clone(),
                attrs: AHashMap::new(),
                value: String::new(),
                text: String::new(),
                form_control: false,
                markup: markup.to_string(),
                children: Vec::new(),
            },
        );
        el
    }

    fn update_root(&self, root: ElementRef, markup: &str) {
        if let Some(record) = self.state.borrow_mut().elements.get_mut(&root.raw()) {
            record.markup = markup.to_string();
        }
    }

    fn insert(
        &self,
        root: ElementRef,
        container: &str,
        mode: &InsertMode,
    ) -> Result<(), ViewError> {
        if container.is_empty() {
            return Err(ViewError::Adapter {
                message: "empty container target".into(),
            });
        }
        self.state.borrow_mut().insertions.push(Insertion {
            root,
            container: container.to_string(),
            mode: mode.as_str().to_string(),
        });
        Ok(())
    }

    fn query(&self, root: ElementRef, selector: &str) -> Option<ElementRef> {
        let state = self.state.borrow();
        // Breadth-first over descendants; the root itself is not a
        // candidate, matching how views query within their own element.
        let mut queue: Vec<ElementRef> = state
            .elements
            .get(&root.raw())
            .map(|record| record.children.clone())?;
        let mut cursor = 0;
        while cursor < queue.len() {
            let el = queue[cursor];
            cursor += 1;
            if let Some(record) = state.elements.get(&el.raw()) {
                if matches_selector(record, selector) {
                    return Some(el);
                }
                queue.extend(record.children.iter().copied());
            }
        }
        None
    }

    fn is_form_control(&self, element: ElementRef) -> bool {
        self.state
            .borrow()
            .elements
            .get(&element.raw())
            .is_some_and(|record| record.form_control)
    }

    fn set_value(&self, element: ElementRef, value: &str) {
        if let Some(record) = self.state.borrow_mut().elements.get_mut(&element.raw()) {
            record.value = value.to_string();
        }
    }

    fn set_text(&self, element: ElementRef, text: &str) {
        if let Some(record) = self.state.borrow_mut().elements.get_mut(&element.raw()) {
            record.text = text.to_string();
        }
    }

    fn add_listener(
        &self,
        root: ElementRef,
        event: &str,
        selector: Option<&str>,
        handler: &Handler,
    ) -> ListenerToken {
        let mut state = self.state.borrow_mut();
        state.next_token += 1;
        let token = ListenerToken::new(state.next_token);
        state.listeners.push(ListenerRecord {
            token,
            root,
            event: event.to_string(),
            selector: selector.map(str::to_string),
            handler: handler.clone(),
        });
        token
    }

    fn remove_listener(&self, token: ListenerToken) {
        self.state.borrow_mut().listeners.retain(|l| l.token != token);
    }

    fn detach(&self, root: ElementRef) {
        let mut state = self.state.borrow_mut();
        // Drop the subtree.
        let mut queue = vec![root];
        let mut cursor = 0;
        while cursor < queue.len() {
            let el = queue[cursor];
            cursor += 1;
            if let Some(record) = state.elements.remove(&el.raw()) {
                queue.extend(record.children);
            }
        }
        state.listeners.retain(|l| l.root != root);
        state.detached.push(root);
    }
}

/// Match the supported selector subset against one element.
///
/// Supported forms: `#id`, `.class`, `tag`, `tag[attr=value]`.
fn matches_selector(record: &ElementRecord, selector: &str) -> bool {
    if let Some(id) = selector.strip_prefix('#') {
        return record.id.as_deref() == Some(id);
    }
    if let Some(class) = selector.strip_prefix('.') {
        return record.classes.iter().any(|c| c == class);
    }
    if let Some((tag, rest)) = selector.split_once('[') {
        let Some(pair) = rest.strip_suffix(']') else {
            return false;
        };
        let Some((key, value)) = pair.split_once('=') else {
            return false;
        };
        let value = value.trim_matches('"').trim_matches('\'');
        return record.tag == tag && record.attrs.get(key).map(String::as_str) == Some(value);
    }
    record.tag == selector
}
