#![forbid(unsafe_code)]

//! The DOM/container adapter interface.
//!
//! Element mechanics — how markup becomes elements, how selectors match,
//! how containers splice — live behind this trait. The core only holds
//! opaque [`ElementRef`] handles and the [`ListenerToken`]s it needs to
//! remove delegated handlers on disposal.
//!
//! # Failure Modes
//!
//! - `insert` is the one fallible operation (a container target may not
//!   exist); everything else is best-effort on the adapter side.
//! - `query` returning `None` is not an error: one-way bindings simply
//!   skip a write when the target element does not exist yet.

use crate::error::ViewError;
use crate::event::Handler;

/// Opaque handle to an adapter-owned element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(u64);

impl ElementRef {
    /// Wrap a raw adapter-assigned element id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw adapter-assigned id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque handle to a registered element listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

impl ListenerToken {
    /// Wrap a raw adapter-assigned listener id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw adapter-assigned id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// How a root element is spliced into its container.
///
/// String-identified open set: the named modes cover the common cases,
/// `Custom` carries anything adapter-specific through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertMode {
    /// Append as the container's last child.
    Append,
    /// Insert as the container's first child.
    Prepend,
    /// Insert before the container target.
    Before,
    /// Insert after the container target.
    After,
    /// Replace the container target's content.
    Replace,
    /// Adapter-defined mode.
    Custom(String),
}

impl InsertMode {
    /// The wire name of this mode.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Before => "before",
            Self::After => "after",
            Self::Replace => "replace",
            Self::Custom(name) => name,
        }
    }

    /// Parse a wire name back into a mode. Unknown names become `Custom`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "append" => Self::Append,
            "prepend" => Self::Prepend,
            "before" => Self::Before,
            "after" => Self::After,
            "replace" => Self::Replace,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl Default for InsertMode {
    fn default() -> Self {
        Self::Append
    }
}

impl std::fmt::Display for InsertMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a view's root element is synthesized before markup is applied.
#[derive(Debug, Clone)]
pub struct RootSpec {
    /// Tag name of the root element.
    pub tag: String,
    /// Optional element id attribute.
    pub id: Option<String>,
    /// Class list applied to the root.
    pub classes: Vec<String>,
}

impl RootSpec {
    /// A root spec with the given tag and no id/classes.
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
        }
    }

    /// Set the element id attribute.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class to the root's class list.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }
}

impl Default for RootSpec {
    fn default() -> Self {
        Self::tag("div")
    }
}

/// External DOM/container mechanics, consumed as `Rc<dyn DomAdapter>`.
pub trait DomAdapter {
    /// Materialize a root element from a spec and rendered markup.
    fn create_root(&self, spec: &RootSpec, markup: &str) -> ElementRef;

    /// Refresh an existing root's content with newly rendered markup.
    fn update_root(&self, root: ElementRef, markup: &str);

    /// Splice `root` into the container identified by `container`.
    ///
    /// # Errors
    ///
    /// [`ViewError::Adapter`] when the container target cannot be
    /// resolved or the mode is unsupported.
    fn insert(
        &self,
        root: ElementRef,
        container: &str,
        mode: &InsertMode,
    ) -> Result<(), ViewError>;

    /// Resolve `selector` against the subtree under `root`.
    fn query(&self, root: ElementRef, selector: &str) -> Option<ElementRef>;

    /// Whether the element takes its display value through a value
    /// property (form controls) rather than text content.
    fn is_form_control(&self, element: ElementRef) -> bool;

    /// Write a form control's value property.
    fn set_value(&self, element: ElementRef, value: &str);

    /// Write an element's text content.
    fn set_text(&self, element: ElementRef, text: &str);

    /// Register a handler against `root`, scoped to descendants matching
    /// `selector` when given (event delegation), unscoped otherwise.
    fn add_listener(
        &self,
        root: ElementRef,
        event: &str,
        selector: Option<&str>,
        handler: &Handler,
    ) -> ListenerToken;

    /// Remove a previously registered listener. Unknown tokens are a
    /// no-op.
    fn remove_listener(&self, token: ListenerToken);

    /// Release a root element and everything under it.
    fn detach(&self, root: ElementRef);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_mode_names_round_trip() {
        for mode in [
            InsertMode::Append,
            InsertMode::Prepend,
            InsertMode::Before,
            InsertMode::After,
            InsertMode::Replace,
        ] {
            assert_eq!(InsertMode::from_name(mode.as_str()), mode);
        }
    }

    #[test]
    fn unknown_mode_becomes_custom() {
        let mode = InsertMode::from_name("swap-morph");
        assert_eq!(mode, InsertMode::Custom("swap-morph".into()));
        assert_eq!(mode.as_str(), "swap-morph");
    }

    #[test]
    fn default_mode_is_append() {
        assert_eq!(InsertMode::default(), InsertMode::Append);
    }

    #[test]
    fn root_spec_builder() {
        let spec = RootSpec::tag("section").id("sidebar").class("pane").class("left");
        assert_eq!(spec.tag, "section");
        assert_eq!(spec.id.as_deref(), Some("sidebar"));
        assert_eq!(spec.classes, vec!["pane", "left"]);
    }

    #[test]
    fn default_root_is_div() {
        let spec = RootSpec::default();
        assert_eq!(spec.tag, "div");
        assert!(spec.id.is_none());
        assert!(spec.classes.is_empty());
    }
}
