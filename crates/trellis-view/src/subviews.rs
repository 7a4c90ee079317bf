#![forbid(unsafe_code)]

//! Named subview ownership.
//!
//! The tree is the storage half of subview management: an
//! insertion-ordered list of `(name, view)` entries with unique names.
//! The orchestration half — parent wiring, replace-disposal, cycle
//! checks — lives on [`View`](crate::view::View), which always mutates
//! the tree *outside* any running notification so a child's disposal
//! hooks can still reach the parent without re-entrant borrows.
//!
//! # Invariants
//!
//! 1. Names are unique; a view occurs at most once regardless of name.
//! 2. Iteration and cascading disposal follow insertion order
//!    (deterministic, not contractual).
//! 3. `dispose_all` is best-effort: every child is disposed even when an
//!    earlier sibling's teardown reports errors.

use trellis_core::DisposalReport;

use crate::view::View;

/// Insertion-ordered table of named child views.
#[derive(Default)]
pub struct SubviewTree {
    entries: Vec<(String, View)>,
}

impl SubviewTree {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The subview stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<View> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Whether `child` is stored under any name.
    #[must_use]
    pub fn contains(&self, child: &View) -> bool {
        self.entries.iter().any(|(_, v)| v == child)
    }

    /// Names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Number of subviews.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `child` under `name`, returning the displaced occupant if
    /// the name was taken. The caller decides the displaced view's fate.
    pub(crate) fn insert_replacing(&mut self, name: &str, child: View) -> Option<View> {
        let displaced = self.take_by_name(name);
        self.entries.push((name.to_string(), child));
        displaced
    }

    /// Remove and return the entry stored under `name`.
    pub(crate) fn take_by_name(&mut self, name: &str) -> Option<View> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Remove and return `child` wherever it is stored (identity scan).
    pub(crate) fn take_by_view(&mut self, child: &View) -> Option<View> {
        let pos = self.entries.iter().position(|(_, v)| v == child)?;
        Some(self.entries.remove(pos).1)
    }

    /// Dispose every subview in insertion order, collecting per-child
    /// failures. The tree is empty afterwards.
    pub fn dispose_all(&mut self) -> DisposalReport {
        let mut report = DisposalReport::clean();
        for (_, view) in std::mem::take(&mut self.entries) {
            report.merge(view.dispose());
        }
        report
    }
}

impl std::fmt::Debug for SubviewTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubviewTree")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::ViewState;

    use crate::config::ViewConfig;

    use super::*;

    fn view() -> View {
        View::with_config(ViewConfig::new())
    }

    #[test]
    fn get_and_names_follow_insertion_order() {
        let mut tree = SubviewTree::new();
        let (a, b) = (view(), view());
        tree.insert_replacing("a", a.clone());
        tree.insert_replacing("b", b.clone());

        assert_eq!(tree.names(), vec!["a", "b"]);
        assert_eq!(tree.get("a"), Some(a));
        assert_eq!(tree.get("missing"), None);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn insert_replacing_returns_displaced() {
        let mut tree = SubviewTree::new();
        let (old, new) = (view(), view());
        tree.insert_replacing("slot", old.clone());
        let displaced = tree.insert_replacing("slot", new.clone());

        assert_eq!(displaced, Some(old));
        assert_eq!(tree.get("slot"), Some(new));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn take_by_name_and_view() {
        let mut tree = SubviewTree::new();
        let (a, b) = (view(), view());
        tree.insert_replacing("a", a.clone());
        tree.insert_replacing("b", b.clone());

        assert_eq!(tree.take_by_name("a"), Some(a));
        assert_eq!(tree.take_by_view(&b), Some(b.clone()));
        assert!(tree.is_empty());
        assert_eq!(tree.take_by_view(&b), None);
    }

    #[test]
    fn contains_by_identity() {
        let mut tree = SubviewTree::new();
        let a = view();
        tree.insert_replacing("a", a.clone());
        assert!(tree.contains(&a));
        assert!(!tree.contains(&view()));
    }

    #[test]
    fn dispose_all_disposes_and_empties() {
        let mut tree = SubviewTree::new();
        let (a, b) = (view(), view());
        tree.insert_replacing("a", a.clone());
        tree.insert_replacing("b", b.clone());

        let report = tree.dispose_all();
        assert!(report.is_clean());
        assert!(tree.is_empty());
        assert_eq!(a.state(), ViewState::Disposed);
        assert_eq!(b.state(), ViewState::Disposed);
    }
}
