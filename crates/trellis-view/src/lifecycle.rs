#![forbid(unsafe_code)]

//! Per-view lifecycle state machine and stage guards.
//!
//! The controller tracks three things: the [`ViewState`], which stage
//! (if any) is currently running its hook chain, and whether a disposal
//! was requested while a stage was mid-flight.
//!
//! # Invariants
//!
//! 1. State only moves forward ([`ViewState::can_advance_to`]).
//! 2. At most one stage runs at a time per view; nested *different*
//!    stages are legal (auto-render runs inside initialize), re-entering
//!    the *same* stage is the broken-hook-chain error the view layer
//!    reports.
//! 3. A disposal requested while a stage runs is parked, not dropped:
//!    [`take_pending_dispose`](LifecycleController::take_pending_dispose)
//!    hands it back exactly once after the stage unwinds.

use std::cell::Cell;

use trellis_core::{ViewError, ViewState};

/// A lifecycle stage whose hook chain can be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The initialize hook chain.
    Initialize,
    /// The render hook chain.
    Render,
    /// Teardown.
    Dispose,
}

impl Stage {
    /// Stable name, used in errors and trace output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Render => "render",
            Self::Dispose => "dispose",
        }
    }
}

/// State machine driving one view's lifecycle.
#[derive(Debug)]
pub struct LifecycleController {
    state: Cell<ViewState>,
    stage: Cell<Option<Stage>>,
    pending_dispose: Cell<bool>,
}

impl LifecycleController {
    /// A controller in the `Constructed` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Cell::new(ViewState::Constructed),
            stage: Cell::new(None),
            pending_dispose: Cell::new(false),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state.get()
    }

    /// Advance to `to`.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidTransition`] when the move is not legal from
    /// the current state.
    pub fn advance(&self, to: ViewState) -> Result<(), ViewError> {
        let from = self.state.get();
        if !from.can_advance_to(to) {
            return Err(ViewError::InvalidTransition { from, to });
        }
        self.state.set(to);
        Ok(())
    }

    /// The stage currently running its hook chain, if any.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.stage.get()
    }

    /// Enter a stage. The guard restores the previous stage on drop, so
    /// legal nesting (render inside initialize) unwinds correctly.
    #[must_use]
    pub fn enter_stage(&self, stage: Stage) -> StageGuard<'_> {
        let prev = self.stage.replace(Some(stage));
        StageGuard {
            cell: &self.stage,
            prev,
        }
    }

    /// Park a disposal request until the running stage unwinds.
    pub fn request_dispose(&self) {
        self.pending_dispose.set(true);
    }

    /// Whether a parked disposal request exists.
    #[must_use]
    pub fn dispose_pending(&self) -> bool {
        self.pending_dispose.get()
    }

    /// Take the parked disposal request, if any. Returns it at most once.
    #[must_use]
    pub fn take_pending_dispose(&self) -> bool {
        self.pending_dispose.replace(false)
    }
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard marking a stage's hook chain as running.
#[derive(Debug)]
pub struct StageGuard<'a> {
    cell: &'a Cell<Option<Stage>>,
    prev: Option<Stage>,
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        self.cell.set(self.prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_constructed() {
        let lc = LifecycleController::new();
        assert_eq!(lc.state(), ViewState::Constructed);
        assert_eq!(lc.stage(), None);
        assert!(!lc.dispose_pending());
    }

    #[test]
    fn advance_walks_forward() {
        let lc = LifecycleController::new();
        lc.advance(ViewState::Initializing).unwrap();
        lc.advance(ViewState::Initialized).unwrap();
        lc.advance(ViewState::Rendered).unwrap();
        lc.advance(ViewState::Rendered).unwrap(); // re-render
        lc.advance(ViewState::Disposing).unwrap();
        lc.advance(ViewState::Disposed).unwrap();
    }

    #[test]
    fn advance_rejects_illegal_moves() {
        let lc = LifecycleController::new();
        let err = lc.advance(ViewState::Rendered).unwrap_err();
        assert_eq!(
            err,
            ViewError::InvalidTransition {
                from: ViewState::Constructed,
                to: ViewState::Rendered,
            }
        );
        // State unchanged after a rejected move.
        assert_eq!(lc.state(), ViewState::Constructed);
    }

    #[test]
    fn stage_guard_restores_on_drop() {
        let lc = LifecycleController::new();
        {
            let _outer = lc.enter_stage(Stage::Initialize);
            assert_eq!(lc.stage(), Some(Stage::Initialize));
            {
                let _inner = lc.enter_stage(Stage::Render);
                assert_eq!(lc.stage(), Some(Stage::Render));
            }
            assert_eq!(lc.stage(), Some(Stage::Initialize));
        }
        assert_eq!(lc.stage(), None);
    }

    #[test]
    fn pending_dispose_is_taken_once() {
        let lc = LifecycleController::new();
        lc.request_dispose();
        assert!(lc.dispose_pending());
        assert!(lc.take_pending_dispose());
        assert!(!lc.take_pending_dispose());
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Initialize.as_str(), "initialize");
        assert_eq!(Stage::Render.as_str(), "render");
        assert_eq!(Stage::Dispose.as_str(), "dispose");
    }
}
