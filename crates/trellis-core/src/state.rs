#![forbid(unsafe_code)]

//! The component lifecycle state machine.
//!
//! States advance strictly forward; the only repeatable transition is a
//! re-render (`Rendered` → `Rendered`). Disposal can start from any
//! non-disposal state and is terminal.
//!
//! # Invariants
//!
//! 1. No backward transitions: once a state is left it is never
//!    re-entered, `Rendered` excepted.
//! 2. `Disposing` is entered at most once; `Disposed` is terminal.

/// Lifecycle stage of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// Constructed but not yet initialized.
    Constructed,
    /// Initialization hook chain is running.
    Initializing,
    /// Initialized; not yet rendered.
    Initialized,
    /// Rendered at least once.
    Rendered,
    /// Teardown in progress.
    Disposing,
    /// Fully torn down. Terminal.
    Disposed,
}

impl ViewState {
    /// Monotonic rank used for transition checking.
    const fn rank(self) -> u8 {
        match self {
            Self::Constructed => 0,
            Self::Initializing => 1,
            Self::Initialized => 2,
            Self::Rendered => 3,
            Self::Disposing => 4,
            Self::Disposed => 5,
        }
    }

    /// Whether this state is part of teardown.
    #[must_use]
    pub const fn is_disposal(self) -> bool {
        matches!(self, Self::Disposing | Self::Disposed)
    }

    /// Whether the component is fully torn down.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Disposed)
    }

    /// Whether advancing from `self` to `to` is a legal transition.
    ///
    /// Legal moves: one step forward through the forward states, a
    /// re-render (`Rendered` → `Rendered`), entering `Disposing` from any
    /// non-disposal state, and `Disposing` → `Disposed`.
    #[must_use]
    pub const fn can_advance_to(self, to: ViewState) -> bool {
        match (self, to) {
            (s, ViewState::Disposing) => !s.is_disposal(),
            (ViewState::Disposing, ViewState::Disposed) => true,
            (_, ViewState::Disposed) => false,
            (ViewState::Rendered, ViewState::Rendered) => true,
            (from, to) => !from.is_disposal() && to.rank() == from.rank() + 1,
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Constructed => "constructed",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Rendered => "rendered",
            Self::Disposing => "disposing",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}
