#![forbid(unsafe_code)]

//! Error taxonomy and the best-effort disposal report.
//!
//! Two propagation regimes coexist:
//!
//! - Ordinary operations (render without a template, binding after
//!   disposal) fail synchronously with a [`ViewError`].
//! - Cascading disposal never aborts: per-component failures are
//!   collected into a [`DisposalReport`] so every sibling still gets its
//!   chance to tear down, and the caller decides whether to log or
//!   re-raise the aggregate.
//!
//! [`EmitterGone`] is internal: bulk unbind suppresses it (a destroyed
//! model cannot be unsubscribed from, and that must not stop the rest of
//! the cleanup).

use crate::ids::ComponentId;
use crate::state::ViewState;

/// Errors surfaced by lifecycle, binding, and subview operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// A lifecycle or binding operation was invoked after disposal.
    Disposed {
        /// The component the operation was invoked on.
        id: ComponentId,
    },
    /// Render was attempted without a template provider or source.
    MissingTemplate,
    /// Render was attempted with no data source (no bound model, and the
    /// behavior supplies none).
    MissingTemplateData,
    /// A model-scoped operation was invoked with no bound model.
    MissingModel,
    /// A mediator-scoped operation was invoked with no mediator handle
    /// configured or installed.
    MissingMediator,
    /// Exclusive attach to an already-occupied subview name.
    DuplicateSubview {
        /// The occupied name.
        name: String,
    },
    /// Attaching the subview would make it its own ancestor.
    SubviewCycle {
        /// The name the attach was requested under.
        name: String,
    },
    /// A lifecycle stage was re-entered from inside its own hook chain.
    HookChainBroken {
        /// The stage that was re-entered (`"initialize"` or `"render"`).
        stage: &'static str,
    },
    /// An operation was invoked in a state it cannot run from.
    InvalidTransition {
        /// Current state.
        from: ViewState,
        /// State the operation would have entered.
        to: ViewState,
    },
    /// The DOM adapter rejected an operation (e.g. container insertion).
    Adapter {
        /// Adapter-supplied description.
        message: String,
    },
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disposed { id } => write!(f, "{id} is disposed"),
            Self::MissingTemplate => f.write_str("no template provider or source configured"),
            Self::MissingTemplateData => {
                f.write_str("no template data: no model bound and behavior supplies none")
            }
            Self::MissingModel => f.write_str("no model bound"),
            Self::MissingMediator => f.write_str("no mediator configured or installed"),
            Self::DuplicateSubview { name } => {
                write!(f, "subview name '{name}' is already occupied")
            }
            Self::SubviewCycle { name } => {
                write!(f, "attaching '{name}' would create an ownership cycle")
            }
            Self::HookChainBroken { stage } => {
                write!(f, "lifecycle stage '{stage}' re-entered from its own hook chain")
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "illegal lifecycle transition: {from} -> {to}")
            }
            Self::Adapter { message } => write!(f, "dom adapter: {message}"),
        }
    }
}

impl std::error::Error for ViewError {}

/// Internal marker: an emitter was destroyed (or dropped) before it could
/// be unsubscribed from.
///
/// Bulk unbind paths catch and ignore this so sibling cleanup proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterGone;

impl std::fmt::Display for EmitterGone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("emitter already destroyed")
    }
}

impl std::error::Error for EmitterGone {}

/// Aggregate outcome of a (possibly cascading) disposal.
///
/// Disposal is best-effort: one subview failing to tear down must not
/// prevent its siblings from tearing down, so errors are collected here
/// instead of thrown at the first failure.
///
/// A report with `deferred` set means disposal was *requested* while a
/// lifecycle stage was mid-flight and will run when that stage unwinds;
/// it is deliberately not `is_clean()` because the component is not torn
/// down yet at return time.
#[derive(Debug, Default)]
pub struct DisposalReport {
    errors: Vec<(ComponentId, ViewError)>,
    deferred: bool,
}

impl DisposalReport {
    /// An empty (successful) report.
    #[must_use]
    pub fn clean() -> Self {
        Self::default()
    }

    /// A report marking a deferred disposal.
    #[must_use]
    pub fn deferred() -> Self {
        Self {
            errors: Vec::new(),
            deferred: true,
        }
    }

    /// Record a per-component failure.
    pub fn push(&mut self, id: ComponentId, error: ViewError) {
        self.errors.push((id, error));
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: DisposalReport) {
        self.deferred |= other.deferred;
        self.errors.extend(other.errors);
    }

    /// Whether the disposal completed with no failures and was not
    /// deferred.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && !self.deferred
    }

    /// Whether the disposal was deferred past a running lifecycle stage.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// The collected per-component failures.
    #[must_use]
    pub fn errors(&self) -> &[(ComponentId, ViewError)] {
        &self.errors
    }

    /// Convert to a `Result` for callers that prefer re-raising the
    /// aggregate over logging it.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` when the report is not clean.
    pub fn into_result(self) -> Result<(), DisposalReport> {
        if self.is_clean() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for DisposalReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.deferred {
            f.write_str("disposal deferred past a running lifecycle stage")
        } else if self.errors.is_empty() {
            f.write_str("disposal completed cleanly")
        } else {
            write!(f, "disposal completed with {} error(s)", self.errors.len())
        }
    }
}

impl std::error::Error for DisposalReport {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report() {
        let report = DisposalReport::clean();
        assert!(report.is_clean());
        assert!(!report.is_deferred());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn deferred_is_not_clean() {
        let report = DisposalReport::deferred();
        assert!(!report.is_clean());
        assert!(report.is_deferred());
        assert!(report.into_result().is_err());
    }

    #[test]
    fn push_collects_errors() {
        let mut report = DisposalReport::clean();
        let id = ComponentId::next();
        report.push(id, ViewError::MissingTemplate);
        assert!(!report.is_clean());
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].0, id);
    }

    #[test]
    fn merge_combines_errors_and_deferral() {
        let mut a = DisposalReport::clean();
        a.push(ComponentId::next(), ViewError::MissingTemplate);

        let b = DisposalReport::deferred();
        a.merge(b);

        assert!(a.is_deferred());
        assert_eq!(a.errors().len(), 1);
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            DisposalReport::clean().to_string(),
            "disposal completed cleanly"
        );
        let mut dirty = DisposalReport::clean();
        dirty.push(ComponentId::next(), ViewError::MissingTemplate);
        assert_eq!(dirty.to_string(), "disposal completed with 1 error(s)");
    }

    #[test]
    fn view_error_display_is_stable() {
        let err = ViewError::InvalidTransition {
            from: ViewState::Constructed,
            to: ViewState::Rendered,
        };
        assert_eq!(
            err.to_string(),
            "illegal lifecycle transition: constructed -> rendered"
        );
        assert_eq!(
            ViewError::DuplicateSubview { name: "a".into() }.to_string(),
            "subview name 'a' is already occupied"
        );
        assert_eq!(EmitterGone.to_string(), "emitter already destroyed");
    }
}
