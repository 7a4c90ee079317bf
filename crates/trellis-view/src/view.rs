#![forbid(unsafe_code)]

//! The view: lifecycle orchestration over the registries.
//!
//! A [`View`] is a cheap-clone handle over shared core state; parents
//! hold children strongly through the subview tree, children hold
//! parents weakly, and bound emitters are held weakly too — nothing here
//! ever extends an external object's lifetime or lets an emitter keep a
//! view alive.
//!
//! # Hook ordering
//!
//! Each lifecycle stage is a fixed template method. User-overridable
//! steps live on [`ViewBehavior`]; the guaranteed stages run around them
//! unconditionally:
//!
//! - `initialize`: behavior `on_initialize` → destroy-cascade
//!   subscriptions on the bound model/collection → `after_initialize`
//!   (exactly once; triggers `render` when auto-render is on).
//! - `render`: template compile (once per call) → data resolution →
//!   root create/update → delegation re-apply → behavior `on_render` →
//!   `after_render` (exactly once per call; container insertion on the
//!   first render only) → behavior `after_render` tail.
//! - `dispose`: behavior `on_dispose` → subviews depth-first →
//!   `unbind_all` → `undelegate_all` → mediator sweep → element release
//!   → mark disposed. Best-effort throughout; a failing child never
//!   stops its siblings.
//!
//! # Re-entrancy
//!
//! Disposal triggered from inside a running initialize/render hook chain
//! is parked and runs when the stage unwinds; the report says `deferred`
//! so it is never mistaken for a completed teardown. Re-entering a stage
//! from its own hook chain is the broken-hook-chain error. A second
//! `dispose` — including one triggered mid-cascade by a model's destroy
//! notification — is a clean no-op.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::Value;

use trellis_core::{
    ComponentId, DESTROY_EVENT, DisposalReport, DomAdapter, ElementRef, Emitter, Event, Handler,
    InsertMode, RootSpec, TemplateData, TemplateProvider, ViewError, ViewState,
};
use trellis_runtime::{Collection, Mediator, Model, mediator};

use crate::binder;
use crate::bindings::BindingRegistry;
use crate::config::ViewConfig;
use crate::delegate::EventDelegator;
use crate::lifecycle::{LifecycleController, Stage};
use crate::subviews::SubviewTree;

/// User-overridable lifecycle steps.
///
/// Every method has a default, so `()` is a valid behavior for views that
/// are pure containers. Overrides are plain methods — the guaranteed
/// wrapper stages run regardless, there is no chain to forget to call.
pub trait ViewBehavior: 'static {
    /// First step of initialization, before destroy-cascade wiring.
    /// Attach subviews and register bindings here.
    fn on_initialize(&mut self, _view: &View) {}

    /// Supply template data, overriding the default (the bound model's
    /// attributes). Return `None` to keep the default.
    fn template_data(&self, _view: &View) -> Option<TemplateData> {
        None
    }

    /// Runs after the root element has been created or refreshed, before
    /// container insertion.
    fn on_render(&mut self, _view: &View) {}

    /// User tail of the render stage, after container insertion.
    fn after_render(&mut self, _view: &View) {}

    /// First step of disposal, while bindings and subviews are still
    /// live. Errors are collected into the disposal report, never
    /// allowed to abort the teardown.
    fn on_dispose(&mut self, _view: &View) -> Result<(), ViewError> {
        Ok(())
    }
}

/// The no-op behavior, for views that are pure containers.
impl ViewBehavior for () {}

struct ViewCore {
    id: ComponentId,
    lifecycle: LifecycleController,
    behavior: RefCell<Box<dyn ViewBehavior>>,
    template: Option<String>,
    templates: Option<Rc<dyn TemplateProvider>>,
    dom: Option<Rc<dyn DomAdapter>>,
    container: Option<String>,
    container_mode: InsertMode,
    auto_render: bool,
    root_spec: RootSpec,
    mediator: Option<Rc<Mediator>>,
    model: Option<Weak<Model>>,
    collection: Option<Weak<Collection>>,
    parent: RefCell<Option<WeakView>>,
    subviews: RefCell<SubviewTree>,
    bindings: RefCell<BindingRegistry>,
    delegator: RefCell<EventDelegator>,
    root: Cell<Option<ElementRef>>,
    attached: Cell<bool>,
}

/// A node in the view tree. Cheap to clone; all clones share one core.
#[derive(Clone)]
pub struct View {
    core: Rc<ViewCore>,
}

/// Weak handle to a view, used for parent back-references and handler
/// contexts. Never used to extend a lifetime.
#[derive(Clone)]
pub struct WeakView {
    core: Weak<ViewCore>,
}

impl WeakView {
    /// Upgrade to a strong handle if the view is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<View> {
        self.core.upgrade().map(|core| View { core })
    }
}

impl std::fmt::Debug for WeakView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakView")
            .field("alive", &(self.core.strong_count() > 0))
            .finish()
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for View {}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("id", &self.core.id)
            .field("state", &self.core.lifecycle.state())
            .field("subviews", &self.core.subviews.borrow().len())
            .finish()
    }
}

impl View {
    /// Construct a view with a behavior. The view starts `Constructed`;
    /// call [`initialize`](Self::initialize) to run the hook chain.
    #[must_use]
    pub fn new(behavior: impl ViewBehavior, config: ViewConfig) -> Self {
        let id = ComponentId::next();
        Self {
            core: Rc::new(ViewCore {
                id,
                lifecycle: LifecycleController::new(),
                behavior: RefCell::new(Box::new(behavior)),
                template: config.template,
                templates: config.templates,
                dom: config.dom,
                container: config.container,
                container_mode: config.container_mode,
                auto_render: config.auto_render,
                root_spec: config.root,
                mediator: config.mediator,
                model: config.model.as_ref().map(Rc::downgrade),
                collection: config.collection.as_ref().map(Rc::downgrade),
                parent: RefCell::new(None),
                subviews: RefCell::new(SubviewTree::new()),
                bindings: RefCell::new(BindingRegistry::new(id)),
                delegator: RefCell::new(EventDelegator::new(id)),
                root: Cell::new(None),
                attached: Cell::new(false),
            }),
        }
    }

    /// Construct a view with the no-op behavior.
    #[must_use]
    pub fn with_config(config: ViewConfig) -> Self {
        Self::new((), config)
    }

    // ── Identity and inspection ─────────────────────────────────────

    /// This view's unique id.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.core.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.core.lifecycle.state()
    }

    /// Whether disposal has started or completed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.lifecycle.state().is_disposal()
    }

    /// Downgrade to a weak handle.
    #[must_use]
    pub fn downgrade(&self) -> WeakView {
        WeakView {
            core: Rc::downgrade(&self.core),
        }
    }

    /// The owning parent, if attached as a subview.
    #[must_use]
    pub fn parent(&self) -> Option<View> {
        self.core.parent.borrow().as_ref().and_then(WeakView::upgrade)
    }

    /// The bound model, while the external owner keeps it alive.
    #[must_use]
    pub fn model(&self) -> Option<Rc<Model>> {
        self.core.model.as_ref().and_then(Weak::upgrade)
    }

    /// The bound collection, while the external owner keeps it alive.
    #[must_use]
    pub fn collection(&self) -> Option<Rc<Collection>> {
        self.core.collection.as_ref().and_then(Weak::upgrade)
    }

    /// The mediator this view routes through: the injected handle first,
    /// else the thread's installed one.
    #[must_use]
    pub fn mediator_handle(&self) -> Option<Rc<Mediator>> {
        self.core.mediator.clone().or_else(mediator::current)
    }

    /// The DOM adapter, if configured.
    #[must_use]
    pub fn dom_handle(&self) -> Option<Rc<dyn DomAdapter>> {
        self.core.dom.clone()
    }

    /// The current root element, if rendered.
    #[must_use]
    pub fn root(&self) -> Option<ElementRef> {
        self.core.root.get()
    }

    /// Number of recorded emitter bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.core.bindings.borrow().len()
    }

    /// Number of recorded delegations.
    #[must_use]
    pub fn delegation_count(&self) -> usize {
        self.core.delegator.borrow().len()
    }

    /// Number of owned subviews.
    #[must_use]
    pub fn subview_count(&self) -> usize {
        self.core.subviews.borrow().len()
    }

    /// Subview names in insertion order.
    #[must_use]
    pub fn subview_names(&self) -> Vec<String> {
        self.core.subviews.borrow().names()
    }

    fn ensure_live(&self) -> Result<(), ViewError> {
        if self.core.lifecycle.state().is_disposal() {
            return Err(ViewError::Disposed { id: self.core.id });
        }
        Ok(())
    }

    // ── Handlers ────────────────────────────────────────────────────

    /// Wrap `f` as a handler bound to this view's identity: it upgrades
    /// the weak back-reference and silently skips once the view is gone
    /// or disposing, so a stale subscription can never run user code
    /// against a dead component.
    #[must_use]
    pub fn handler(&self, f: impl Fn(&View, &Event) + 'static) -> Handler {
        let weak = self.downgrade();
        Handler::new(move |event| {
            let Some(view) = weak.upgrade() else {
                return;
            };
            if view.is_disposed() {
                tracing::trace!(id = %view.id(), event = %event.name, "handler skipped: view disposed");
                return;
            }
            f(&view, event);
        })
    }

    /// A handler that re-renders this view, logging (not raising) render
    /// failures — the usual target for `model_bind("change", ..)`.
    #[must_use]
    pub fn render_handler(&self) -> Handler {
        self.handler(|view, _| {
            if let Err(err) = view.render() {
                tracing::warn!(id = %view.id(), %err, "re-render from binding failed");
            }
        })
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Run the initialization hook chain.
    ///
    /// # Errors
    ///
    /// [`ViewError::Disposed`] after disposal, [`ViewError::HookChainBroken`]
    /// when called from inside its own hook chain,
    /// [`ViewError::InvalidTransition`] when not `Constructed`, and any
    /// error from an auto-render.
    pub fn initialize(&self) -> Result<(), ViewError> {
        let lc = &self.core.lifecycle;
        self.ensure_live()?;
        if lc.stage() == Some(Stage::Initialize) {
            return Err(ViewError::HookChainBroken {
                stage: Stage::Initialize.as_str(),
            });
        }
        lc.advance(ViewState::Initializing)?;
        let result = {
            let _guard = lc.enter_stage(Stage::Initialize);
            self.core.behavior.borrow_mut().on_initialize(self);
            self.bind_disposal_cascades()
                .and_then(|()| self.after_initialize())
        };
        self.run_deferred_dispose();
        result
    }

    /// Guaranteed post-initialize stage: runs exactly once after the full
    /// chain, regardless of how the behavior is layered.
    fn after_initialize(&self) -> Result<(), ViewError> {
        self.core.lifecycle.advance(ViewState::Initialized)?;
        if self.core.auto_render && !self.core.lifecycle.dispose_pending() {
            self.render()?;
        }
        Ok(())
    }

    /// Subscribe to the bound model's and collection's destruction so
    /// destroying either cascades into disposing this view.
    fn bind_disposal_cascades(&self) -> Result<(), ViewError> {
        if let Some(model) = self.model() {
            let handler = self.handler(Self::cascade_dispose);
            let emitter: Rc<dyn Emitter> = model;
            self.core
                .bindings
                .borrow_mut()
                .bind(&emitter, DESTROY_EVENT, handler)?;
        }
        if let Some(collection) = self.collection() {
            let handler = self.handler(Self::cascade_dispose);
            let emitter: Rc<dyn Emitter> = collection;
            self.core
                .bindings
                .borrow_mut()
                .bind(&emitter, DESTROY_EVENT, handler)?;
        }
        Ok(())
    }

    fn cascade_dispose(view: &View, _event: &Event) {
        let report = view.dispose();
        if !report.is_clean() && !report.is_deferred() {
            tracing::warn!(id = %view.id(), %report, "destroy-cascade disposal reported errors");
        }
    }

    /// Run the render hook chain. Idempotent: a second call re-renders;
    /// `after_render` fires exactly once per call and container insertion
    /// happens only on the first.
    ///
    /// # Errors
    ///
    /// [`ViewError::MissingTemplate`] / [`ViewError::MissingTemplateData`]
    /// for absent collaborators, [`ViewError::Disposed`] after disposal,
    /// [`ViewError::HookChainBroken`] on re-entry from its own chain,
    /// [`ViewError::InvalidTransition`] before initialization, and
    /// adapter insertion failures.
    pub fn render(&self) -> Result<(), ViewError> {
        let lc = &self.core.lifecycle;
        self.ensure_live()?;
        if lc.stage() == Some(Stage::Render) {
            return Err(ViewError::HookChainBroken {
                stage: Stage::Render.as_str(),
            });
        }
        match lc.state() {
            ViewState::Initialized | ViewState::Rendered => {}
            from => {
                return Err(ViewError::InvalidTransition {
                    from,
                    to: ViewState::Rendered,
                });
            }
        }
        let result = {
            let _guard = lc.enter_stage(Stage::Render);
            let _span = tracing::debug_span!("view_render", id = self.core.id.raw()).entered();
            self.render_root().and_then(|()| {
                self.core.behavior.borrow_mut().on_render(self);
                self.after_render()
            })
        };
        self.run_deferred_dispose();
        result
    }

    /// Compile the template, resolve data, and create or refresh the root
    /// element, re-applying delegations against it.
    fn render_root(&self) -> Result<(), ViewError> {
        let provider = self
            .core
            .templates
            .as_ref()
            .ok_or(ViewError::MissingTemplate)?;
        let source = self.core.template.as_deref().ok_or(ViewError::MissingTemplate)?;
        let dom = self.core.dom.as_ref().ok_or_else(|| ViewError::Adapter {
            message: "no dom adapter configured".into(),
        })?;

        let compiled = provider.compile(source)?;
        let data = self.template_data().ok_or(ViewError::MissingTemplateData)?;
        let markup = compiled(&data);

        let root = match self.core.root.get() {
            Some(root) => {
                dom.update_root(root, &markup);
                root
            }
            None => {
                let root = dom.create_root(&self.core.root_spec, &markup);
                self.core.root.set(Some(root));
                root
            }
        };
        self.core.delegator.borrow_mut().reapply(dom, root);
        Ok(())
    }

    /// Guaranteed post-render stage: state advance, first-render
    /// container insertion, then the behavior's tail hook.
    fn after_render(&self) -> Result<(), ViewError> {
        self.core.lifecycle.advance(ViewState::Rendered)?;
        if !self.core.attached.get()
            && let (Some(dom), Some(root), Some(container)) = (
                self.core.dom.as_ref(),
                self.core.root.get(),
                self.core.container.as_deref(),
            )
        {
            dom.insert(root, container, &self.core.container_mode)?;
            self.core.attached.set(true);
        }
        self.core.behavior.borrow_mut().after_render(self);
        Ok(())
    }

    /// Resolve template data: behavior override first, else the bound
    /// model's attributes.
    fn template_data(&self) -> Option<TemplateData> {
        if let Some(data) = self.core.behavior.borrow().template_data(self) {
            return Some(data);
        }
        self.model().map(|model| model.attributes())
    }

    /// Tear the view down: behavior hook, subviews depth-first, all
    /// bindings, all delegations, mediator subscriptions, element
    /// references, then mark `Disposed`.
    ///
    /// Safe to call any number of times; a second call (including one
    /// arriving mid-cascade through a destroy notification) is a clean
    /// no-op. When called from inside a running initialize/render hook
    /// chain the teardown is deferred until the stage unwinds and the
    /// returned report says so.
    pub fn dispose(&self) -> DisposalReport {
        let lc = &self.core.lifecycle;
        if lc.state().is_disposal() {
            return DisposalReport::clean();
        }
        if lc.stage().is_some() {
            lc.request_dispose();
            tracing::debug!(id = %self.core.id, "dispose deferred past running stage");
            return DisposalReport::deferred();
        }

        let _span = tracing::debug_span!("view_dispose", id = self.core.id.raw()).entered();
        // Both advances are legal from here; errors are impossible.
        let _ = lc.advance(ViewState::Disposing);
        let _guard = lc.enter_stage(Stage::Dispose);
        let mut report = DisposalReport::clean();

        if let Err(err) = self.core.behavior.borrow_mut().on_dispose(self) {
            report.push(self.core.id, err);
        }

        // Children first, on a tree taken out of the cell so a child's
        // hooks may still reach this view without re-entrant borrows.
        let mut tree = self.core.subviews.take();
        report.merge(tree.dispose_all());

        self.core.bindings.borrow_mut().unbind_all();
        self.core
            .delegator
            .borrow_mut()
            .undelegate_all(self.core.dom.as_ref());
        if let Some(mediator) = self.mediator_handle() {
            mediator.unsubscribe_all(self.core.id);
        }

        if let (Some(dom), Some(root)) = (self.core.dom.as_ref(), self.core.root.take()) {
            dom.detach(root);
        }
        self.core.attached.set(false);
        self.core.parent.replace(None);

        let _ = lc.advance(ViewState::Disposed);
        tracing::debug!(id = %self.core.id, errors = report.errors().len(), "view disposed");
        report
    }

    fn run_deferred_dispose(&self) {
        if self.core.lifecycle.take_pending_dispose() {
            let report = self.dispose();
            if !report.is_clean() {
                tracing::warn!(id = %self.core.id, %report, "deferred disposal reported errors");
            }
        }
    }

    // ── Bindings ────────────────────────────────────────────────────

    /// Bind `handler` to `event` on any emitter, recorded for teardown.
    /// Rebinding an identical triple leaves exactly one subscription.
    ///
    /// # Errors
    ///
    /// [`ViewError::Disposed`] after disposal.
    pub fn bind(
        &self,
        emitter: &Rc<dyn Emitter>,
        event: &str,
        handler: Handler,
    ) -> Result<(), ViewError> {
        self.ensure_live()?;
        self.core.bindings.borrow_mut().bind(emitter, event, handler)
    }

    /// Remove one recorded binding. No-op when absent; always allowed,
    /// disposal included.
    pub fn unbind(&self, emitter: &Rc<dyn Emitter>, event: &str, handler: &Handler) {
        self.core.bindings.borrow_mut().unbind(emitter, event, handler);
    }

    /// Bind against the bound model.
    ///
    /// # Errors
    ///
    /// [`ViewError::MissingModel`] without a live bound model, else as
    /// [`bind`](Self::bind).
    pub fn model_bind(&self, event: &str, handler: Handler) -> Result<(), ViewError> {
        let model = self.model().ok_or(ViewError::MissingModel)?;
        let emitter: Rc<dyn Emitter> = model;
        self.bind(&emitter, event, handler)
    }

    /// Remove a binding against the bound model. No-op without one.
    pub fn model_unbind(&self, event: &str, handler: &Handler) {
        if let Some(model) = self.model() {
            let emitter: Rc<dyn Emitter> = model;
            self.unbind(&emitter, event, handler);
        }
    }

    /// One-way binding: keep the element at `selector` in sync with the
    /// model attribute. See [`binder`] for write semantics.
    ///
    /// # Errors
    ///
    /// [`ViewError::MissingModel`] without a live bound model,
    /// [`ViewError::Disposed`] after disposal.
    pub fn pass(&self, attribute: &str, selector: &str) -> Result<(), ViewError> {
        binder::pass(self, attribute, selector)
    }

    // ── Mediator ────────────────────────────────────────────────────

    /// Subscribe to a mediator topic, routed through the binding registry
    /// so disposal is guaranteed to unsubscribe.
    ///
    /// # Errors
    ///
    /// [`ViewError::MissingMediator`] without a mediator,
    /// [`ViewError::Disposed`] after disposal.
    pub fn subscribe(&self, topic: &str, handler: Handler) -> Result<(), ViewError> {
        self.ensure_live()?;
        let mediator = self.mediator_handle().ok_or(ViewError::MissingMediator)?;
        let emitter: Rc<dyn Emitter> = mediator;
        self.core.bindings.borrow_mut().bind(&emitter, topic, handler)
    }

    /// Publish to a mediator topic.
    ///
    /// # Errors
    ///
    /// [`ViewError::MissingMediator`] without a mediator.
    pub fn publish(&self, topic: &str, payload: &Value) -> Result<(), ViewError> {
        let mediator = self.mediator_handle().ok_or(ViewError::MissingMediator)?;
        mediator.publish(topic, payload);
        Ok(())
    }

    // ── Delegation ──────────────────────────────────────────────────

    /// Record a delegated handler against the root, scoped to `selector`
    /// when given. Applied now if a root exists, re-applied after every
    /// render.
    ///
    /// # Errors
    ///
    /// [`ViewError::Disposed`] after disposal.
    pub fn delegate(
        &self,
        event: &str,
        selector: Option<&str>,
        handler: Handler,
    ) -> Result<(), ViewError> {
        self.ensure_live()?;
        self.core.delegator.borrow_mut().delegate(
            self.core.dom.as_ref(),
            self.core.root.get(),
            event,
            selector,
            handler,
        )
    }

    /// Remove one delegation. No-op when absent.
    pub fn undelegate(&self, event: &str, selector: Option<&str>, handler: &Handler) {
        self.core
            .delegator
            .borrow_mut()
            .undelegate(self.core.dom.as_ref(), event, selector, handler);
    }

    // ── Subviews ────────────────────────────────────────────────────

    /// Attach `child` under `name`, replacing (and disposing) any current
    /// occupant. A child attached elsewhere is detached from its old
    /// parent first; a view has exactly one owner.
    ///
    /// Returns the displaced occupant's disposal report (clean when the
    /// name was free).
    ///
    /// # Errors
    ///
    /// [`ViewError::Disposed`] when parent or child is disposed,
    /// [`ViewError::SubviewCycle`] when `child` is this view or one of
    /// its ancestors.
    pub fn attach(&self, name: &str, child: View) -> Result<DisposalReport, ViewError> {
        self.ensure_live()?;
        child.ensure_live().map_err(|_| ViewError::Disposed { id: child.id() })?;
        self.ensure_no_cycle(name, &child)?;

        if let Some(old_parent) = child.parent() {
            old_parent.detach_view(&child);
        }
        let displaced = self
            .core
            .subviews
            .borrow_mut()
            .insert_replacing(name, child.clone());
        child.set_parent(Some(self.downgrade()));

        let mut report = DisposalReport::clean();
        if let Some(old) = displaced
            && old != child
        {
            old.set_parent(None);
            report.merge(old.dispose());
        }
        Ok(report)
    }

    /// Attach without replace semantics.
    ///
    /// # Errors
    ///
    /// [`ViewError::DuplicateSubview`] when `name` already holds a
    /// different view; otherwise as [`attach`](Self::attach).
    pub fn attach_exclusive(&self, name: &str, child: View) -> Result<(), ViewError> {
        if let Some(current) = self.core.subviews.borrow().get(name)
            && current != child
        {
            return Err(ViewError::DuplicateSubview { name: name.into() });
        }
        self.attach(name, child).map(|_| ())
    }

    /// The subview stored under `name`.
    #[must_use]
    pub fn subview(&self, name: &str) -> Option<View> {
        self.core.subviews.borrow().get(name)
    }

    /// Remove the subview under `name` *without* disposing it; ownership
    /// transfers back to the caller.
    pub fn detach(&self, name: &str) -> Option<View> {
        let child = self.core.subviews.borrow_mut().take_by_name(name)?;
        child.set_parent(None);
        Some(child)
    }

    /// Remove `child` by identity without disposing it.
    pub fn detach_view(&self, child: &View) -> Option<View> {
        let child = self.core.subviews.borrow_mut().take_by_view(child)?;
        child.set_parent(None);
        Some(child)
    }

    /// Detach the subview under `name` and dispose it.
    pub fn remove(&self, name: &str) -> Option<DisposalReport> {
        self.detach(name).map(|child| child.dispose())
    }

    /// Detach `child` by identity and dispose it.
    pub fn remove_view(&self, child: &View) -> Option<DisposalReport> {
        self.detach_view(child).map(|child| child.dispose())
    }

    fn set_parent(&self, parent: Option<WeakView>) {
        *self.core.parent.borrow_mut() = parent;
    }

    fn ensure_no_cycle(&self, name: &str, child: &View) -> Result<(), ViewError> {
        let mut cursor = Some(self.clone());
        while let Some(view) = cursor {
            if view == *child {
                return Err(ViewError::SubviewCycle { name: name.into() });
            }
            cursor = view.parent();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use trellis_runtime::EventChannel;

    use super::*;

    fn view() -> View {
        View::with_config(ViewConfig::new())
    }

    fn counting_handler() -> (Handler, Rc<Cell<usize>>) {
        let hits = Rc::new(Cell::new(0));
        let h = {
            let hits = Rc::clone(&hits);
            Handler::new(move |_| hits.set(hits.get() + 1))
        };
        (h, hits)
    }

    // ── Construction and state ──────────────────────────────────────

    #[test]
    fn starts_constructed() {
        let v = view();
        assert_eq!(v.state(), ViewState::Constructed);
        assert!(!v.is_disposed());
        assert_eq!(v.binding_count(), 0);
        assert_eq!(v.subview_count(), 0);
    }

    #[test]
    fn initialize_reaches_initialized() {
        let v = view();
        v.initialize().unwrap();
        assert_eq!(v.state(), ViewState::Initialized);
    }

    #[test]
    fn double_initialize_is_invalid_transition() {
        let v = view();
        v.initialize().unwrap();
        let err = v.initialize().unwrap_err();
        assert!(matches!(err, ViewError::InvalidTransition { .. }));
    }

    #[test]
    fn render_before_initialize_is_invalid() {
        let v = view();
        let err = v.render().unwrap_err();
        assert_eq!(
            err,
            ViewError::InvalidTransition {
                from: ViewState::Constructed,
                to: ViewState::Rendered,
            }
        );
    }

    #[test]
    fn clones_share_identity() {
        let v = view();
        let w = v.clone();
        assert_eq!(v, w);
        assert_eq!(v.id(), w.id());
        assert_ne!(v, view());
    }

    // ── Disposal basics ─────────────────────────────────────────────

    #[test]
    fn dispose_is_idempotent() {
        let v = view();
        v.initialize().unwrap();
        assert!(v.dispose().is_clean());
        assert_eq!(v.state(), ViewState::Disposed);
        assert!(v.dispose().is_clean());
        assert_eq!(v.state(), ViewState::Disposed);
    }

    #[test]
    fn dispose_before_initialize_is_fine() {
        let v = view();
        assert!(v.dispose().is_clean());
        assert_eq!(v.state(), ViewState::Disposed);
    }

    #[test]
    fn operations_after_dispose_fail_fast() {
        let v = view();
        v.initialize().unwrap();
        v.dispose();

        let id = v.id();
        let (h, _) = counting_handler();
        let chan: Rc<dyn Emitter> = Rc::new(EventChannel::new());

        assert_eq!(v.initialize().unwrap_err(), ViewError::Disposed { id });
        assert_eq!(v.render().unwrap_err(), ViewError::Disposed { id });
        assert_eq!(
            v.bind(&chan, "e", h.clone()).unwrap_err(),
            ViewError::Disposed { id }
        );
        assert_eq!(
            v.delegate("click", None, h).unwrap_err(),
            ViewError::Disposed { id }
        );
        assert_eq!(
            v.attach("a", view()).unwrap_err(),
            ViewError::Disposed { id }
        );
    }

    #[test]
    fn dispose_empties_bindings_and_delegations() {
        let v = view();
        v.initialize().unwrap();
        let chan = Rc::new(EventChannel::new());
        let emitter: Rc<dyn Emitter> = Rc::clone(&chan) as Rc<dyn Emitter>;
        let (h, _) = counting_handler();
        v.bind(&emitter, "e", h.clone()).unwrap();
        v.delegate("click", Some("button"), h).unwrap();
        assert_eq!(v.binding_count(), 1);
        assert_eq!(v.delegation_count(), 1);

        v.dispose();
        assert_eq!(v.binding_count(), 0);
        assert_eq!(v.delegation_count(), 0);
        assert_eq!(chan.total_listeners(), 0);
    }

    // ── Binding through the view ────────────────────────────────────

    #[test]
    fn rebind_keeps_single_subscription() {
        let v = view();
        let chan = Rc::new(EventChannel::new());
        let emitter: Rc<dyn Emitter> = Rc::clone(&chan) as Rc<dyn Emitter>;
        let (h, hits) = counting_handler();

        v.bind(&emitter, "e", h.clone()).unwrap();
        v.bind(&emitter, "e", h).unwrap();
        assert_eq!(chan.listener_count("e"), 1);

        chan.emit("e", &Value::Null);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn model_bind_without_model_errors() {
        let v = view();
        let (h, _) = counting_handler();
        assert_eq!(v.model_bind("change", h).unwrap_err(), ViewError::MissingModel);
    }

    #[test]
    fn view_handler_skips_after_dispose() {
        let v = view();
        let hits = Rc::new(Cell::new(0));
        let h = {
            let hits = Rc::clone(&hits);
            v.handler(move |_, _| hits.set(hits.get() + 1))
        };

        h.call(&Event::signal("ping"));
        assert_eq!(hits.get(), 1);

        v.dispose();
        h.call(&Event::signal("ping"));
        assert_eq!(hits.get(), 1, "handler must not run on a disposed view");
    }

    // ── Subview orchestration ───────────────────────────────────────

    #[test]
    fn attach_and_get() {
        let parent = view();
        let child = view();
        parent.attach("body", child.clone()).unwrap();

        assert_eq!(parent.subview("body"), Some(child.clone()));
        assert_eq!(child.parent(), Some(parent.clone()));
        assert_eq!(parent.subview_count(), 1);
    }

    #[test]
    fn attach_replaces_and_disposes_old() {
        let parent = view();
        let old = view();
        let new = view();
        parent.attach("slot", old.clone()).unwrap();

        let report = parent.attach("slot", new.clone()).unwrap();
        assert!(report.is_clean());
        assert_eq!(old.state(), ViewState::Disposed);
        assert_eq!(parent.subview("slot"), Some(new));
        assert_eq!(parent.subview_count(), 1);
    }

    #[test]
    fn reattach_same_child_same_name_is_not_disposal() {
        let parent = view();
        let child = view();
        parent.attach("slot", child.clone()).unwrap();
        parent.attach("slot", child.clone()).unwrap();

        assert!(!child.is_disposed());
        assert_eq!(parent.subview_count(), 1);
    }

    #[test]
    fn attach_moves_child_between_names() {
        let parent = view();
        let child = view();
        parent.attach("a", child.clone()).unwrap();
        parent.attach("b", child.clone()).unwrap();

        assert_eq!(parent.subview("a"), None);
        assert_eq!(parent.subview("b"), Some(child));
        assert_eq!(parent.subview_count(), 1);
    }

    #[test]
    fn attach_moves_child_between_parents() {
        let p1 = view();
        let p2 = view();
        let child = view();
        p1.attach("x", child.clone()).unwrap();
        p2.attach("y", child.clone()).unwrap();

        assert_eq!(p1.subview_count(), 0);
        assert_eq!(child.parent(), Some(p2));
    }

    #[test]
    fn attach_exclusive_rejects_occupied_name() {
        let parent = view();
        parent.attach("slot", view()).unwrap();

        let err = parent.attach_exclusive("slot", view()).unwrap_err();
        assert_eq!(err, ViewError::DuplicateSubview { name: "slot".into() });
    }

    #[test]
    fn attach_exclusive_on_free_name_works() {
        let parent = view();
        let child = view();
        parent.attach_exclusive("slot", child.clone()).unwrap();
        assert_eq!(parent.subview("slot"), Some(child));
    }

    #[test]
    fn attach_disposed_child_fails() {
        let parent = view();
        let child = view();
        child.dispose();
        let err = parent.attach("slot", child.clone()).unwrap_err();
        assert_eq!(err, ViewError::Disposed { id: child.id() });
    }

    #[test]
    fn self_attach_is_a_cycle() {
        let v = view();
        let err = v.attach("me", v.clone()).unwrap_err();
        assert_eq!(err, ViewError::SubviewCycle { name: "me".into() });
    }

    #[test]
    fn ancestor_attach_is_a_cycle() {
        let grandparent = view();
        let parent = view();
        grandparent.attach("p", parent.clone()).unwrap();

        let err = parent.attach("gp", grandparent.clone()).unwrap_err();
        assert_eq!(err, ViewError::SubviewCycle { name: "gp".into() });
    }

    #[test]
    fn detach_transfers_ownership_without_disposal() {
        let parent = view();
        let child = view();
        parent.attach("slot", child.clone()).unwrap();

        let detached = parent.detach("slot").unwrap();
        assert_eq!(detached, child);
        assert!(!child.is_disposed());
        assert_eq!(child.parent(), None);
        assert_eq!(parent.subview_count(), 0);
    }

    #[test]
    fn remove_detaches_and_disposes() {
        let parent = view();
        let child = view();
        parent.attach("slot", child.clone()).unwrap();

        let report = parent.remove("slot").unwrap();
        assert!(report.is_clean());
        assert_eq!(child.state(), ViewState::Disposed);
        assert_eq!(parent.subview_count(), 0);
    }

    #[test]
    fn parent_dispose_cascades_to_all_subviews() {
        let parent = view();
        let x = view();
        let y = view();
        parent.attach("x", x.clone()).unwrap();
        parent.attach("y", y.clone()).unwrap();

        let report = parent.dispose();
        assert!(report.is_clean());
        assert_eq!(x.state(), ViewState::Disposed);
        assert_eq!(y.state(), ViewState::Disposed);
        assert_eq!(parent.subview_count(), 0);
    }

    #[test]
    fn cascade_is_transitive() {
        let root = view();
        let mid = view();
        let leaf = view();
        root.attach("mid", mid.clone()).unwrap();
        mid.attach("leaf", leaf.clone()).unwrap();

        root.dispose();
        assert_eq!(mid.state(), ViewState::Disposed);
        assert_eq!(leaf.state(), ViewState::Disposed);
    }

    #[test]
    fn subview_of_disposed_parent_cannot_outlive_it() {
        let parent = view();
        let child = view();
        parent.attach("c", child.clone()).unwrap();
        parent.dispose();

        // The externally held handle still answers, but the component is
        // dead and refuses further lifecycle work.
        assert!(child.is_disposed());
        assert!(matches!(
            child.initialize().unwrap_err(),
            ViewError::Disposed { .. }
        ));
    }
}
