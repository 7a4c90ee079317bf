#![forbid(unsafe_code)]

//! View construction options.
//!
//! All options default to "absent": a bare config builds a view that can
//! initialize, own subviews, and bind, but cannot render until a template
//! provider, source, and DOM adapter are supplied.

use std::rc::Rc;

use trellis_core::{DomAdapter, InsertMode, RootSpec, TemplateProvider};
use trellis_runtime::{Collection, Mediator, Model};

/// Builder-style options for [`View`](crate::view::View) construction.
#[derive(Default)]
pub struct ViewConfig {
    pub(crate) template: Option<String>,
    pub(crate) templates: Option<Rc<dyn TemplateProvider>>,
    pub(crate) dom: Option<Rc<dyn DomAdapter>>,
    pub(crate) container: Option<String>,
    pub(crate) container_mode: InsertMode,
    pub(crate) auto_render: bool,
    pub(crate) root: RootSpec,
    pub(crate) model: Option<Rc<Model>>,
    pub(crate) collection: Option<Rc<Collection>>,
    pub(crate) mediator: Option<Rc<Mediator>>,
}

impl ViewConfig {
    /// An empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Template source handed to the provider once per render.
    #[must_use]
    pub fn template(mut self, source: impl Into<String>) -> Self {
        self.template = Some(source.into());
        self
    }

    /// The external template compiler.
    #[must_use]
    pub fn template_provider(mut self, provider: Rc<dyn TemplateProvider>) -> Self {
        self.templates = Some(provider);
        self
    }

    /// The external DOM/container adapter.
    #[must_use]
    pub fn dom(mut self, dom: Rc<dyn DomAdapter>) -> Self {
        self.dom = Some(dom);
        self
    }

    /// Container target the root is inserted into on first render.
    #[must_use]
    pub fn container(mut self, target: impl Into<String>) -> Self {
        self.container = Some(target.into());
        self
    }

    /// Insertion mode for the container splice. Defaults to append.
    #[must_use]
    pub fn container_mode(mut self, mode: InsertMode) -> Self {
        self.container_mode = mode;
        self
    }

    /// Render automatically at the end of initialization.
    #[must_use]
    pub fn auto_render(mut self, yes: bool) -> Self {
        self.auto_render = yes;
        self
    }

    /// How the root element is synthesized. Defaults to a bare `div`.
    #[must_use]
    pub fn root(mut self, spec: RootSpec) -> Self {
        self.root = spec;
        self
    }

    /// Bind a model. The view holds it weakly and subscribes to its
    /// destruction during initialization.
    #[must_use]
    pub fn model(mut self, model: Rc<Model>) -> Self {
        self.model = Some(model);
        self
    }

    /// Bind a collection, held weakly like the model.
    #[must_use]
    pub fn collection(mut self, collection: Rc<Collection>) -> Self {
        self.collection = Some(collection);
        self
    }

    /// Inject a mediator handle. Without one, the view falls back to the
    /// thread's installed mediator.
    #[must_use]
    pub fn mediator(mut self, mediator: Rc<Mediator>) -> Self {
        self.mediator = Some(mediator);
        self
    }
}

impl std::fmt::Debug for ViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewConfig")
            .field("template", &self.template.is_some())
            .field("container", &self.container)
            .field("container_mode", &self.container_mode)
            .field("auto_render", &self.auto_render)
            .field("model", &self.model.is_some())
            .field("collection", &self.collection.is_some())
            .field("mediator", &self.mediator.is_some())
            .finish()
    }
}
