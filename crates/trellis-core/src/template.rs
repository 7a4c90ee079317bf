#![forbid(unsafe_code)]

//! The template-provider collaborator interface.
//!
//! Template semantics are an external concern: the core hands a source
//! string to a provider once per render and applies the compiled function
//! to a data mapping. What the syntax means is entirely the provider's
//! business.

use std::rc::Rc;

use ahash::AHashMap;
use serde_json::Value;

use crate::error::ViewError;

/// The data mapping a template is applied to.
///
/// By default a view fills this from its bound model's attributes; a
/// behavior can override the mapping wholesale.
pub type TemplateData = AHashMap<String, Value>;

/// A compiled template: data in, markup out.
pub type CompiledTemplate = Rc<dyn Fn(&TemplateData) -> String>;

/// External template compiler.
pub trait TemplateProvider {
    /// Compile `source` into an applicable template.
    ///
    /// Called once per render; providers that want caching do it behind
    /// this interface.
    ///
    /// # Errors
    ///
    /// Implementations report unparseable sources as
    /// [`ViewError::Adapter`] with a provider-specific message.
    fn compile(&self, source: &str) -> Result<CompiledTemplate, ViewError>;
}
