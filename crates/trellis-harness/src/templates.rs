#![forbid(unsafe_code)]

//! Stub template providers.
//!
//! [`StubTemplates`] interpolates `{{key}}` placeholders from the
//! template data and counts compiles, which is all the once-per-render
//! contract needs. [`BrokenTemplates`] fails every compile, for
//! error-path tests.
//!
//! Value rendering matches the one-way binder: strings verbatim, null
//! empty, everything else canonical JSON text. Unknown keys interpolate
//! to the empty string.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;

use trellis_core::{CompiledTemplate, TemplateData, TemplateProvider, ViewError};

/// A `{{key}}`-interpolating template provider with a compile counter.
#[derive(Debug, Default)]
pub struct StubTemplates {
    compiles: Cell<usize>,
}

impl StubTemplates {
    /// A provider with a zeroed counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `compile` has been called.
    #[must_use]
    pub fn compile_count(&self) -> usize {
        self.compiles.get()
    }
}

impl TemplateProvider for StubTemplates {
    fn compile(&self, source: &str) -> Result<CompiledTemplate, ViewError> {
        self.compiles.set(self.compiles.get() + 1);
        let source = source.to_string();
        Ok(Rc::new(move |data: &TemplateData| interpolate(&source, data)))
    }
}

/// A provider that rejects every source, for error-path tests.
#[derive(Debug, Default)]
pub struct BrokenTemplates;

impl TemplateProvider for BrokenTemplates {
    fn compile(&self, source: &str) -> Result<CompiledTemplate, ViewError> {
        Err(ViewError::Adapter {
            message: format!("cannot compile template ({} bytes)", source.len()),
        })
    }
}

fn interpolate(source: &str, data: &TemplateData) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        if let Some(value) = data.get(key) {
            out.push_str(&value_text(value));
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(pairs: &[(&str, Value)]) -> TemplateData {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn interpolates_keys() {
        let provider = StubTemplates::new();
        let template = provider.compile("<p>{{name}} ({{count}})</p>").unwrap();
        let markup = template(&data(&[("name", json!("trellis")), ("count", json!(3))]));
        assert_eq!(markup, "<p>trellis (3)</p>");
    }

    #[test]
    fn unknown_keys_render_empty() {
        let provider = StubTemplates::new();
        let template = provider.compile("[{{missing}}]").unwrap();
        assert_eq!(template(&TemplateData::default()), "[]");
    }

    #[test]
    fn null_renders_empty_and_whitespace_is_trimmed() {
        let provider = StubTemplates::new();
        let template = provider.compile("[{{ gone }}]").unwrap();
        assert_eq!(template(&data(&[("gone", Value::Null)])), "[]");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        let provider = StubTemplates::new();
        let template = provider.compile("a {{b").unwrap();
        assert_eq!(template(&TemplateData::default()), "a {{b");
    }

    #[test]
    fn compile_count_tracks_calls() {
        let provider = StubTemplates::new();
        assert_eq!(provider.compile_count(), 0);
        provider.compile("x").unwrap();
        provider.compile("y").unwrap();
        assert_eq!(provider.compile_count(), 2);
    }

    #[test]
    fn broken_provider_always_errors() {
        let err = BrokenTemplates.compile("anything").unwrap_err();
        assert!(matches!(err, ViewError::Adapter { .. }));
    }
}
