//! Service group name templates
//!
//! Group names are written with Go-style field references, e.g.
//! `{{.DataCenter}}-nginx-{{.Type}}`. Field references are rewritten to plain
//! minijinja variables before rendering, so `{{.DataCenter}}` becomes
//! `{{ DataCenter }}`. Undefined fields are errors rather than empty strings.

use minijinja::{Environment, UndefinedBehavior, Value};
use serde::Serialize;

use crate::Error;

/// Template engine for service group names
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create a template engine with strict undefined handling
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env }
    }

    /// Render a template against a serializable context
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the template is malformed or references
    /// a field the context does not have.
    pub fn render<S: Serialize>(&self, template: &str, ctx: &S) -> Result<String, Error> {
        let normalized = normalize_field_references(template);
        self.env
            .render_str(&normalized, Value::from_serialize(ctx))
            .map_err(|e| Error::template(template, e.to_string()))
    }
}

/// Rewrite `{{.Field}}` references inside `{{ ... }}` blocks to `{{ Field }}`
fn normalize_field_references(template: &str) -> String {
    let mut result = String::with_capacity(template.len());
    let mut remaining = template;

    while let Some(start) = remaining.find("{{") {
        result.push_str(&remaining[..start + 2]);
        remaining = &remaining[start + 2..];

        if let Some(end) = remaining.find("}}") {
            result.push(' ');
            result.push_str(&strip_leading_dots(remaining[..end].trim()));
            result.push_str(" }}");
            remaining = &remaining[end + 2..];
        } else {
            break;
        }
    }

    result.push_str(remaining);
    result
}

/// Drop the `.` that starts a field reference, leaving member access (`a.b`) alone
fn strip_leading_dots(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut prev: Option<char> = None;
    for c in expression.chars() {
        let starts_reference = c == '.'
            && prev.map_or(true, |p| p.is_whitespace() || matches!(p, '(' | '|' | ','));
        if !starts_reference {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}
