//! Native execution of file templates.
//!
//! File templates are plain text with `{variable}` placeholders. Execution
//! walks the source once, writing literal text and resolved placeholders
//! into an [`OutputCapture`].
//!
//! # Syntax
//!
//! - `{name}` - Variable from the scope
//! - `{user.name}` - Nested attribute access via dot notation
//! - `{items.0}` - Sequence index access
//! - `{{` and `}}` - Escaped braces (render as `{` and `}`)
//!
//! Whitespace around a placeholder name is ignored. Strings render as-is,
//! none and undefined render as empty text, everything else uses its
//! display form.
//!
//! Unlike an engine template, a missing variable is an error: the
//! placeholder cannot be left in the output silently.
//!
//! # Example
//!
//! ```rust
//! use minijinja::Value;
//! use template_renderer::template::{execute, OutputCapture, Scope};
//! use template_renderer::ContextCollection;
//!
//! let mut collection = ContextCollection::new();
//! collection.set("name", Value::from("World"));
//!
//! let scope = Scope::from_collection(&collection);
//! let mut out = OutputCapture::begin();
//! execute("hello.tpl", "Hello, {name}!", &scope, &mut out).unwrap();
//! assert_eq!(out.finish(), "Hello, World!");
//! ```

use std::collections::HashMap;

use minijinja::value::ValueKind;
use minijinja::Value;

use super::capture::OutputCapture;
use crate::context::ContextCollection;
use crate::error::RenderError;

/// Variables visible to a file template during execution.
///
/// Only identifier-like named keys of the collection are bound. Positional
/// keys and names such as `"with-dash"` cannot be spelled as placeholders,
/// so they are left out.
#[derive(Debug, Default)]
pub struct Scope<'a> {
    bindings: HashMap<&'a str, &'a Value>,
}

impl<'a> Scope<'a> {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every identifier-like key of `collection`.
    pub fn from_collection(collection: &'a ContextCollection) -> Self {
        let mut scope = Scope::new();
        for (key, value) in collection {
            match key.as_name() {
                Some(name) if key.is_identifier() => scope.bind(name, value),
                _ => tracing::trace!(key = %key, "skipping non-identifier context key"),
            }
        }
        scope
    }

    /// Binds `value` under `name`, replacing any previous binding.
    pub fn bind(&mut self, name: &'a str, value: &'a Value) {
        self.bindings.insert(name, value);
    }

    /// Looks up a bound variable.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.bindings.get(name).copied()
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no variables are bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolves a dotted path, starting from a bound variable.
    ///
    /// Supports:
    /// - Simple names: `name`
    /// - Nested attributes: `user.profile.name`
    /// - Sequence indices: `items.0` or `items.0.name`
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let mut parts = path.split('.');
        let mut current = self.get(parts.next()?)?.clone();

        for part in parts {
            current = lookup(&current, part)?;
        }

        Some(current)
    }
}

fn lookup(value: &Value, part: &str) -> Option<Value> {
    if let Ok(found) = value.get_attr(part) {
        if !found.is_undefined() {
            return Some(found);
        }
    }
    let index: i64 = part.parse().ok()?;
    value
        .get_item(&Value::from(index))
        .ok()
        .filter(|found| !found.is_undefined())
}

/// Formats a value for output.
fn format_value(value: &Value) -> String {
    match value.kind() {
        ValueKind::String => value.as_str().unwrap_or_default().to_string(),
        ValueKind::Bool => value.is_true().to_string(),
        ValueKind::None | ValueKind::Undefined => String::new(),
        // Numbers and containers use the engine's display form
        _ => value.to_string(),
    }
}

/// Executes `source` with `scope` bound, writing output into `out`.
///
/// `template` names the template in error messages. On error, whatever was
/// written to `out` before the failure stays there; the caller decides
/// whether to keep or drop the capture.
pub fn execute(
    template: &str,
    source: &str,
    scope: &Scope<'_>,
    out: &mut OutputCapture,
) -> Result<(), RenderError> {
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                // Escaped brace: {{ -> {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut var_name = String::new();
                let mut found_close = false;

                for inner_ch in chars.by_ref() {
                    if inner_ch == '}' {
                        found_close = true;
                        break;
                    }
                    var_name.push(inner_ch);
                }

                if !found_close {
                    return Err(RenderError::Syntax {
                        template: template.to_string(),
                        message: format!("unclosed placeholder: {{{}", var_name),
                    });
                }

                let var_name = var_name.trim();
                if var_name.is_empty() {
                    return Err(RenderError::Syntax {
                        template: template.to_string(),
                        message: "empty placeholder".to_string(),
                    });
                }

                let value =
                    scope
                        .resolve(var_name)
                        .ok_or_else(|| RenderError::UndefinedVariable {
                            template: template.to_string(),
                            name: var_name.to_string(),
                        })?;
                out.push_str(&format_value(&value));
            }
            '}' if chars.peek() == Some(&'}') => {
                // Escaped brace: }} -> }
                chars.next();
                out.push('}');
            }
            // Stray closing brace - just include it
            other => out.push(other),
        }
    }

    Ok(())
}
