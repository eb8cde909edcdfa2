//! Engine extensions.
//!
//! An extension bundles filters, functions, tests or globals and registers
//! them on an environment when the factory builds it. Extensions are
//! attached in the order they are given; a later extension may replace a
//! name registered by an earlier one.

use std::fmt;

use minijinja::{Environment, Value};

use crate::util::truncate_to_width;

/// A named bundle of engine additions.
pub trait Extension: Send + Sync {
    /// Name reported by [`Environment::extensions`](super::Environment::extensions).
    fn name(&self) -> &str;

    /// Names of the filters, functions, tests and globals this extension
    /// registers. An extension that registers nothing is rejected by the
    /// factory.
    fn provides(&self) -> Vec<String>;

    /// Adds this extension's items to `env`.
    fn register(&self, env: &mut Environment<'static>);
}

type RegisterFn = Box<dyn Fn(&mut Environment<'static>) + Send + Sync>;

/// An extension assembled from a closure.
///
/// ```rust
/// use template_renderer::engine::{Extension, FnExtension};
///
/// let shout = FnExtension::new("shout", ["shout"], |env| {
///     env.add_filter("shout", |s: String| s.to_uppercase());
/// });
/// assert_eq!(shout.name(), "shout");
/// ```
pub struct FnExtension {
    name: String,
    provides: Vec<String>,
    register: RegisterFn,
}

impl FnExtension {
    pub fn new<P, S, F>(name: impl Into<String>, provides: P, register: F) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&mut Environment<'static>) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            provides: provides.into_iter().map(Into::into).collect(),
            register: Box::new(register),
        }
    }
}

impl Extension for FnExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> Vec<String> {
        self.provides.clone()
    }

    fn register(&self, env: &mut Environment<'static>) {
        (self.register)(env)
    }
}

impl fmt::Debug for FnExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExtension")
            .field("name", &self.name)
            .field("provides", &self.provides)
            .finish()
    }
}

/// Text helpers for plain-text output.
///
/// - `nl`: appends a newline, `{{ "" | nl }}` emits a blank line
/// - `truncate_width(width)`: cuts to a display width, ending with `…`
#[derive(Debug, Default, Clone, Copy)]
pub struct TextExtension;

impl TextExtension {
    pub const NAME: &'static str = "text";
}

impl Extension for TextExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn provides(&self) -> Vec<String> {
        vec!["nl".to_string(), "truncate_width".to_string()]
    }

    fn register(&self, env: &mut Environment<'static>) {
        env.add_filter("nl", |value: Value| -> String { format!("{}\n", value) });
        env.add_filter("truncate_width", |value: Value, width: usize| -> String {
            truncate_to_width(&value.to_string(), width)
        });
    }
}
