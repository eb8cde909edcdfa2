//! Options applied to every environment a factory builds.
//!
//! Options can be set fluently, or parsed from a JSON map or a YAML
//! document:
//!
//! ```yaml
//! debug: true
//! strict_variables: true
//! autoescape: html
//! trim_blocks: true
//! ```
//!
//! Parsing is strict about value types: `debug: "yes"` fails with
//! [`RenderError::TypeMismatch`]. Unknown keys are ignored with a warning so
//! a shared config file can carry settings for other tools.

use minijinja::{AutoEscape, UndefinedBehavior};
use serde_json::{Map, Value as JsonValue};

use crate::error::RenderError;

/// How output is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoEscapeStrategy {
    /// Escape every template as HTML.
    #[default]
    Html,
    /// Decide from the template name's extension (`.html`, `.xml`, ...).
    ByName,
    /// Never escape.
    None,
}

impl AutoEscapeStrategy {
    /// Parses `html`, `name` or `none`.
    pub fn parse(s: &str) -> Result<Self, RenderError> {
        match s {
            "html" => Ok(Self::Html),
            "name" => Ok(Self::ByName),
            "none" | "false" => Ok(Self::None),
            other => Err(RenderError::invalid_input(format!(
                "Unknown autoescape strategy \"{}\" (expected \"html\", \"name\" or \"none\").",
                other
            ))),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOptions {
    /// Keep extra debug information for error reports.
    pub debug: bool,
    /// Fail on undefined variables instead of rendering them empty.
    pub strict_variables: bool,
    pub autoescape: AutoEscapeStrategy,
    /// Remove the first newline after a block tag.
    pub trim_blocks: bool,
    /// Strip leading whitespace before a block tag.
    pub lstrip_blocks: bool,
    /// Keep the final newline of a template.
    pub keep_trailing_newline: bool,
}

impl EnvironmentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    pub fn with_autoescape(mut self, strategy: AutoEscapeStrategy) -> Self {
        self.autoescape = strategy;
        self
    }

    pub fn with_trim_blocks(mut self, trim: bool) -> Self {
        self.trim_blocks = trim;
        self
    }

    pub fn with_lstrip_blocks(mut self, lstrip: bool) -> Self {
        self.lstrip_blocks = lstrip;
        self
    }

    pub fn with_keep_trailing_newline(mut self, keep: bool) -> Self {
        self.keep_trailing_newline = keep;
        self
    }

    /// Parses options from a JSON object.
    ///
    /// # Errors
    ///
    /// - [`RenderError::TypeMismatch`] if a known key has a value of the wrong type
    /// - [`RenderError::InvalidInput`] for an unknown `autoescape` strategy
    pub fn from_map(map: &Map<String, JsonValue>) -> Result<Self, RenderError> {
        let mut options = Self::default();

        for (key, value) in map {
            match key.as_str() {
                "debug" => options.debug = expect_bool(key, value)?,
                "strict_variables" => options.strict_variables = expect_bool(key, value)?,
                "trim_blocks" => options.trim_blocks = expect_bool(key, value)?,
                "lstrip_blocks" => options.lstrip_blocks = expect_bool(key, value)?,
                "keep_trailing_newline" => {
                    options.keep_trailing_newline = expect_bool(key, value)?
                }
                "autoescape" => options.autoescape = parse_autoescape(value)?,
                unknown => tracing::warn!(option = unknown, "ignoring unknown environment option"),
            }
        }

        Ok(options)
    }

    /// Parses options from any JSON value. `null` means defaults.
    pub fn from_value(value: &JsonValue) -> Result<Self, RenderError> {
        match value {
            JsonValue::Null => Ok(Self::default()),
            JsonValue::Object(map) => Self::from_map(map),
            other => Err(RenderError::type_mismatch(format!(
                "Environment options must be a map, got {}.",
                json_type_name(other)
            ))),
        }
    }

    /// Parses options from a YAML document. An empty document means defaults.
    pub fn from_yaml(content: &str) -> Result<Self, RenderError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: JsonValue = serde_yaml::from_str(content).map_err(|e| {
            RenderError::invalid_input(format!("Invalid environment options YAML: {}", e))
        })?;
        Self::from_value(&value)
    }

    /// Applies these options to a MiniJinja environment.
    pub fn apply(&self, env: &mut minijinja::Environment<'_>) {
        env.set_debug(self.debug);
        env.set_undefined_behavior(if self.strict_variables {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        env.set_trim_blocks(self.trim_blocks);
        env.set_lstrip_blocks(self.lstrip_blocks);
        env.set_keep_trailing_newline(self.keep_trailing_newline);

        match self.autoescape {
            AutoEscapeStrategy::Html => env.set_auto_escape_callback(|_| AutoEscape::Html),
            AutoEscapeStrategy::ByName => {
                env.set_auto_escape_callback(minijinja::default_auto_escape_callback)
            }
            AutoEscapeStrategy::None => env.set_auto_escape_callback(|_| AutoEscape::None),
        }
    }
}

fn expect_bool(key: &str, value: &JsonValue) -> Result<bool, RenderError> {
    value.as_bool().ok_or_else(|| {
        RenderError::type_mismatch(format!(
            "Option \"{}\" must be a boolean, got {}.",
            key,
            json_type_name(value)
        ))
    })
}

fn parse_autoescape(value: &JsonValue) -> Result<AutoEscapeStrategy, RenderError> {
    match value {
        JsonValue::Bool(false) => Ok(AutoEscapeStrategy::None),
        JsonValue::Bool(true) => Ok(AutoEscapeStrategy::Html),
        JsonValue::String(s) => AutoEscapeStrategy::parse(s),
        other => Err(RenderError::type_mismatch(format!(
            "Option \"autoescape\" must be a string or a boolean, got {}.",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "a map",
    }
}
