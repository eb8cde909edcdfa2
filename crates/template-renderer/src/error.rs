//! Error types for template rendering.
//!
//! This module provides [`RenderError`], the single error type returned by
//! every renderer, loader and factory in the crate. Validation failures are
//! reported as soon as they are detected; errors raised while a template is
//! executing (by the file backend or by MiniJinja) are carried through
//! untouched.

use std::path::PathBuf;

/// Error type for template rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A required value was empty or malformed (template name, root path,
    /// loader path, namespace, extension name, option value).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced filesystem path does not exist.
    #[error("path not found: {}", path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A path exists but is the wrong kind of resource
    /// (a directory where a file is expected, or the reverse).
    #[error("invalid resource: {0}")]
    InvalidResource(String),

    /// A collaborator or option does not satisfy its contract.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A file template referenced a variable that is not bound in its scope.
    #[error("undefined variable \"{name}\" in template \"{template}\"")]
    UndefinedVariable {
        /// The template being executed.
        template: String,
        /// The placeholder that could not be resolved.
        name: String,
    },

    /// A file template is malformed.
    #[error("syntax error in template \"{template}\": {message}")]
    Syntax {
        /// The template being executed.
        template: String,
        /// What went wrong.
        message: String,
    },

    /// Error raised by the MiniJinja engine, passed through unchanged.
    #[error(transparent)]
    Engine(#[from] minijinja::Error),

    /// I/O error while reading a template.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid resource error.
    pub fn invalid_resource(msg: impl Into<String>) -> Self {
        Self::InvalidResource(msg.into())
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Create a not found error for a path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Returns the underlying engine error, if this error came from MiniJinja.
    pub fn engine_error(&self) -> Option<&minijinja::Error> {
        match self {
            RenderError::Engine(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this error was raised while a template was executing, as
    /// opposed to during validation.
    pub fn is_execution_error(&self) -> bool {
        matches!(
            self,
            RenderError::Engine(_)
                | RenderError::UndefinedVariable { .. }
                | RenderError::Syntax { .. }
                | RenderError::Io(_)
        )
    }
}

// Loader callbacks registered on a MiniJinja environment must return the
// engine's own error type.
impl From<RenderError> for minijinja::Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Engine(inner) => inner,
            other => minijinja::Error::new(
                minijinja::ErrorKind::InvalidOperation,
                other.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::not_found("/tmp/missing.tpl");
        assert!(err.to_string().contains("path not found"));
        assert!(err.to_string().contains("missing.tpl"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let render_err: RenderError = io_err.into();
        assert!(matches!(render_err, RenderError::Io(_)));
        assert!(render_err.is_execution_error());
    }

    #[test]
    fn test_engine_error_is_kept_verbatim() {
        let mj_err = minijinja::Error::new(
            minijinja::ErrorKind::TemplateNotFound,
            "template 'foo' not found",
        );
        let message = mj_err.to_string();
        let render_err: RenderError = mj_err.into();

        assert_eq!(render_err.to_string(), message);
        assert_eq!(
            render_err.engine_error().map(|e| e.kind()),
            Some(minijinja::ErrorKind::TemplateNotFound)
        );
    }

    #[test]
    fn test_validation_errors_are_not_execution_errors() {
        assert!(!RenderError::invalid_input("empty").is_execution_error());
        assert!(!RenderError::type_mismatch("bad").is_execution_error());
        assert!(!RenderError::invalid_resource("dir").is_execution_error());
    }

    #[test]
    fn test_into_minijinja_error() {
        let err: minijinja::Error = RenderError::invalid_input("bad name").into();
        assert_eq!(err.kind(), minijinja::ErrorKind::InvalidOperation);
        assert!(err.to_string().contains("bad name"));
    }
}
