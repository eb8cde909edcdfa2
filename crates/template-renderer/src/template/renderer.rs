//! The renderer trait and the state every backend shares.

use crate::context::{ContextCollection, ContextMap};
use crate::error::RenderError;
use crate::util::trim_separators;

/// A backend that renders named templates with context values.
///
/// Both backends implement this identically, so application code can hold a
/// `Box<dyn TemplateRenderer>` and swap backends without changes.
///
/// `render` takes `&mut self` because it merges `context` into the owned
/// collection. Sharing one renderer across threads therefore needs external
/// synchronization such as a `Mutex`.
pub trait TemplateRenderer {
    /// Renders `template_name` after merging `context` into the collection.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidInput`] if the name is empty
    /// - backend-specific validation errors (missing file, wrong resource kind)
    /// - any error raised while the template executes, unmodified
    fn render(&mut self, template_name: &str, context: ContextMap) -> Result<String, RenderError>;

    /// The collection of values passed to templates.
    fn context_collection(&self) -> &ContextCollection;

    /// Mutable access to the collection, e.g. to clear it between renders.
    fn context_collection_mut(&mut self) -> &mut ContextCollection;
}

/// Normalizes a template name.
///
/// Fails if the name is empty; otherwise strips leading and trailing `/` and
/// `\` characters so names cannot pass for absolute paths.
///
/// ```rust
/// use template_renderer::template::build_template_name;
///
/// assert_eq!(build_template_name("/foo/bar/").unwrap(), "foo/bar");
/// assert!(build_template_name("").is_err());
/// ```
pub fn build_template_name(template_name: &str) -> Result<String, RenderError> {
    if template_name.is_empty() {
        return Err(RenderError::invalid_input("A template name must be provided."));
    }

    Ok(trim_separators(template_name).to_string())
}

/// State and logic shared by all backends.
#[derive(Debug, Clone, Default)]
pub struct RendererCore {
    context_collection: ContextCollection,
}

impl RendererCore {
    /// Creates a core owning `context_collection`.
    pub fn new(context_collection: ContextCollection) -> Self {
        Self { context_collection }
    }

    /// See [`build_template_name`].
    pub fn build_template_name(&self, template_name: &str) -> Result<String, RenderError> {
        build_template_name(template_name)
    }

    /// Saves `context` into the collection, key by key.
    ///
    /// Existing keys are overwritten; keys not in `context` are kept.
    pub fn save_context_values(&mut self, context: ContextMap) -> &mut Self {
        for (key, value) in context {
            self.context_collection.set(key, value);
        }
        self
    }

    pub fn context_collection(&self) -> &ContextCollection {
        &self.context_collection
    }

    pub fn context_collection_mut(&mut self) -> &mut ContextCollection {
        &mut self.context_collection
    }
}
