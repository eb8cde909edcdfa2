//! Renderer for raw template files.
//!
//! [`FileTemplateRenderer`] looks templates up under a root directory and
//! executes them natively (see [`super::simple`]). Each render runs an
//! ordered pipeline:
//!
//! 1. Normalize the template name
//! 2. Join it onto the root path
//! 3. Check the result exists and is a regular file
//! 4. Merge the per-call context into the collection
//! 5. Execute the file into a scoped [`OutputCapture`] and return the text
//!
//! A failed check stops the pipeline before the context is merged.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::capture::OutputCapture;
use super::renderer::{RendererCore, TemplateRenderer};
use super::simple::{execute, Scope};
use crate::context::{ContextCollection, ContextMap};
use crate::error::RenderError;
use crate::fs::{Filesystem, RealFilesystem};
use crate::util::PATH_SEPARATORS;

/// Renders template files found under a root directory.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use template_renderer::context::context_map;
/// use template_renderer::fs::MockFilesystem;
/// use template_renderer::{ContextCollection, FileTemplateRenderer, TemplateRenderer};
///
/// let fs = MockFilesystem::new().with_file("/templates/hello.tpl", "Hello, {name}!");
/// let mut renderer = FileTemplateRenderer::with_filesystem(
///     "/templates",
///     ContextCollection::new(),
///     Arc::new(fs),
/// )
/// .unwrap();
///
/// let output = renderer
///     .render("hello.tpl", context_map([("name", "World")]))
///     .unwrap();
/// assert_eq!(output, "Hello, World!");
/// ```
pub struct FileTemplateRenderer {
    core: RendererCore,
    /// Root directory, always ending with exactly one `/`.
    templates_path: String,
    fs: Arc<dyn Filesystem>,
}

impl FileTemplateRenderer {
    /// Creates a renderer for templates under `templates_path` on the real
    /// filesystem.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidInput`] if the path is empty
    /// - [`RenderError::NotFound`] if it does not exist
    /// - [`RenderError::InvalidResource`] if it is not a directory
    pub fn new(
        templates_path: impl AsRef<str>,
        context_collection: ContextCollection,
    ) -> Result<Self, RenderError> {
        Self::with_filesystem(templates_path, context_collection, Arc::new(RealFilesystem))
    }

    /// Creates a renderer backed by an explicit filesystem.
    pub fn with_filesystem(
        templates_path: impl AsRef<str>,
        context_collection: ContextCollection,
        fs: Arc<dyn Filesystem>,
    ) -> Result<Self, RenderError> {
        let templates_path = build_templates_path(templates_path.as_ref(), fs.as_ref())?;
        tracing::debug!(path = %templates_path, "file template renderer ready");

        Ok(Self {
            core: RendererCore::new(context_collection),
            templates_path,
            fs,
        })
    }

    /// The root directory, with a trailing `/`.
    pub fn templates_path(&self) -> &str {
        &self.templates_path
    }

    fn validate_template_file(&self, filename: &Path) -> Result<(), RenderError> {
        if !self.fs.exists(filename) {
            return Err(RenderError::not_found(filename));
        }

        if !self.fs.is_file(filename) {
            return Err(RenderError::invalid_resource(format!(
                "The template file \"{}\" is not a regular file.",
                filename.display()
            )));
        }

        Ok(())
    }

    fn render_template_file(&self, template_name: &str, filename: &Path) -> Result<String, RenderError> {
        let source = self.fs.read_to_string(filename)?;
        let scope = Scope::from_collection(self.core.context_collection());

        // Dropped on every path out of here, including the `?` below.
        let mut capture = OutputCapture::begin();
        execute(template_name, &source, &scope, &mut capture)?;

        Ok(capture.finish())
    }
}

impl TemplateRenderer for FileTemplateRenderer {
    fn render(&mut self, template_name: &str, context: ContextMap) -> Result<String, RenderError> {
        let template_name = self.core.build_template_name(template_name)?;
        let template_file = format!("{}{}", self.templates_path, template_name);
        let template_file = Path::new(&template_file);

        self.validate_template_file(template_file)?;
        self.core.save_context_values(context);

        tracing::debug!(
            template = %template_name,
            path = %template_file.display(),
            values = self.core.context_collection().count(),
            "rendering template file"
        );

        self.render_template_file(&template_name, template_file)
    }

    fn context_collection(&self) -> &ContextCollection {
        self.core.context_collection()
    }

    fn context_collection_mut(&mut self) -> &mut ContextCollection {
        self.core.context_collection_mut()
    }
}

impl fmt::Debug for FileTemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileTemplateRenderer")
            .field("templates_path", &self.templates_path)
            .field("context_collection", self.core.context_collection())
            .finish()
    }
}

/// Validates the root directory and terminates it with a single `/`.
fn build_templates_path(templates_path: &str, fs: &dyn Filesystem) -> Result<String, RenderError> {
    if templates_path.is_empty() {
        return Err(RenderError::invalid_input(
            "A path where to look for templates must be provided.",
        ));
    }

    let path = Path::new(templates_path);
    if !fs.exists(path) {
        return Err(RenderError::not_found(path));
    }

    if !fs.is_dir(path) {
        return Err(RenderError::invalid_resource(format!(
            "The path where to look for template files (\"{}\") must point to a directory.",
            templates_path
        )));
    }

    Ok(format!("{}/", templates_path.trim_end_matches(PATH_SEPARATORS)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::context_map;
    use crate::fs::MockFilesystem;
    use crate::template::capture_level;
    use minijinja::Value;

    fn renderer(fs: MockFilesystem) -> FileTemplateRenderer {
        FileTemplateRenderer::with_filesystem("/tpl", ContextCollection::new(), Arc::new(fs))
            .unwrap()
    }

    fn fixture() -> MockFilesystem {
        MockFilesystem::new()
            .with_file("/tpl/hello.tpl", "Hello, {name}!")
            .with_file("/tpl/both.tpl", "{first}+{second}")
            .with_file("/tpl/broken.tpl", "before {missing} after")
            .with_file("/tpl/nested/page.tpl", "page {title}")
            .with_dir("/tpl/dir.tpl")
    }

    #[test]
    fn test_root_path_gets_single_trailing_slash() {
        let fs = Arc::new(MockFilesystem::new().with_dir("/tpl"));
        for input in ["/tpl", "/tpl/", "/tpl//"] {
            let r = FileTemplateRenderer::with_filesystem(input, ContextCollection::new(), fs.clone())
                .unwrap();
            assert_eq!(r.templates_path(), "/tpl/");
        }
    }

    #[test]
    fn test_root_path_empty() {
        let err = FileTemplateRenderer::with_filesystem(
            "",
            ContextCollection::new(),
            Arc::new(MockFilesystem::new()),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn test_root_path_missing() {
        let err = FileTemplateRenderer::with_filesystem(
            "/nowhere",
            ContextCollection::new(),
            Arc::new(MockFilesystem::new()),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::NotFound { .. }));
    }

    #[test]
    fn test_root_path_is_a_file() {
        let fs = MockFilesystem::new().with_file("/tpl/file.txt", "x");
        let err = FileTemplateRenderer::with_filesystem(
            "/tpl/file.txt",
            ContextCollection::new(),
            Arc::new(fs),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidResource(_)));
    }

    #[test]
    fn test_render_hello() {
        let mut r = renderer(fixture());
        let output = r
            .render("hello.tpl", context_map([("name", "World")]))
            .unwrap();
        assert_eq!(output, "Hello, World!");
    }

    #[test]
    fn test_render_normalizes_name() {
        let mut r = renderer(fixture());
        let output = r
            .render("/nested/page.tpl/", context_map([("title", "Home")]))
            .unwrap();
        assert_eq!(output, "page Home");
    }

    #[test]
    fn test_render_empty_name() {
        let mut r = renderer(fixture());
        let err = r.render("", ContextMap::new()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn test_render_missing_file_does_not_merge_context() {
        let mut r = renderer(fixture());
        let err = r
            .render("missing.tpl", context_map([("name", "x")]))
            .unwrap_err();

        assert!(matches!(err, RenderError::NotFound { .. }));
        assert!(r.context_collection().is_empty());
    }

    #[test]
    fn test_render_directory_is_invalid_resource() {
        let mut r = renderer(fixture());
        let err = r.render("dir.tpl", ContextMap::new()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidResource(_)));
    }

    #[test]
    fn test_context_accumulates_across_renders() {
        let mut r = renderer(fixture());
        r.render("hello.tpl", context_map([("name", "A"), ("first", "1")]))
            .unwrap();

        let output = r.render("both.tpl", context_map([("second", "2")])).unwrap();
        assert_eq!(output, "1+2");
    }

    #[test]
    fn test_clear_between_renders() {
        let mut r = renderer(fixture());
        r.render("both.tpl", context_map([("first", "1"), ("second", "2")]))
            .unwrap();
        r.context_collection_mut().clear();

        let err = r.render("both.tpl", context_map([("second", "2")])).unwrap_err();
        assert!(matches!(err, RenderError::UndefinedVariable { ref name, .. } if name == "first"));
    }

    #[test]
    fn test_per_call_context_overwrites() {
        let mut r = renderer(fixture());
        r.render("hello.tpl", context_map([("name", "First")])).unwrap();
        let output = r.render("hello.tpl", context_map([("name", "Second")])).unwrap();

        assert_eq!(output, "Hello, Second!");
        assert_eq!(r.context_collection().get("name"), Some(&Value::from("Second")));
    }

    #[test]
    fn test_execution_error_propagates_and_releases_capture() {
        let mut r = renderer(fixture());
        let err = r.render("broken.tpl", ContextMap::new()).unwrap_err();

        assert!(matches!(err, RenderError::UndefinedVariable { .. }));
        assert_eq!(capture_level(), 0);

        // the renderer is still usable afterwards
        let output = r.render("hello.tpl", context_map([("name", "again")])).unwrap();
        assert_eq!(output, "Hello, again!");
    }

    #[test]
    fn test_usable_as_trait_object() {
        let mut r: Box<dyn TemplateRenderer> = Box::new(renderer(fixture()));
        let output = r.render("hello.tpl", context_map([("name", "dyn")])).unwrap();
        assert_eq!(output, "Hello, dyn!");
    }
}
