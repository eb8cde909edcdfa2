//! Engine environments and the factory that builds them.
//!
//! [`JinjaEnvironmentFactory`] is configured once with a loader, options and
//! extensions, and then produces ready-to-use [`Environment`]s. All
//! validation happens in [`JinjaEnvironmentFactory::new`], so
//! [`EnvironmentFactory::create_environment`] cannot fail.

use std::fmt;
use std::sync::Arc;

use super::extension::Extension;
use super::loader::TemplateLoader;
use super::options::EnvironmentOptions;
use crate::context::{to_template_value, ContextMap};
use crate::error::RenderError;

/// A configured MiniJinja environment.
///
/// Wraps [`minijinja::Environment`] and remembers which extensions were
/// attached and with which options it was built.
pub struct Environment {
    inner: minijinja::Environment<'static>,
    options: EnvironmentOptions,
    extensions: Vec<String>,
}

impl Environment {
    /// Creates an environment that loads templates through `loader`.
    pub fn new(loader: Arc<dyn TemplateLoader>, options: EnvironmentOptions) -> Self {
        let mut inner = minijinja::Environment::new();
        options.apply(&mut inner);
        inner.set_loader(move |name| loader.load(name).map_err(minijinja::Error::from));

        Self {
            inner,
            options,
            extensions: Vec::new(),
        }
    }

    /// Registers `extension` on the environment.
    pub fn add_extension(&mut self, extension: &dyn Extension) {
        tracing::debug!(extension = extension.name(), "attaching extension");
        extension.register(&mut self.inner);
        self.extensions.push(extension.name().to_string());
    }

    /// Names of the attached extensions, in attachment order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext == name)
    }

    pub fn options(&self) -> &EnvironmentOptions {
        &self.options
    }

    /// Renders the template `name` with `data`.
    ///
    /// # Errors
    ///
    /// Engine errors (template not found, syntax, runtime) as
    /// [`RenderError::Engine`].
    pub fn render(&self, name: &str, data: &ContextMap) -> Result<String, RenderError> {
        let template = self.inner.get_template(name)?;
        Ok(template.render(to_template_value(data))?)
    }

    /// Renders an inline template source with `data`.
    pub fn render_str(&self, source: &str, data: &ContextMap) -> Result<String, RenderError> {
        Ok(self.inner.render_str(source, to_template_value(data))?)
    }

    /// The wrapped MiniJinja environment.
    pub fn inner(&self) -> &minijinja::Environment<'static> {
        &self.inner
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("options", &self.options)
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Produces configured environments.
pub trait EnvironmentFactory {
    /// Builds a new environment.
    fn create_environment(&self) -> Environment;
}

/// Builds MiniJinja environments from a loader, options and extensions.
///
/// ```rust
/// use std::sync::Arc;
/// use template_renderer::engine::{
///     ArrayLoader, EnvironmentFactory, EnvironmentOptions, JinjaEnvironmentFactory, TextExtension,
/// };
///
/// let loader = Arc::new(ArrayLoader::new([("hi", "{{ 'hi' | nl }}")]));
/// let factory = JinjaEnvironmentFactory::new(
///     loader,
///     EnvironmentOptions::default(),
///     vec![Arc::new(TextExtension)],
/// )
/// .unwrap();
///
/// let env = factory.create_environment();
/// assert!(env.has_extension("text"));
/// ```
pub struct JinjaEnvironmentFactory {
    loader: Arc<dyn TemplateLoader>,
    options: EnvironmentOptions,
    extensions: Vec<Arc<dyn Extension>>,
}

impl JinjaEnvironmentFactory {
    /// Creates a factory after validating every extension.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidInput`] if an extension has an empty name
    /// - [`RenderError::TypeMismatch`] if an extension provides nothing
    pub fn new(
        loader: Arc<dyn TemplateLoader>,
        options: EnvironmentOptions,
        extensions: Vec<Arc<dyn Extension>>,
    ) -> Result<Self, RenderError> {
        for (position, extension) in extensions.iter().enumerate() {
            validate_extension(position, extension.as_ref())?;
        }

        Ok(Self {
            loader,
            options,
            extensions,
        })
    }

    pub fn loader(&self) -> &Arc<dyn TemplateLoader> {
        &self.loader
    }

    pub fn options(&self) -> &EnvironmentOptions {
        &self.options
    }

    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }
}

impl EnvironmentFactory for JinjaEnvironmentFactory {
    fn create_environment(&self) -> Environment {
        let mut environment = Environment::new(self.loader.clone(), self.options.clone());
        for extension in &self.extensions {
            environment.add_extension(extension.as_ref());
        }
        tracing::debug!(
            extensions = environment.extensions().len(),
            "environment created"
        );
        environment
    }
}

impl fmt::Debug for JinjaEnvironmentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.extensions.iter().map(|ext| ext.name()).collect();
        f.debug_struct("JinjaEnvironmentFactory")
            .field("options", &self.options)
            .field("extensions", &names)
            .finish()
    }
}

fn validate_extension(position: usize, extension: &dyn Extension) -> Result<(), RenderError> {
    if extension.name().is_empty() {
        return Err(RenderError::invalid_input(format!(
            "The extension at position {} must have a name.",
            position
        )));
    }

    if extension.provides().is_empty() {
        return Err(RenderError::type_mismatch(format!(
            "The extension \"{}\" does not provide any filter, function, test or global.",
            extension.name()
        )));
    }

    Ok(())
}
