//! Renderer backed by a MiniJinja environment.

use super::environment::Environment;
use crate::context::{ContextCollection, ContextMap};
use crate::error::RenderError;
use crate::template::{RendererCore, TemplateRenderer};

/// Renders named templates through a configured [`Environment`].
///
/// Name resolution, escaping and missing-template handling are up to the
/// environment and its loader; errors it raises are returned as
/// [`RenderError::Engine`] without modification.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use template_renderer::context::context_map;
/// use template_renderer::engine::{
///     ArrayLoader, EngineTemplateRenderer, EnvironmentFactory, EnvironmentOptions,
///     JinjaEnvironmentFactory,
/// };
/// use template_renderer::{ContextCollection, TemplateRenderer};
///
/// let loader = Arc::new(ArrayLoader::new([("hello.html", "Hello, {{ name }}!")]));
/// let factory =
///     JinjaEnvironmentFactory::new(loader, EnvironmentOptions::default(), Vec::new()).unwrap();
///
/// let mut renderer =
///     EngineTemplateRenderer::new(factory.create_environment(), ContextCollection::new());
/// let output = renderer
///     .render("hello.html", context_map([("name", "World")]))
///     .unwrap();
/// assert_eq!(output, "Hello, World!");
/// ```
#[derive(Debug)]
pub struct EngineTemplateRenderer {
    core: RendererCore,
    environment: Environment,
}

impl EngineTemplateRenderer {
    pub fn new(environment: Environment, context_collection: ContextCollection) -> Self {
        Self {
            core: RendererCore::new(context_collection),
            environment,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

impl TemplateRenderer for EngineTemplateRenderer {
    fn render(&mut self, template_name: &str, context: ContextMap) -> Result<String, RenderError> {
        let template_name = self.core.build_template_name(template_name)?;
        self.core.save_context_values(context);

        let data = self.core.context_collection().all();
        tracing::debug!(
            template = %template_name,
            values = data.len(),
            "rendering engine template"
        );

        self.environment.render(&template_name, &data)
    }

    fn context_collection(&self) -> &ContextCollection {
        self.core.context_collection()
    }

    fn context_collection_mut(&mut self) -> &mut ContextCollection {
        self.core.context_collection_mut()
    }
}
