//! The MiniJinja backend.
//!
//! Setting up the engine backend takes three steps:
//!
//! 1. Build a loader with [`LoaderFactory`] (filesystem, in-memory or a chain)
//! 2. Configure a [`JinjaEnvironmentFactory`] with the loader,
//!    [`EnvironmentOptions`] and any [`Extension`]s
//! 3. Hand an environment to an [`EngineTemplateRenderer`]
//!
//! ```rust
//! use std::sync::Arc;
//! use template_renderer::context::context_map;
//! use template_renderer::engine::{
//!     EngineTemplateRenderer, EnvironmentFactory, EnvironmentOptions,
//!     JinjaEnvironmentFactory, LoaderFactory, TextExtension,
//! };
//! use template_renderer::{ContextCollection, TemplateRenderer};
//!
//! let loader = LoaderFactory::new()
//!     .create_array_loader([("greet.txt", "{{ 'Hello' | nl }}{{ name }}")])
//!     .unwrap();
//! let factory = JinjaEnvironmentFactory::new(
//!     Arc::new(loader),
//!     EnvironmentOptions::default(),
//!     vec![Arc::new(TextExtension)],
//! )
//! .unwrap();
//!
//! let mut renderer =
//!     EngineTemplateRenderer::new(factory.create_environment(), ContextCollection::new());
//! let output = renderer.render("greet.txt", context_map([("name", "Ada")])).unwrap();
//! assert_eq!(output, "Hello\nAda");
//! ```
//!
//! Unlike file templates, engine templates render undefined variables as
//! empty text unless `strict_variables` is set.

mod environment;
mod extension;
mod loader;
mod loader_factory;
mod options;
mod renderer;

pub use environment::{Environment, EnvironmentFactory, JinjaEnvironmentFactory};
pub use extension::{Extension, FnExtension, TextExtension};
pub use loader::{ArrayLoader, ChainLoader, FilesystemLoader, TemplateLoader, MAIN_NAMESPACE};
pub use loader_factory::{LoaderFactory, TemplatePaths};
pub use options::{AutoEscapeStrategy, EnvironmentOptions};
pub use renderer::EngineTemplateRenderer;
