//! # Template Renderer - Backend-Agnostic Template Rendering
//!
//! `template-renderer` renders named templates with an accumulating set of
//! context values, behind one trait that works the same for every backend.
//!
//! ## Core Concepts
//!
//! - [`ContextCollection`]: Ordered key/value store passed to templates,
//!   usable as a map or as a stack/queue of positional values
//! - [`TemplateRenderer`]: The contract every backend implements
//! - [`FileTemplateRenderer`]: Executes raw template files under a root directory
//! - [`EngineTemplateRenderer`]: Delegates to a configured MiniJinja environment
//! - [`RenderError`]: The single error type of the crate
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use template_renderer::context::context_map;
//! use template_renderer::fs::MockFilesystem;
//! use template_renderer::{ContextCollection, FileTemplateRenderer, TemplateRenderer};
//!
//! let fs = MockFilesystem::new()
//!     .with_file("/views/header.tpl", "== {title} ==")
//!     .with_file("/views/body.tpl", "{title}: {user.name}");
//!
//! let mut renderer =
//!     FileTemplateRenderer::with_filesystem("/views", ContextCollection::new(), Arc::new(fs))
//!         .unwrap();
//!
//! renderer.render("header.tpl", context_map([("title", "Report")])).unwrap();
//!
//! // `title` is still in the collection from the previous call
//! let mut context = template_renderer::ContextMap::new();
//! context.insert(
//!     "user".into(),
//!     minijinja::Value::from_serialize(&serde_json::json!({"name": "Ada"})),
//! );
//! let body = renderer.render("body.tpl", context).unwrap();
//! assert_eq!(body, "Report: Ada");
//! ```
//!
//! ## Choosing a Backend
//!
//! The file backend has no dependencies beyond a directory and supports
//! `{placeholder}` substitution only (see [`template::simple`]). The engine
//! backend supports the full MiniJinja language, loaders with namespaces
//! and extensions (see [`engine`]). Both take the same calls:
//!
//! ```rust,ignore
//! fn page(renderer: &mut dyn TemplateRenderer) -> Result<String, RenderError> {
//!     renderer.render("page", context_map([("title", "Home")]))
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`debug` for renders and loader
//! resolution, `warn` for ignored options) and installs no subscriber.

pub mod context;
pub mod engine;
mod error;
pub mod fs;
pub mod prelude;
pub mod template;
pub mod util;

// Error type
pub use error::RenderError;

// Context exports
pub use context::{ContextCollection, ContextKey, ContextMap};

// Renderer contract and file backend
pub use template::{FileTemplateRenderer, RendererCore, TemplateRenderer};

// Engine backend exports
pub use engine::{
    EngineTemplateRenderer, Environment, EnvironmentFactory, EnvironmentOptions,
    JinjaEnvironmentFactory, LoaderFactory,
};
