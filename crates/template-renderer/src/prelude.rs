//! Rendering prelude for convenient imports.
//!
//! ```rust
//! use template_renderer::prelude::*;
//!
//! let collection = ContextCollection::new();
//! let map: ContextMap = context_map([("title", "Home")]);
//! assert!(collection.is_empty());
//! assert_eq!(map.len(), 1);
//! ```

// Context
pub use crate::context::{context_map, ContextCollection, ContextKey, ContextMap};

// Renderers
pub use crate::engine::EngineTemplateRenderer;
pub use crate::template::{FileTemplateRenderer, TemplateRenderer};

// Engine setup
pub use crate::engine::{
    EnvironmentFactory, EnvironmentOptions, Extension, JinjaEnvironmentFactory, LoaderFactory,
    TemplateLoader,
};

pub use crate::error::RenderError;
