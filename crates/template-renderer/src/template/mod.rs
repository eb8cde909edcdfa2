//! The renderer contract and the file backend.
//!
//! Every backend implements [`TemplateRenderer`]: render a named template
//! with a set of context values and return the output. What the backends
//! share lives in [`RendererCore`], which each one composes:
//!
//! - template name normalization ([`build_template_name`])
//! - merging per-call context into the owned [`ContextCollection`]
//!
//! ## Context accumulation
//!
//! A renderer keeps one collection for its whole lifetime. Per-call context
//! overwrites same-named keys and leaves the others in place, so values
//! accumulate from one `render` to the next until the caller clears them:
//!
//! ```rust,ignore
//! renderer.render("a.tpl", context_map([("title", "A")]))?;
//! renderer.render("b.tpl", context_map([("user", "bob")]))?; // sees title and user
//! renderer.context_collection_mut().clear();
//! ```
//!
//! ## Backends
//!
//! - [`FileTemplateRenderer`]: executes raw template files found under a
//!   root directory (see [`simple`] for the placeholder syntax)
//! - [`EngineTemplateRenderer`](crate::engine::EngineTemplateRenderer):
//!   delegates to a configured MiniJinja environment
//!
//! ## See Also
//!
//! - [`crate::context`]: the collection and its key policy
//! - [`crate::engine`]: loaders, environment factory and extensions

mod capture;
mod file;
mod renderer;
pub mod simple;

pub use capture::{capture_level, OutputCapture};
pub use file::FileTemplateRenderer;
pub use renderer::{build_template_name, RendererCore, TemplateRenderer};
pub use simple::{execute, Scope};
