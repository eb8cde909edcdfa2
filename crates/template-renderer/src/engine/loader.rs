//! Template loaders for the MiniJinja backend.
//!
//! A loader turns a template name into template source. Three variants are
//! provided:
//!
//! | Loader | Source of templates |
//! |--------|---------------------|
//! | [`FilesystemLoader`] | Search directories, optionally grouped under namespaces |
//! | [`ArrayLoader`] | An in-memory map of name to source |
//! | [`ChainLoader`] | Other loaders, tried in order |
//!
//! Loaders are normally built and validated through
//! [`LoaderFactory`](super::LoaderFactory).
//!
//! # Namespaces
//!
//! A filesystem loader keeps its search paths per namespace. Names of the
//! form `@admin/users/list.html` are looked up in the paths of the `admin`
//! namespace; any other name uses [`MAIN_NAMESPACE`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::RenderError;
use crate::fs::{Filesystem, RealFilesystem};

/// Namespace used for paths registered without one.
pub const MAIN_NAMESPACE: &str = "__main__";

/// A source of template code.
///
/// `load` returns `Ok(None)` when this loader does not know the template, so
/// that a [`ChainLoader`] can move on to the next loader. `Err` is reserved
/// for names the loader refuses outright and for I/O failures.
pub trait TemplateLoader: Send + Sync {
    /// Returns the source of `name`, if this loader has it.
    fn load(&self, name: &str) -> Result<Option<String>, RenderError>;

    /// Whether this loader can provide `name`.
    fn exists(&self, name: &str) -> bool {
        matches!(self.load(name), Ok(Some(_)))
    }

    /// A key identifying the current source of `name` for caching layers.
    fn cache_key(&self, name: &str) -> Result<String, RenderError>;
}

// ============================================================================
// Filesystem loader
// ============================================================================

/// Loads templates from directories on disk.
///
/// Search paths are tried in registration order; the first directory that
/// contains the file wins. Relative paths are resolved against the loader's
/// root path.
pub struct FilesystemLoader {
    paths: IndexMap<String, Vec<PathBuf>>,
    root_path: PathBuf,
    fs: Arc<dyn Filesystem>,
}

impl FilesystemLoader {
    /// Creates a loader with no search paths.
    ///
    /// With `root_path` set to `None`, relative paths resolve against the
    /// current working directory.
    pub fn new(root_path: Option<&Path>) -> Self {
        Self::with_filesystem(root_path, Arc::new(RealFilesystem))
    }

    /// Creates a loader backed by an explicit filesystem.
    pub fn with_filesystem(root_path: Option<&Path>, fs: Arc<dyn Filesystem>) -> Self {
        let root_path = match root_path {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        Self {
            paths: IndexMap::new(),
            root_path,
            fs,
        }
    }

    /// The directory relative search paths are resolved against.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Appends a search path to `namespace`.
    ///
    /// # Errors
    ///
    /// [`RenderError::NotFound`] or [`RenderError::InvalidResource`] if the
    /// resolved path is not an existing directory.
    pub fn add_path(&mut self, path: impl AsRef<Path>, namespace: &str) -> Result<(), RenderError> {
        let resolved = self.checked_dir(path.as_ref())?;
        tracing::debug!(path = %resolved.display(), namespace, "adding template path");
        self.paths
            .entry(namespace.to_string())
            .or_default()
            .push(resolved);
        Ok(())
    }

    /// Inserts a search path in front of the existing ones of `namespace`.
    pub fn prepend_path(
        &mut self,
        path: impl AsRef<Path>,
        namespace: &str,
    ) -> Result<(), RenderError> {
        let resolved = self.checked_dir(path.as_ref())?;
        self.paths
            .entry(namespace.to_string())
            .or_default()
            .insert(0, resolved);
        Ok(())
    }

    /// Search paths registered for `namespace`, in lookup order.
    pub fn paths(&self, namespace: &str) -> &[PathBuf] {
        self.paths.get(namespace).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Namespaces that have at least one search path, in registration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Resolves `name` to a template file, if one of the search paths has it.
    pub fn find_template(&self, name: &str) -> Result<Option<PathBuf>, RenderError> {
        let name = normalize_name(name);
        validate_name(&name)?;
        let (namespace, short_name) = parse_name(&name)?;

        let Some(dirs) = self.paths.get(namespace) else {
            tracing::debug!(template = %name, namespace, "no paths registered for namespace");
            return Ok(None);
        };

        for dir in dirs {
            let candidate = join_name(dir, short_name);
            if self.fs.is_file(&candidate) {
                tracing::debug!(template = %name, path = %candidate.display(), "template found");
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_path.join(path)
        }
    }

    fn checked_dir(&self, path: &Path) -> Result<PathBuf, RenderError> {
        let resolved = self.resolve(path);
        if !self.fs.exists(&resolved) {
            return Err(RenderError::not_found(resolved));
        }
        if !self.fs.is_dir(&resolved) {
            return Err(RenderError::invalid_resource(format!(
                "The path \"{}\" must point to a templates directory, not to a file.",
                resolved.display()
            )));
        }
        Ok(resolved)
    }
}

impl TemplateLoader for FilesystemLoader {
    fn load(&self, name: &str) -> Result<Option<String>, RenderError> {
        match self.find_template(name)? {
            Some(path) => Ok(Some(self.fs.read_to_string(&path)?)),
            None => Ok(None),
        }
    }

    fn exists(&self, name: &str) -> bool {
        matches!(self.find_template(name), Ok(Some(_)))
    }

    fn cache_key(&self, name: &str) -> Result<String, RenderError> {
        let path = self
            .find_template(name)?
            .ok_or_else(|| RenderError::not_found(name))?;
        // Relative to the root so keys do not depend on where the project lives.
        let key = path.strip_prefix(&self.root_path).unwrap_or(path.as_path());
        Ok(key.to_string_lossy().into_owned())
    }
}

impl fmt::Debug for FilesystemLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilesystemLoader")
            .field("paths", &self.paths)
            .field("root_path", &self.root_path)
            .finish()
    }
}

fn normalize_name(name: &str) -> String {
    let mut normalized = name.replace('\\', "/");
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }
    normalized
}

/// Rejects names with NUL bytes and names that climb above their search
/// path through `..` segments.
fn validate_name(name: &str) -> Result<(), RenderError> {
    if name.contains('\0') {
        return Err(RenderError::invalid_input(
            "A template name cannot contain NUL bytes.",
        ));
    }

    let mut level: i32 = 0;
    for part in name.trim_start_matches('/').split('/') {
        match part {
            ".." => level -= 1,
            "." | "" => {}
            _ => level += 1,
        }
        if level < 0 {
            return Err(RenderError::invalid_input(format!(
                "The template \"{}\" points outside the configured directories.",
                name
            )));
        }
    }

    Ok(())
}

/// Joins a validated name onto `dir`, folding `.` and `..` segments.
fn join_name(dir: &Path, name: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();
    for part in name.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(part),
        }
    }
    segments.iter().fold(dir.to_path_buf(), |path, part| path.join(part))
}

/// Splits `@namespace/rest` into its parts. Other names belong to the main
/// namespace.
fn parse_name(name: &str) -> Result<(&str, &str), RenderError> {
    let Some(namespaced) = name.strip_prefix('@') else {
        return Ok((MAIN_NAMESPACE, name.trim_start_matches('/')));
    };

    match namespaced.split_once('/') {
        Some((namespace, short_name)) if !namespace.is_empty() => Ok((namespace, short_name)),
        _ => Err(RenderError::invalid_input(format!(
            "Malformed namespaced template name \"{}\" (expecting \"@namespace/template_name\").",
            name
        ))),
    }
}

// ============================================================================
// Array loader
// ============================================================================

/// Loads templates from an in-memory map of name to source.
///
/// The cache key of a template is `name:source`, so it changes whenever the
/// source does. A caching layer keyed on it will accumulate one entry per
/// version of a template; removing stale entries is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct ArrayLoader {
    templates: IndexMap<String, String>,
}

impl ArrayLoader {
    /// Creates a loader from `(name, source)` pairs.
    pub fn new<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            templates: templates
                .into_iter()
                .map(|(name, source)| (name.into(), source.into()))
                .collect(),
        }
    }

    /// Adds or replaces a template.
    pub fn set_template(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }

    /// Names of all templates, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the loader holds no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateLoader for ArrayLoader {
    fn load(&self, name: &str) -> Result<Option<String>, RenderError> {
        Ok(self.templates.get(name).cloned())
    }

    fn exists(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn cache_key(&self, name: &str) -> Result<String, RenderError> {
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::not_found(name))?;
        Ok(format!("{}:{}", name, source))
    }
}

// ============================================================================
// Chain loader
// ============================================================================

/// Tries several loaders in order and returns the first hit.
///
/// A loader that fails is skipped. If no loader has the template and at
/// least one failed, the first failure is returned.
#[derive(Clone, Default)]
pub struct ChainLoader {
    loaders: Vec<Arc<dyn TemplateLoader>>,
}

impl ChainLoader {
    /// Creates a chain from `loaders`, tried in the given order.
    pub fn new(loaders: Vec<Arc<dyn TemplateLoader>>) -> Self {
        Self { loaders }
    }

    /// Appends a loader at the end of the chain.
    pub fn add_loader(&mut self, loader: Arc<dyn TemplateLoader>) {
        self.loaders.push(loader);
    }

    /// The loaders in lookup order.
    pub fn loaders(&self) -> &[Arc<dyn TemplateLoader>] {
        &self.loaders
    }
}

impl TemplateLoader for ChainLoader {
    fn load(&self, name: &str) -> Result<Option<String>, RenderError> {
        let mut first_error = None;

        for (position, loader) in self.loaders.iter().enumerate() {
            match loader.load(name) {
                Ok(Some(source)) => {
                    tracing::debug!(template = name, position, "resolved by chained loader");
                    return Ok(Some(source));
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!(template = name, position, error = %err, "chained loader failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.loaders.iter().any(|loader| loader.exists(name))
    }

    fn cache_key(&self, name: &str) -> Result<String, RenderError> {
        self.loaders
            .iter()
            .find(|loader| loader.exists(name))
            .ok_or_else(|| RenderError::not_found(name))?
            .cache_key(name)
    }
}

impl fmt::Debug for ChainLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainLoader")
            .field("loaders", &self.loaders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFilesystem;

    fn mock_fs() -> Arc<MockFilesystem> {
        Arc::new(
            MockFilesystem::new()
                .with_file("/app/templates/index.html", "main index")
                .with_file("/app/templates/users/list.html", "user list")
                .with_file("/app/fallback/index.html", "fallback index")
                .with_file("/app/fallback/only_here.html", "only fallback")
                .with_file("/app/admin/dashboard.html", "admin dashboard"),
        )
    }

    fn fs_loader() -> FilesystemLoader {
        let mut loader = FilesystemLoader::with_filesystem(Some(Path::new("/app")), mock_fs());
        loader.add_path("templates", MAIN_NAMESPACE).unwrap();
        loader.add_path("fallback", MAIN_NAMESPACE).unwrap();
        loader.add_path("/app/admin", "admin").unwrap();
        loader
    }

    #[test]
    fn filesystem_first_path_wins() {
        let loader = fs_loader();
        assert_eq!(loader.load("index.html").unwrap().as_deref(), Some("main index"));
        assert_eq!(
            loader.load("only_here.html").unwrap().as_deref(),
            Some("only fallback")
        );
    }

    #[test]
    fn filesystem_prepend_path_takes_priority() {
        let mut loader = fs_loader();
        loader.prepend_path("fallback", MAIN_NAMESPACE).unwrap();
        assert_eq!(
            loader.load("index.html").unwrap().as_deref(),
            Some("fallback index")
        );
    }

    #[test]
    fn filesystem_nested_names() {
        let loader = fs_loader();
        assert_eq!(
            loader.load("users/list.html").unwrap().as_deref(),
            Some("user list")
        );
        assert_eq!(
            loader.load("users//list.html").unwrap().as_deref(),
            Some("user list")
        );
    }

    #[test]
    fn filesystem_namespaced_lookup() {
        let loader = fs_loader();
        assert_eq!(
            loader.load("@admin/dashboard.html").unwrap().as_deref(),
            Some("admin dashboard")
        );
        // not visible from the main namespace
        assert_eq!(loader.load("dashboard.html").unwrap(), None);
        // unknown namespace is simply not handled
        assert_eq!(loader.load("@other/dashboard.html").unwrap(), None);
    }

    #[test]
    fn filesystem_malformed_namespace() {
        let loader = fs_loader();
        let err = loader.load("@admin").unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn filesystem_rejects_escaping_names() {
        let loader = fs_loader();
        assert!(loader.load("../secret.txt").is_err());
        assert!(loader.load("users/../../secret.txt").is_err());
        // climbing back down inside the directory is fine
        assert_eq!(
            loader.load("users/../index.html").unwrap().as_deref(),
            Some("main index")
        );
    }

    #[test]
    fn filesystem_rejects_nul_bytes() {
        let loader = fs_loader();
        assert!(loader.load("index\0.html").is_err());
    }

    #[test]
    fn filesystem_add_path_validates() {
        let mut loader = FilesystemLoader::with_filesystem(Some(Path::new("/app")), mock_fs());
        assert!(matches!(
            loader.add_path("nope", MAIN_NAMESPACE),
            Err(RenderError::NotFound { .. })
        ));
        assert!(matches!(
            loader.add_path("templates/index.html", MAIN_NAMESPACE),
            Err(RenderError::InvalidResource(_))
        ));
        assert!(loader.namespaces().next().is_none());
    }

    #[test]
    fn filesystem_paths_and_namespaces() {
        let loader = fs_loader();
        let namespaces: Vec<&str> = loader.namespaces().collect();
        assert_eq!(namespaces, vec![MAIN_NAMESPACE, "admin"]);
        assert_eq!(
            loader.paths(MAIN_NAMESPACE),
            &[
                PathBuf::from("/app/templates"),
                PathBuf::from("/app/fallback")
            ]
        );
        assert!(loader.paths("missing").is_empty());
    }

    #[test]
    fn filesystem_cache_key_is_relative_to_root() {
        let loader = fs_loader();
        assert_eq!(
            loader.cache_key("users/list.html").unwrap(),
            "templates/users/list.html"
        );
        assert!(loader.cache_key("missing.html").is_err());
    }

    #[test]
    fn array_loader_basics() {
        let mut loader = ArrayLoader::new([("a.html", "A")]);
        loader.set_template("b.html", "B");

        assert_eq!(loader.len(), 2);
        assert!(loader.exists("a.html"));
        assert_eq!(loader.load("b.html").unwrap().as_deref(), Some("B"));
        assert_eq!(loader.load("c.html").unwrap(), None);
    }

    #[test]
    fn array_loader_cache_key_tracks_source() {
        let mut loader = ArrayLoader::new([("page", "v1")]);
        let first = loader.cache_key("page").unwrap();
        loader.set_template("page", "v2");
        let second = loader.cache_key("page").unwrap();

        assert_eq!(first, "page:v1");
        assert_eq!(second, "page:v2");
    }

    #[test]
    fn chain_loader_first_hit_wins() {
        let first: Arc<dyn TemplateLoader> = Arc::new(ArrayLoader::new([("shared", "first")]));
        let second: Arc<dyn TemplateLoader> = Arc::new(ArrayLoader::new([
            ("shared", "second"),
            ("extra", "extra"),
        ]));
        let chain = ChainLoader::new(vec![first, second]);

        assert_eq!(chain.load("shared").unwrap().as_deref(), Some("first"));
        assert_eq!(chain.load("extra").unwrap().as_deref(), Some("extra"));
        assert_eq!(chain.load("none").unwrap(), None);
        assert!(chain.exists("extra"));
        assert_eq!(chain.cache_key("extra").unwrap(), "extra:extra");
    }

    #[test]
    fn chain_loader_skips_failing_loaders() {
        let failing: Arc<dyn TemplateLoader> = Arc::new(fs_loader());
        let memory: Arc<dyn TemplateLoader> = Arc::new(ArrayLoader::new([("@bad", "from memory")]));
        let chain = ChainLoader::new(vec![failing.clone(), memory]);

        // the filesystem loader rejects the name, the array loader has it
        assert_eq!(chain.load("@bad").unwrap().as_deref(), Some("from memory"));

        let only_failing = ChainLoader::new(vec![failing]);
        assert!(only_failing.load("@bad").is_err());
    }

    #[test]
    fn empty_chain_has_nothing() {
        let chain = ChainLoader::default();
        assert_eq!(chain.load("x").unwrap(), None);
        assert!(chain.loaders().is_empty());
    }
}
