//! Validated construction of template loaders.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use super::loader::{ArrayLoader, ChainLoader, FilesystemLoader, TemplateLoader, MAIN_NAMESPACE};
use crate::error::RenderError;
use crate::fs::{Filesystem, RealFilesystem};

/// Search paths for a filesystem loader.
///
/// Positional entries register under the main namespace. Keyed entries name
/// their namespace, which is only honoured when namespaces are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePaths {
    Positional(Vec<String>),
    Keyed(Vec<(String, String)>),
}

impl TemplatePaths {
    fn entries(&self) -> Vec<(Option<&str>, &str)> {
        match self {
            TemplatePaths::Positional(paths) => {
                paths.iter().map(|path| (None, path.as_str())).collect()
            }
            TemplatePaths::Keyed(paths) => paths
                .iter()
                .map(|(key, path)| (Some(key.as_str()), path.as_str()))
                .collect(),
        }
    }
}

impl Default for TemplatePaths {
    fn default() -> Self {
        TemplatePaths::Positional(Vec::new())
    }
}

impl From<&str> for TemplatePaths {
    fn from(path: &str) -> Self {
        TemplatePaths::Positional(vec![path.to_string()])
    }
}

impl From<String> for TemplatePaths {
    fn from(path: String) -> Self {
        TemplatePaths::Positional(vec![path])
    }
}

impl From<Vec<String>> for TemplatePaths {
    fn from(paths: Vec<String>) -> Self {
        TemplatePaths::Positional(paths)
    }
}

impl From<Vec<&str>> for TemplatePaths {
    fn from(paths: Vec<&str>) -> Self {
        TemplatePaths::Positional(paths.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TemplatePaths {
    fn from(paths: [&str; N]) -> Self {
        TemplatePaths::Positional(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl From<Vec<(&str, &str)>> for TemplatePaths {
    fn from(paths: Vec<(&str, &str)>) -> Self {
        TemplatePaths::Keyed(
            paths
                .into_iter()
                .map(|(key, path)| (key.to_string(), path.to_string()))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for TemplatePaths {
    fn from(paths: [(&str, &str); N]) -> Self {
        TemplatePaths::from(paths.to_vec())
    }
}

impl From<IndexMap<String, String>> for TemplatePaths {
    fn from(paths: IndexMap<String, String>) -> Self {
        TemplatePaths::Keyed(paths.into_iter().collect())
    }
}

/// Builds loaders after checking their inputs.
///
/// Every check runs before the loader is returned, so a loader handed out
/// by the factory never refers to a missing directory.
pub struct LoaderFactory {
    fs: Arc<dyn Filesystem>,
}

impl Default for LoaderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderFactory {
    /// A factory checking paths on the real filesystem.
    pub fn new() -> Self {
        Self::with_filesystem(Arc::new(RealFilesystem))
    }

    pub fn with_filesystem(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }

    /// Creates a filesystem loader over `paths`.
    ///
    /// Relative paths resolve against `root_path`, or the current working
    /// directory when it is `None` or empty.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidInput`] for an empty path, or for an entry
    ///   without a namespace when namespaces are enabled
    /// - [`RenderError::NotFound`] if a path does not exist
    /// - [`RenderError::InvalidResource`] if a path is not a directory
    pub fn create_filesystem_loader(
        &self,
        paths: impl Into<TemplatePaths>,
        root_path: Option<&str>,
        enable_namespaces: bool,
    ) -> Result<FilesystemLoader, RenderError> {
        let paths = paths.into();
        let root_path = root_path.filter(|root| !root.is_empty()).map(Path::new);
        let mut loader = FilesystemLoader::with_filesystem(root_path, self.fs.clone());

        for (key, path) in paths.entries() {
            self.validate_path(path, root_path)?;

            let namespace = if enable_namespaces {
                match key {
                    Some(namespace) if !namespace.is_empty() => namespace,
                    _ => {
                        return Err(RenderError::invalid_input(format!(
                            "A namespace for the path \"{}\" must be provided.",
                            path
                        )))
                    }
                }
            } else {
                MAIN_NAMESPACE
            };

            loader.add_path(path, namespace)?;
        }

        tracing::debug!(
            namespaces = loader.namespaces().count(),
            root = %loader.root_path().display(),
            "filesystem loader created"
        );
        Ok(loader)
    }

    /// Creates an in-memory loader from `(name, source)` pairs.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidInput`] if a template name is empty.
    pub fn create_array_loader<I, K, V>(&self, templates: I) -> Result<ArrayLoader, RenderError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut loader = ArrayLoader::default();
        for (name, source) in templates {
            let name = name.into();
            if name.is_empty() {
                return Err(RenderError::invalid_input(
                    "A template name must be provided for every array template.",
                ));
            }
            loader.set_template(name, source);
        }
        Ok(loader)
    }

    /// Chains `loaders`, tried in the order given.
    pub fn create_chain_loader(&self, loaders: Vec<Arc<dyn TemplateLoader>>) -> ChainLoader {
        ChainLoader::new(loaders)
    }

    fn validate_path(&self, path: &str, root_path: Option<&Path>) -> Result<(), RenderError> {
        if path.is_empty() {
            return Err(RenderError::invalid_input(
                "A path where to look for templates must be provided.",
            ));
        }

        let resolved: PathBuf = match root_path {
            Some(root) if Path::new(path).is_relative() => root.join(path),
            _ => PathBuf::from(path),
        };

        if !self.fs.exists(&resolved) {
            return Err(RenderError::not_found(resolved));
        }

        if !self.fs.is_dir(&resolved) {
            return Err(RenderError::invalid_resource(format!(
                "The path \"{}\" must point to a templates directory, not to a file.",
                path
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for LoaderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderFactory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFilesystem;

    fn factory() -> LoaderFactory {
        LoaderFactory::with_filesystem(Arc::new(
            MockFilesystem::new()
                .with_file("/site/views/index.html", "index")
                .with_file("/site/views/note.txt", "note")
                .with_file("/site/admin/panel.html", "panel"),
        ))
    }

    #[test]
    fn test_single_path() {
        let loader = factory()
            .create_filesystem_loader("/site/views", None, false)
            .unwrap();
        assert_eq!(loader.load("index.html").unwrap().as_deref(), Some("index"));
    }

    #[test]
    fn test_relative_paths_use_root() {
        let loader = factory()
            .create_filesystem_loader(["views", "admin"], Some("/site"), false)
            .unwrap();
        assert_eq!(loader.paths(MAIN_NAMESPACE).len(), 2);
        assert_eq!(loader.load("panel.html").unwrap().as_deref(), Some("panel"));
    }

    #[test]
    fn test_empty_path_is_invalid_input() {
        let err = factory()
            .create_filesystem_loader("", None, false)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_path_inside_list_fails() {
        let err = factory()
            .create_filesystem_loader(vec!["/site/views", ""], None, false)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));

        let err = factory()
            .create_filesystem_loader([("views", "/site/views"), ("admin", "")], None, true)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let err = factory()
            .create_filesystem_loader("/site/nope", None, false)
            .unwrap_err();
        assert!(matches!(err, RenderError::NotFound { .. }));
    }

    #[test]
    fn test_file_path_is_invalid_resource() {
        let err = factory()
            .create_filesystem_loader("/site/views/note.txt", None, false)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidResource(_)));
    }

    #[test]
    fn test_namespaced_paths() {
        let loader = factory()
            .create_filesystem_loader(
                [("views", "/site/views"), ("admin", "/site/admin")],
                None,
                true,
            )
            .unwrap();

        let namespaces: Vec<&str> = loader.namespaces().collect();
        assert_eq!(namespaces, vec!["views", "admin"]);
        assert_eq!(
            loader.load("@admin/panel.html").unwrap().as_deref(),
            Some("panel")
        );
        assert_eq!(loader.load("panel.html").unwrap(), None);
    }

    #[test]
    fn test_namespaces_require_keys() {
        let err = factory()
            .create_filesystem_loader("/site/views", None, true)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));

        let err = factory()
            .create_filesystem_loader([("", "/site/views")], None, true)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn test_keys_ignored_without_namespaces() {
        let loader = factory()
            .create_filesystem_loader([("admin", "/site/admin")], None, false)
            .unwrap();
        assert_eq!(loader.load("panel.html").unwrap().as_deref(), Some("panel"));
    }

    #[test]
    fn test_path_checks_run_before_namespace_checks() {
        let err = factory()
            .create_filesystem_loader("/site/nope", None, true)
            .unwrap_err();
        assert!(matches!(err, RenderError::NotFound { .. }));
    }

    #[test]
    fn test_array_loader() {
        let loader = factory()
            .create_array_loader([("a.html", "A"), ("b.html", "B")])
            .unwrap();
        assert_eq!(loader.len(), 2);

        let err = factory().create_array_loader([("", "A")]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn test_chain_loader() {
        let factory = factory();
        let views: Arc<dyn TemplateLoader> = Arc::new(
            factory
                .create_filesystem_loader("/site/views", None, false)
                .unwrap(),
        );
        let memory: Arc<dyn TemplateLoader> =
            Arc::new(factory.create_array_loader([("extra.html", "extra")]).unwrap());

        let chain = factory.create_chain_loader(vec![views, memory]);
        assert_eq!(chain.loaders().len(), 2);
        assert_eq!(chain.load("index.html").unwrap().as_deref(), Some("index"));
        assert_eq!(chain.load("extra.html").unwrap().as_deref(), Some("extra"));
    }
}
