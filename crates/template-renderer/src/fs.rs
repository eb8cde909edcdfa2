//! Filesystem abstraction for testability.
//!
//! Renderers and loaders only ever ask the filesystem four questions. Routing
//! them through [`Filesystem`] lets tests run against [`MockFilesystem`]
//! instead of real directories.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read-only filesystem queries used by the renderers and loaders.
pub trait Filesystem: Send + Sync {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Whether `path` is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Reads the whole file at `path` as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

// === Real implementation ===

/// Filesystem backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

// === Mock implementation for testing ===

/// In-memory filesystem for tests.
///
/// Adding a file also registers every ancestor directory. Paths are compared
/// after lexical normalization, so `a/./b` and `a/b` are the same entry.
///
/// ```rust
/// use std::path::Path;
/// use template_renderer::fs::{Filesystem, MockFilesystem};
///
/// let fs = MockFilesystem::new().with_file("/tpl/hello.tpl", "Hello {name}");
///
/// assert!(fs.is_dir(Path::new("/tpl")));
/// assert!(fs.is_file(Path::new("/tpl/hello.tpl")));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockFilesystem {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

impl MockFilesystem {
    /// Create an empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory (and its ancestors).
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path);
        self
    }

    /// Add a file with the given content (and its ancestor directories).
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        let path = normalize(path.as_ref());
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path, content.into());
        self
    }

    fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl Filesystem for MockFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.is_dir(path) || self.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(&normalize(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}

/// Lexically normalizes a path: drops `.` components and trailing
/// separators. `..` components are kept as they are.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
