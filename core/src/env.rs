//! Environment capabilities injected into the engine.
//!
//! The engine performs no I/O of its own. Reading files, expanding globs and
//! loading configuration modules are delegated to an [`Environment`]
//! supplied by the caller. Failures degrade to "nothing there" so the
//! pipeline never unwinds on I/O.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::value::ConfigValue;

/// Reasons a configuration module could not be loaded.
///
/// The engine treats every variant the same way (the module is absent); the
/// distinction exists for logging and for callers using the loader directly.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Nothing exists at the path or any of its candidates.
    #[error("module not found: {0}")]
    NotFound(PathBuf),

    /// The module exists but could not be read.
    #[error("failed to read module '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The module was read but its contents are not valid.
    #[error("failed to parse module '{path}': {message}")]
    Parse { path: PathBuf, message: String },
}

/// A configuration module and the file it was actually read from.
///
/// The path may differ from the requested one when the loader resolves a
/// directory or an extensionless path to a concrete file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModule {
    pub path: PathBuf,
    pub value: ConfigValue,
}

/// Capabilities the engine needs from its host.
pub trait Environment: Send + Sync {
    /// Working directory used as the base for command-line paths and defaults.
    fn cwd(&self) -> &Path;

    /// Reads `file` relative to `base_dir`, returning `None` on any failure.
    fn read_file(&self, file: &str, base_dir: &Path) -> Option<String>;

    /// Loads the configuration module at `path`.
    fn load_module(&self, path: &Path) -> Result<LoadedModule, LoadError>;

    /// Expands `pattern` relative to `cwd`, in matcher order.
    fn glob(&self, pattern: &str, cwd: &Path) -> Vec<String>;
}

/// An in-memory [`Environment`].
///
/// Files and modules are registered by absolute path; glob results are
/// registered per `(pattern, cwd)` pair and returned verbatim.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use optlayer_core::{Environment, MemoryEnvironment};
///
/// let env = MemoryEnvironment::new("/work")
///     .with_file("/work/notes.txt", "hello")
///     .with_module("/work/app.config.json", serde_json::json!({ "options": {} }))
///     .with_glob("*.txt", "/work", ["notes.txt"]);
///
/// assert_eq!(env.read_file("notes.txt", Path::new("/work")).as_deref(), Some("hello"));
/// assert!(env.load_module(Path::new("/work/app.config.json")).is_ok());
/// assert!(env.load_module(Path::new("/work/missing.json")).is_err());
/// assert_eq!(env.glob("*.txt", Path::new("/work")), vec!["notes.txt".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryEnvironment {
    cwd: PathBuf,
    files: HashMap<PathBuf, String>,
    modules: HashMap<PathBuf, ConfigValue>,
    globs: HashMap<(String, PathBuf), Vec<String>>,
}

impl MemoryEnvironment {
    /// Creates an empty environment rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Default::default()
        }
    }

    /// Registers a readable file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Registers a loadable module under its normalized path.
    pub fn with_module(mut self, path: impl Into<PathBuf>, module: impl Into<ConfigValue>) -> Self {
        let path: PathBuf = path.into();
        self.modules.insert(crate::path::normalize(&path), module.into());
        self
    }

    /// Registers the result of expanding `pattern` in `cwd`.
    pub fn with_glob<I, S>(mut self, pattern: &str, cwd: impl Into<PathBuf>, matches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globs.insert(
            (pattern.to_string(), cwd.into()),
            matches.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl Environment for MemoryEnvironment {
    fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn read_file(&self, file: &str, base_dir: &Path) -> Option<String> {
        self.files.get(&crate::path::join(base_dir, file)).cloned()
    }

    fn load_module(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        let path = crate::path::normalize(path);
        match self.modules.get(&path) {
            Some(value) => Ok(LoadedModule {
                value: value.clone(),
                path,
            }),
            None => Err(LoadError::NotFound(path)),
        }
    }

    fn glob(&self, pattern: &str, cwd: &Path) -> Vec<String> {
        self.globs
            .get(&(pattern.to_string(), cwd.to_path_buf()))
            .cloned()
            .unwrap_or_default()
    }
}
