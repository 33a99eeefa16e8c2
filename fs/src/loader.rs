//! Filesystem-backed [`Environment`] with a module candidate chain.
//!
//! [`FsEnvironment`] reads files relative to a base directory, expands globs
//! with the `glob` crate, and loads configuration modules written as JSON or
//! YAML.
//!
//! # Module resolution
//!
//! A module path is tried as given, then with each configured extension
//! appended, then as a directory containing `index.<ext>`. The first file
//! that exists wins:
//!
//! ```text
//! conf/app          -> conf/app, conf/app.json, conf/app.yaml, conf/app.yml,
//!                      conf/app/index.json, conf/app/index.yaml, conf/app/index.yml
//! ```
//!
//! ```no_run
//! use std::path::Path;
//! use optlayer_core::Environment;
//! use optlayer_fs::FsEnvironment;
//!
//! let env = FsEnvironment::new("/project");
//! let module = env.load_module(Path::new("/project/app.config")).unwrap();
//! println!("loaded {}", module.path.display());
//! ```

use std::path::{Path, PathBuf};

use optlayer_core::{ConfigValue, Environment, LoadError, LoadedModule, path};

/// Extensions tried when a module path does not name a file.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

const INDEX_STEM: &str = "index";

/// Format a module file is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    Json,
    Yaml,
}

impl ModuleFormat {
    /// Picks the format from a file extension; anything other than
    /// `yaml`/`yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => ModuleFormat::Yaml,
            _ => ModuleFormat::Json,
        }
    }
}

/// An [`Environment`] over the real filesystem.
#[derive(Debug, Clone)]
pub struct FsEnvironment {
    cwd: PathBuf,
    extensions: Vec<String>,
}

impl FsEnvironment {
    /// Creates an environment rooted at `cwd` with the default extensions.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replaces the extensions tried during module resolution, in order.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Every path tried for `path`, in order.
    pub fn candidates(&self, path: &Path) -> Vec<PathBuf> {
        let mut candidates = vec![path.to_path_buf()];
        candidates.extend(self.extensions.iter().map(|ext| with_extension(path, ext)));
        let index = path.join(INDEX_STEM);
        candidates.extend(self.extensions.iter().map(|ext| with_extension(&index, ext)));
        candidates
    }
}

/// Appends `.ext` without replacing an existing extension.
fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Reads and parses one module file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, or
/// [`LoadError::Parse`] if it is not valid JSON or YAML.
pub fn read_module(path: &Path) -> Result<ConfigValue, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let value: serde_json::Value = match ModuleFormat::from_path(path) {
        ModuleFormat::Json => serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
        ModuleFormat::Yaml => serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
    };
    Ok(ConfigValue::from(value))
}

impl Environment for FsEnvironment {
    fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn read_file(&self, file: &str, base_dir: &Path) -> Option<String> {
        let path = path::join(base_dir, file);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "file not read");
                None
            }
        }
    }

    fn load_module(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        let path = path::normalize(path);
        let Some(found) = self.candidates(&path).into_iter().find(|c| c.is_file()) else {
            return Err(LoadError::NotFound(path));
        };
        tracing::debug!(requested = %path.display(), found = %found.display(), "loading module");
        let value = read_module(&found)?;
        Ok(LoadedModule { path: found, value })
    }

    fn glob(&self, pattern: &str, cwd: &Path) -> Vec<String> {
        let full_pattern = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            // The base directory is literal text, never part of the pattern.
            format!("{}/{pattern}", glob::Pattern::escape(&cwd.to_string_lossy()))
        };

        let paths = match glob::glob(&full_pattern) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::debug!(pattern, error = %err, "invalid glob pattern");
                return Vec::new();
            }
        };

        paths
            .flatten()
            .map(|entry| match entry.strip_prefix(cwd) {
                Ok(relative) => relative.display().to_string(),
                Err(_) => entry.display().to_string(),
            })
            .collect()
    }
}
