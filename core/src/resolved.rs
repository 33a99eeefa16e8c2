//! Resolved option values and their provenance.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;

use crate::env::{Environment, LoadedModule};
use crate::value::{ConfigFn, ConfigObject, ConfigValue};

/// Which layer supplied an option's current value.
///
/// Provenance only moves forward within one parse: `Argv` is never
/// overwritten, `Config` only replaces `Unprovided`, and `Default` only
/// replaces `Unprovided` once the other layers have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// No layer has supplied a value.
    Unprovided,
    /// Filled from the schema default.
    Default,
    /// Filled from a configuration module.
    Config,
    /// Given on the command line.
    Argv,
}

/// A deferred reference to a file.
///
/// The file is only read when [`contents`](Self::contents) is called.
#[derive(Clone)]
pub struct FileRef {
    /// Directory the filename is relative to.
    pub base_dir: PathBuf,
    /// Filename as given.
    pub filename: String,
    env: Arc<dyn Environment>,
}

impl FileRef {
    pub(crate) fn new(base_dir: &Path, filename: impl Into<String>, env: &Arc<dyn Environment>) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            filename: filename.into(),
            env: Arc::clone(env),
        }
    }

    /// Lexically resolved absolute path.
    pub fn path(&self) -> PathBuf {
        crate::path::join(&self.base_dir, &self.filename)
    }

    /// Reads the file through the environment.
    pub fn contents(&self) -> Option<String> {
        self.env.read_file(&self.filename, &self.base_dir)
    }
}

impl fmt::Debug for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRef")
            .field("base_dir", &self.base_dir)
            .field("filename", &self.filename)
            .finish()
    }
}

impl PartialEq for FileRef {
    fn eq(&self, other: &Self) -> bool {
        self.base_dir == other.base_dir && self.filename == other.filename
    }
}

/// A deferred reference to a configuration module.
///
/// An empty specifier refers to the base directory itself.
#[derive(Clone)]
pub struct ModuleRef {
    /// Directory the specifier is relative to.
    pub base_dir: PathBuf,
    /// Module path as given.
    pub specifier: String,
    env: Arc<dyn Environment>,
}

impl ModuleRef {
    pub(crate) fn new(base_dir: &Path, specifier: impl Into<String>, env: &Arc<dyn Environment>) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            specifier: specifier.into(),
            env: Arc::clone(env),
        }
    }

    /// Lexically resolved absolute path.
    pub fn path(&self) -> PathBuf {
        crate::path::join(&self.base_dir, &self.specifier)
    }

    /// Loads the module, or `None` if the environment cannot.
    pub fn load(&self) -> Option<ConfigValue> {
        self.load_resolved().map(|module| module.value)
    }

    pub(crate) fn load_resolved(&self) -> Option<LoadedModule> {
        let path = self.path();
        match self.env.load_module(&path) {
            Ok(module) => Some(module),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "module not loaded");
                None
            }
        }
    }
}

impl fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRef")
            .field("base_dir", &self.base_dir)
            .field("specifier", &self.specifier)
            .finish()
    }
}

impl PartialEq for ModuleRef {
    fn eq(&self, other: &Self) -> bool {
        self.base_dir == other.base_dir && self.specifier == other.specifier
    }
}

/// A materialized option value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// No value.
    Null,
    Bool(bool),
    Number(f64),
    Numbers(Vec<f64>),
    String(String),
    Strings(Vec<String>),
    File(FileRef),
    Files(Vec<FileRef>),
    Regex(RegexValue),
    Module(ModuleRef),
    Object(ConfigObject),
    Function(ConfigFn),
    /// A value kept exactly as a configuration layer supplied it.
    Raw(ConfigValue),
}

/// A compiled pattern that compares by source text.
#[derive(Debug, Clone)]
pub struct RegexValue(pub Regex);

impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl ResolvedValue {
    /// Returns `true` for [`ResolvedValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, ResolvedValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ResolvedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResolvedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ResolvedValue::Strings(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            ResolvedValue::Numbers(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[FileRef]> {
        match self {
            ResolvedValue::Files(files) => Some(files),
            _ => None,
        }
    }

    pub fn as_regex(&self) -> Option<&Regex> {
        match self {
            ResolvedValue::Regex(re) => Some(&re.0),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&ModuleRef> {
        match self {
            ResolvedValue::Module(module) => Some(module),
            _ => None,
        }
    }

    /// Renders the value as JSON for reports.
    ///
    /// File references render as their lexically resolved path and module
    /// references as `{ "module": <path> }`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{Value, json};

        let number = |n: f64| {
            serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        };
        let file = |f: &FileRef| Value::String(f.path().display().to_string());

        match self {
            ResolvedValue::Null => Value::Null,
            ResolvedValue::Bool(b) => Value::Bool(*b),
            ResolvedValue::Number(n) => number(*n),
            ResolvedValue::Numbers(items) => Value::Array(items.iter().copied().map(number).collect()),
            ResolvedValue::String(s) => Value::String(s.clone()),
            ResolvedValue::Strings(items) => json!(items),
            ResolvedValue::File(f) => file(f),
            ResolvedValue::Files(files) => Value::Array(files.iter().map(file).collect()),
            ResolvedValue::Regex(re) => Value::String(re.0.as_str().to_string()),
            ResolvedValue::Module(module) => json!({ "module": module.path().display().to_string() }),
            ResolvedValue::Object(object) => ConfigValue::Object(object.clone()).to_json(),
            ResolvedValue::Function(_) => Value::String("[Function]".to_string()),
            ResolvedValue::Raw(value) => value.to_json(),
        }
    }
}

/// An option's value together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionValue {
    pub provenance: Provenance,
    pub value: ResolvedValue,
}

impl OptionValue {
    /// An entry no layer has touched.
    pub fn unprovided() -> Self {
        Self {
            provenance: Provenance::Unprovided,
            value: ResolvedValue::Null,
        }
    }

    /// Returns `true` while no layer has claimed the option.
    pub fn is_unprovided(&self) -> bool {
        self.provenance == Provenance::Unprovided
    }
}
