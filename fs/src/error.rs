//! Error types for filesystem-backed loading.
//!
//! Module loading through the [`Environment`](optlayer_core::Environment)
//! trait reports [`LoadError`](optlayer_core::LoadError); this type covers the
//! operations callers use directly, such as reading a schema file.

use thiserror::Error;

/// Errors that can occur while reading schema or module files.
#[derive(Debug, Error)]
pub enum FsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file parsed but does not describe a schema.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for results with [`FsError`].
pub type Result<T> = std::result::Result<T, FsError>;
