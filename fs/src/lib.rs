//! Filesystem environment and schema loading for optlayer.
//!
//! This crate connects the I/O-free engine in `optlayer-core` to the real
//! filesystem:
//!
//! - [`FsEnvironment`] implements [`Environment`](optlayer_core::Environment):
//!   file reads, glob expansion, and loading JSON/YAML configuration modules
//!   through a candidate chain (`path`, `path.<ext>`, `path/index.<ext>`).
//! - [`load_schema`] reads an option schema from a JSON or YAML file.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use optlayer_fs::{FsEnvironment, load_schema};
//!
//! let schema = load_schema("optlayer.schema.yaml").unwrap();
//! let env = Arc::new(FsEnvironment::new(std::env::current_dir().unwrap()));
//! let state = optlayer_core::parse(std::env::args().skip(1), schema, env).unwrap();
//!
//! for diagnostic in &state.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! ```

mod error;
mod loader;
mod schema;

pub use error::{FsError, Result};
pub use loader::{DEFAULT_EXTENSIONS, FsEnvironment, ModuleFormat, read_module};
pub use schema::{load_schema, parse_schema};
