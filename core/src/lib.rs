//! Layered option reconciliation for command-line tools.
//!
//! This crate resolves a tool's options from three sources into one typed
//! result plus an ordered diagnostic list:
//!
//! - the command line, tokenized against a [`Schema`] of
//!   [`OptionDefinition`]s;
//! - a configuration module named by the mandatory `config` option, and the
//!   chain of modules it `extends`;
//! - defaults declared in the schema.
//!
//! A value from the command line always wins, then the nearest
//! configuration module, then the default. Every option records which layer
//! supplied it as a [`Provenance`].
//!
//! The engine performs no I/O. Files, globs, and configuration modules are
//! reached through an [`Environment`]; [`MemoryEnvironment`] is an in-memory
//! implementation suitable for tests.
//!
//! Problems with the schema, the arguments, or a configuration module are
//! reported as [`Diagnostic`]s on the returned [`ConfigurationState`], never
//! as errors. Schema problems stop resolution before any argument is read;
//! a configuration module with problems stops it before that module is
//! merged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use optlayer_core::*;
//!
//! let schema = Schema::new()
//!     .with_option("config", OptionDefinition::new("config", OptionType::Module).with_default("app.json"))
//!     .with_option("verbose", OptionDefinition::new("verbose", OptionType::Boolean).with_alias('v'))
//!     .with_option("jobs", OptionDefinition::new("jobs", OptionType::Number).with_default(1));
//!
//! let env = MemoryEnvironment::new("/project").with_module(
//!     "/project/app.json",
//!     serde_json::json!({ "options": { "jobs": 8, "verbose": false } }),
//! );
//!
//! let state = parse(["-v"], schema, Arc::new(env)).unwrap();
//!
//! assert!(state.diagnostics.is_empty());
//! assert_eq!(state.value("verbose").and_then(ResolvedValue::as_bool), Some(true));
//! assert_eq!(state.provenance("verbose"), Some(Provenance::Argv));
//! assert_eq!(state.value("jobs").and_then(ResolvedValue::as_number), Some(8.0));
//! assert_eq!(state.provenance("jobs"), Some(Provenance::Config));
//! ```

mod config;
mod diag;
mod env;
mod parse;
pub mod path;
mod report;
mod resolve;
mod resolved;
mod state;
mod tokenize;
mod types;
mod validate;
mod value;

pub use diag::{Diagnostic, DiagnosticCode, Diagnostics, format_template};
pub use env::{Environment, LoadError, LoadedModule, MemoryEnvironment};
pub use parse::{ParseError, parse};
pub use report::{ReportedValue, ResolutionReport};
pub use resolved::{FileRef, ModuleRef, OptionValue, Provenance, RegexValue, ResolvedValue};
pub use state::{ConfigurationState, OptionId};
pub use tokenize::{ArgvToken, TokenKind, TokenValue, tokenize};
pub use types::*;
pub use validate::validate_schema;
pub use value::{ConfigFn, ConfigObject, ConfigValue};
