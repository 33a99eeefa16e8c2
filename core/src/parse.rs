//! The resolution pipeline.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigOutcome, resolve_config};
use crate::env::Environment;
use crate::resolve::{resolve_cli, resolve_defaults};
use crate::state::ConfigurationState;
use crate::tokenize::tokenize;
use crate::types::Schema;
use crate::validate::validate_schema;

/// Failures that are defects in the engine rather than in its input.
///
/// Problems with the schema, the argument vector, or configuration modules
/// are never errors; they are reported as diagnostics on the returned state.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A registered option has no entry in the value table.
    #[error("internal error: no value entry for option '{option}'")]
    MissingValueEntry { option: String },
}

/// Resolves `argv` against `schema`, configuration modules, and defaults.
///
/// The schema is validated first; if it has problems the state is returned
/// with those diagnostics and nothing else. Otherwise the command line is
/// applied, the configuration chain is walked, and defaults fill whatever
/// is left. A configuration module that fails validation stops the pipeline
/// before defaults are applied.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use optlayer_core::*;
///
/// let schema = Schema::new()
///     .with_option("config", OptionDefinition::new("config", OptionType::Module))
///     .with_option("tags", OptionDefinition::new("tags", OptionType::StringList).with_alias('t'));
///
/// let state = parse(["-t", "one,two", "input.txt"], schema, Arc::new(MemoryEnvironment::new("/work")))?;
///
/// assert!(state.diagnostics.is_empty());
/// assert_eq!(state.provenance("tags"), Some(Provenance::Argv));
/// assert_eq!(state.args, vec!["input.txt".to_string()]);
/// # Ok::<(), ParseError>(())
/// ```
pub fn parse<I, S>(argv: I, schema: Schema, env: Arc<dyn Environment>) -> Result<ConfigurationState, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
    let mut state = ConfigurationState::new(schema);

    let schema_diagnostics = validate_schema(state.schema());
    if !schema_diagnostics.is_empty() {
        tracing::debug!(count = schema_diagnostics.len(), "schema rejected");
        state.diagnostics.append(schema_diagnostics);
        return Ok(state);
    }

    let tokens = tokenize(&argv, &mut state);
    tracing::debug!(tokens = tokens.len(), "argv tokenized");
    resolve_cli(tokens, &mut state, &env)?;

    if resolve_config(&mut state, &env)? == ConfigOutcome::Halted {
        return Ok(state);
    }

    resolve_defaults(&mut state, &env)?;
    tracing::debug!(
        diagnostics = state.diagnostics.len(),
        modules = state.config_chain.len(),
        "resolution complete"
    );
    Ok(state)
}
