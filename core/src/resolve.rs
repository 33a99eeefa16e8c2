//! Command-line and default value resolution.
//!
//! Both layers share one dispatch over [`OptionType`]: a flag's raw text and
//! a declared default (or configuration value) end up as the same
//! [`ResolvedValue`] shape. File, glob, and module values are bound to a base
//! directory: the working directory for argv and defaults, the module's own
//! directory for configuration values.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;

use crate::diag::DiagnosticCode;
use crate::env::Environment;
use crate::parse::ParseError;
use crate::resolved::{FileRef, ModuleRef, OptionValue, Provenance, RegexValue, ResolvedValue};
use crate::state::{ConfigurationState, OptionId};
use crate::tokenize::{ArgvToken, TokenKind, TokenValue};
use crate::types::{CONFIG_OPTION, OptionType};
use crate::value::ConfigValue;

/// A command-line value that does not convert to its option's type.
#[derive(Debug)]
struct InvalidValue {
    value: String,
    expected: &'static str,
}

/// Applies the token stream to `state`.
///
/// Positional and rest tokens are recorded, error tokens become
/// diagnostics, and flag tokens are materialized against the working
/// directory.
pub(crate) fn resolve_cli(
    tokens: Vec<ArgvToken>,
    state: &mut ConfigurationState,
    env: &Arc<dyn Environment>,
) -> Result<(), ParseError> {
    let cwd = env.cwd().to_path_buf();

    for token in tokens {
        let option = token
            .option
            .and_then(|id| state.definition(id))
            .map(|definition| (definition.name.clone(), definition.kind.to_string(), definition.option_type()));

        match (token.kind, option) {
            (TokenKind::Default, _) => state.args.push(token.value.into_text()),
            (TokenKind::Rest, _) => state.rest.push(token.value.into_text()),
            (TokenKind::UnknownFlag, _) => {
                let flag = token.value.into_text();
                state.diagnostics.push(DiagnosticCode::InvalidFlag, &[&flag]);
            }
            (TokenKind::AlreadyProvided, Some((name, _, _))) => {
                state.diagnostics.push(DiagnosticCode::AlreadyProvided, &[&name]);
            }
            (TokenKind::ArgumentMissing | TokenKind::Unprovided, Some((name, _, _))) => {
                state.diagnostics.push(DiagnosticCode::ArgumentMissing, &[&name]);
            }
            (TokenKind::CannotBePassed, Some((name, tag, _))) => {
                state.diagnostics.push(DiagnosticCode::CannotBePassed, &[&name, &tag]);
            }
            (TokenKind::Flag, Some((name, _, Some(kind)))) => {
                let Some(id) = token.option else {
                    continue;
                };
                match flag_value(kind, token.value, &cwd, env) {
                    Ok(value) => {
                        let entry = state
                            .entry_mut(id)
                            .ok_or_else(|| ParseError::MissingValueEntry { option: name })?;
                        entry.value = value;
                    }
                    Err(invalid) => state.diagnostics.push(
                        DiagnosticCode::InvalidArgumentValue,
                        &[&name, &invalid.value, invalid.expected],
                    ),
                }
            }
            (kind, _) => tracing::debug!(?kind, "token without a resolvable option"),
        }
    }

    Ok(())
}

fn flag_value(
    kind: OptionType,
    value: TokenValue,
    cwd: &Path,
    env: &Arc<dyn Environment>,
) -> Result<ResolvedValue, InvalidValue> {
    let resolved = match kind {
        OptionType::Boolean => ResolvedValue::Bool(value != TokenValue::Bool(false)),
        OptionType::String => ResolvedValue::String(value.into_text()),
        OptionType::StringList => ResolvedValue::Strings(value.into_list()),
        OptionType::Number => ResolvedValue::Number(parse_number(value.into_text())?),
        OptionType::NumberList => ResolvedValue::Numbers(
            value
                .into_list()
                .into_iter()
                .map(parse_number)
                .collect::<Result<_, _>>()?,
        ),
        OptionType::File => ResolvedValue::File(FileRef::new(cwd, value.into_text(), env)),
        OptionType::FileList => ResolvedValue::Files(
            value
                .into_list()
                .into_iter()
                .map(|filename| FileRef::new(cwd, filename, env))
                .collect(),
        ),
        OptionType::Glob => {
            let pattern = value.into_text();
            ResolvedValue::Files(glob_files([pattern.as_str()], cwd, env))
        }
        OptionType::GlobList => {
            let patterns = value.into_list();
            ResolvedValue::Files(glob_files(patterns.iter().map(String::as_str), cwd, env))
        }
        OptionType::Regex => {
            let pattern = value.into_text();
            match Regex::new(&pattern) {
                Ok(re) => ResolvedValue::Regex(RegexValue(re)),
                Err(_) => {
                    return Err(InvalidValue {
                        value: pattern,
                        expected: "regex",
                    });
                }
            }
        }
        OptionType::Module => ResolvedValue::Module(ModuleRef::new(cwd, value.into_text(), env)),
        OptionType::Object | OptionType::Function => ResolvedValue::Null,
    };
    Ok(resolved)
}

fn parse_number(raw: String) -> Result<f64, InvalidValue> {
    raw.trim().parse::<f64>().map_err(|_| InvalidValue {
        value: raw,
        expected: "number",
    })
}

/// Expands every pattern relative to `base_dir`, keeping the first
/// occurrence of each match.
fn glob_files<'a>(
    patterns: impl IntoIterator<Item = &'a str>,
    base_dir: &Path,
    env: &Arc<dyn Environment>,
) -> Vec<FileRef> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in patterns {
        for filename in env.glob(pattern, base_dir) {
            if seen.insert(filename.clone()) {
                files.push(FileRef::new(base_dir, filename, env));
            }
        }
    }
    files
}

/// Materializes a structured value (a default or a configuration value)
/// for an option of type `kind`.
///
/// Values that do not have the expected shape are kept as
/// [`ResolvedValue::Raw`]. A module value that is not a string refers to
/// `base_dir` itself.
pub(crate) fn materialize(
    kind: OptionType,
    value: &ConfigValue,
    base_dir: &Path,
    env: &Arc<dyn Environment>,
) -> ResolvedValue {
    let raw = || ResolvedValue::Raw(value.clone());

    match kind {
        OptionType::Boolean => match value {
            ConfigValue::Bool(b) => ResolvedValue::Bool(*b),
            _ => raw(),
        },
        OptionType::String => match value {
            ConfigValue::String(s) => ResolvedValue::String(s.clone()),
            _ => raw(),
        },
        OptionType::StringList => string_items(value).map(ResolvedValue::Strings).unwrap_or_else(raw),
        OptionType::Number => match value {
            ConfigValue::Number(n) => ResolvedValue::Number(*n),
            _ => raw(),
        },
        OptionType::NumberList => number_items(value).map(ResolvedValue::Numbers).unwrap_or_else(raw),
        OptionType::File => match value {
            ConfigValue::String(filename) => ResolvedValue::File(FileRef::new(base_dir, filename.as_str(), env)),
            _ => raw(),
        },
        OptionType::FileList => string_items(value)
            .map(|filenames| {
                ResolvedValue::Files(
                    filenames
                        .into_iter()
                        .map(|filename| FileRef::new(base_dir, filename, env))
                        .collect(),
                )
            })
            .unwrap_or_else(raw),
        OptionType::Glob => match value {
            ConfigValue::String(pattern) => ResolvedValue::Files(glob_files([pattern.as_str()], base_dir, env)),
            _ => raw(),
        },
        OptionType::GlobList => string_items(value)
            .map(|patterns| ResolvedValue::Files(glob_files(patterns.iter().map(String::as_str), base_dir, env)))
            .unwrap_or_else(raw),
        OptionType::Regex => match value {
            ConfigValue::Regex(re) => ResolvedValue::Regex(RegexValue(re.clone())),
            ConfigValue::String(pattern) => Regex::new(pattern)
                .map(|re| ResolvedValue::Regex(RegexValue(re)))
                .unwrap_or_else(|_| raw()),
            _ => raw(),
        },
        OptionType::Module => ResolvedValue::Module(ModuleRef::new(base_dir, value.as_str().unwrap_or(""), env)),
        OptionType::Object => match value {
            ConfigValue::Object(object) => ResolvedValue::Object(object.clone()),
            _ => raw(),
        },
        OptionType::Function => match value {
            ConfigValue::Function(f) => ResolvedValue::Function(f.clone()),
            _ => raw(),
        },
    }
}

fn string_items(value: &ConfigValue) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn number_items(value: &ConfigValue) -> Option<Vec<f64>> {
    value
        .as_array()?
        .iter()
        .map(|item| match item {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        })
        .collect()
}

/// Fills option `id` from its declared default if no layer has claimed it.
///
/// The `config` option falls back to the working directory when it
/// declares no default.
pub(crate) fn resolve_default(
    state: &mut ConfigurationState,
    id: OptionId,
    env: &Arc<dyn Environment>,
) -> Result<(), ParseError> {
    let Some(definition) = state.definition(id) else {
        return Ok(());
    };
    let name = definition.name.clone();
    let cwd = env.cwd();

    let value = match (definition.option_type(), &definition.default) {
        (Some(kind), Some(default)) => materialize(kind, default, cwd, env),
        (Some(OptionType::Module), None) if name == CONFIG_OPTION => {
            ResolvedValue::Module(ModuleRef::new(cwd, "", env))
        }
        _ => return Ok(()),
    };

    let entry = state
        .entry_mut(id)
        .ok_or(ParseError::MissingValueEntry { option: name })?;
    if entry.is_unprovided() {
        *entry = OptionValue {
            provenance: Provenance::Default,
            value,
        };
    }
    Ok(())
}

/// Fills every still-unprovided option from its default, in schema order.
pub(crate) fn resolve_defaults(state: &mut ConfigurationState, env: &Arc<dyn Environment>) -> Result<(), ParseError> {
    let ids: Vec<OptionId> = state.options().map(|(id, _)| id).collect();
    for id in ids {
        resolve_default(state, id, env)?;
    }
    Ok(())
}
