//! Configuration-module resolution and the `extends` chain walk.
//!
//! Each module in the chain is validated before anything is merged from it.
//! Once any diagnostic has been recorded, from this module or an earlier
//! phase, the whole pipeline stops; a module that cannot be loaded simply
//! ends the chain.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::diag::{DiagnosticCode, Diagnostics};
use crate::env::Environment;
use crate::parse::ParseError;
use crate::path::{display_relative, parent_dir};
use crate::resolve::{materialize, resolve_default};
use crate::resolved::{ModuleRef, OptionValue, Provenance, ResolvedValue};
use crate::state::ConfigurationState;
use crate::types::CONFIG_OPTION;
use crate::validate::{ValueLayer, check_value};
use crate::value::{ConfigObject, ConfigValue};

const EXTENDS_KEY: &str = "extends";
const OPTIONS_KEY: &str = "options";

/// How the configuration phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigOutcome {
    /// Every reachable module was merged, or there was none.
    Complete,
    /// A module failed validation; nothing after it may run.
    Halted,
}

/// Loads the module named by the `config` option and walks its chain.
pub(crate) fn resolve_config(
    state: &mut ConfigurationState,
    env: &Arc<dyn Environment>,
) -> Result<ConfigOutcome, ParseError> {
    let Some(config_id) = state.option_id(CONFIG_OPTION) else {
        return Ok(ConfigOutcome::Complete);
    };
    resolve_default(state, config_id, env)?;

    let Some(ResolvedValue::Module(reference)) = state.value(CONFIG_OPTION).cloned() else {
        tracing::debug!("config option has no module reference");
        return Ok(ConfigOutcome::Complete);
    };
    let Some(mut module) = reference.load_resolved() else {
        tracing::debug!(path = %reference.path().display(), "no configuration module");
        return Ok(ConfigOutcome::Complete);
    };

    let cwd = env.cwd().to_path_buf();
    let mut visited = HashSet::new();

    loop {
        visited.insert(module.path.clone());
        let location = display_relative(&module.path, &cwd);

        let mut layer = Diagnostics::new();
        validate_shape(&module.value, &location, &mut layer);
        let absolute = module.path.display().to_string();
        validate_option_values(&module.value, &absolute, state, &mut layer);
        let rejected = layer.len();
        state.diagnostics.append(layer);

        // Any earlier diagnostic, including one from the command line,
        // keeps this layer from being merged.
        if !state.diagnostics.is_empty() {
            tracing::debug!(module = %location, rejected, "configuration module not merged");
            return Ok(ConfigOutcome::Halted);
        }

        let module_dir = parent_dir(&module.path);
        merge_unset(&module.value, &module_dir, state, env)?;
        state.config_chain.push(module.path.clone());
        tracing::debug!(module = %location, "configuration module merged");

        let Some(extends) = extends_of(&module.value) else {
            break;
        };
        let Some(next) = ModuleRef::new(&module_dir, extends, env).load_resolved() else {
            tracing::debug!(module = %location, extends, "extends chain ended");
            break;
        };

        if visited.contains(&next.path) {
            let reason = format!("extends cycle through '{}'", display_relative(&next.path, &cwd));
            state
                .diagnostics
                .push(DiagnosticCode::InvalidConfiguration, &[&location, &reason]);
            return Ok(ConfigOutcome::Halted);
        }
        module = next;
    }

    Ok(ConfigOutcome::Complete)
}

fn extends_of(module: &ConfigValue) -> Option<&str> {
    module
        .as_object()?
        .get(EXTENDS_KEY)?
        .as_str()
        .filter(|extends| !extends.is_empty())
}

fn options_of(module: &ConfigValue) -> Option<&ConfigObject> {
    module.as_object()?.get(OPTIONS_KEY)?.as_object()
}

fn validate_shape(module: &ConfigValue, location: &str, diagnostics: &mut Diagnostics) {
    let Some(object) = module.as_object() else {
        diagnostics.push(DiagnosticCode::MustBeObject, &[location]);
        return;
    };

    if let Some(extends) = object.get(EXTENDS_KEY) {
        if !matches!(extends, ConfigValue::String(_)) {
            diagnostics.push(
                DiagnosticCode::ShapeTypeExpected,
                &[location, EXTENDS_KEY, "String", extends.type_name()],
            );
        }
    }

    if let Some(options) = object.get(OPTIONS_KEY) {
        if !matches!(options, ConfigValue::Object(_)) {
            diagnostics.push(
                DiagnosticCode::ShapeTypeExpected,
                &[location, OPTIONS_KEY, "Object", options.type_name()],
            );
        }
    }
}

fn validate_option_values(
    module: &ConfigValue,
    location: &str,
    state: &ConfigurationState,
    diagnostics: &mut Diagnostics,
) {
    let Some(options) = options_of(module) else {
        return;
    };

    for (name, value) in options.iter() {
        let Some(id) = state.option_id(name) else {
            diagnostics.push(DiagnosticCode::UnexpectedOption, &[location, name]);
            continue;
        };
        let Some(kind) = state.definition(id).and_then(|d| d.option_type()) else {
            continue;
        };
        for mismatch in check_value(kind, value, ValueLayer::Config) {
            diagnostics.push(
                DiagnosticCode::ConfigOptionType,
                &[location, name, mismatch.actual, mismatch.expected],
            );
        }
    }
}

/// Sets every option the module declares that no layer has claimed yet.
fn merge_unset(
    module: &ConfigValue,
    module_dir: &Path,
    state: &mut ConfigurationState,
    env: &Arc<dyn Environment>,
) -> Result<(), ParseError> {
    let Some(options) = options_of(module) else {
        return Ok(());
    };

    for (name, value) in options.iter() {
        let Some(id) = state.option_id(name) else {
            continue;
        };
        let kind = state.definition(id).and_then(|d| d.option_type());
        let entry = state.entry_mut(id).ok_or_else(|| ParseError::MissingValueEntry {
            option: name.to_string(),
        })?;
        let Some(kind) = kind else {
            continue;
        };
        if !entry.is_unprovided() {
            continue;
        }
        *entry = OptionValue {
            provenance: Provenance::Config,
            value: materialize(kind, value, module_dir, env),
        };
    }
    Ok(())
}
