//! The configuration state threaded through every pipeline stage.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::diag::Diagnostics;
use crate::resolved::{OptionValue, Provenance, ResolvedValue};
use crate::types::{OptionDefinition, Schema};

/// Identity of a registered option: its position in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub(crate) usize);

/// Result of one parse: registries, values, arguments, and diagnostics.
///
/// Created once per invocation from the schema. Registries are built at
/// construction; when two definitions claim the same name or alias, the
/// first one registered keeps it.
#[derive(Debug)]
pub struct ConfigurationState {
    schema: Schema,
    by_name: HashMap<String, OptionId>,
    by_alias: HashMap<char, OptionId>,
    pub(crate) values: HashMap<OptionId, OptionValue>,
    /// Positional arguments, in order.
    pub args: Vec<String>,
    /// Arguments after a bare `--`, verbatim and in order.
    pub rest: Vec<String>,
    /// Everything that went wrong, in discovery order.
    pub diagnostics: Diagnostics,
    /// Configuration modules that were merged, in chain order.
    pub config_chain: Vec<PathBuf>,
}

impl ConfigurationState {
    /// Builds registries and an `Unprovided` entry for every definition.
    pub fn new(schema: Schema) -> Self {
        let mut by_name = HashMap::new();
        let mut by_alias = HashMap::new();
        let mut values = HashMap::new();

        for (index, (_, definition)) in schema.iter().enumerate() {
            let id = OptionId(index);
            by_name.entry(definition.name.clone()).or_insert(id);
            if let Some(alias) = definition.alias {
                by_alias.entry(alias).or_insert(id);
            }
            values.insert(id, OptionValue::unprovided());
        }

        Self {
            schema,
            by_name,
            by_alias,
            values,
            args: Vec::new(),
            rest: Vec::new(),
            diagnostics: Diagnostics::new(),
            config_chain: Vec::new(),
        }
    }

    /// The schema this state was built from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Looks up an option by name.
    pub fn option_id(&self, name: &str) -> Option<OptionId> {
        self.by_name.get(name).copied()
    }

    /// Looks up an option by alias.
    pub fn alias_id(&self, alias: char) -> Option<OptionId> {
        self.by_alias.get(&alias).copied()
    }

    /// The definition registered under `id`.
    pub fn definition(&self, id: OptionId) -> Option<&OptionDefinition> {
        self.schema.iter().nth(id.0).map(|(_, definition)| definition)
    }

    /// Registered options in schema order.
    pub fn options(&self) -> impl Iterator<Item = (OptionId, &OptionDefinition)> {
        self.schema
            .iter()
            .enumerate()
            .map(|(index, (_, definition))| (OptionId(index), definition))
    }

    /// Value entry and provenance for `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use optlayer_core::{ConfigurationState, OptionDefinition, OptionType, Provenance, Schema};
    ///
    /// let state = ConfigurationState::new(
    ///     Schema::new().with_option("verbose", OptionDefinition::new("verbose", OptionType::Boolean)),
    /// );
    /// assert_eq!(state.get("verbose").unwrap().provenance, Provenance::Unprovided);
    /// assert!(state.get("missing").is_none());
    /// ```
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.option_id(name).and_then(|id| self.values.get(&id))
    }

    /// Resolved value for `name`.
    pub fn value(&self, name: &str) -> Option<&ResolvedValue> {
        self.get(name).map(|entry| &entry.value)
    }

    /// Provenance for `name`.
    pub fn provenance(&self, name: &str) -> Option<Provenance> {
        self.get(name).map(|entry| entry.provenance)
    }

    pub(crate) fn entry(&self, id: OptionId) -> Option<&OptionValue> {
        self.values.get(&id)
    }

    pub(crate) fn entry_mut(&mut self, id: OptionId) -> Option<&mut OptionValue> {
        self.values.get_mut(&id)
    }
}
