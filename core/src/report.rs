//! Serializable view of a resolved configuration.

use serde::Serialize;

use crate::diag::Diagnostics;
use crate::resolved::Provenance;
use crate::state::ConfigurationState;

/// One option in a [`ResolutionReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedValue {
    pub name: String,
    pub provenance: Provenance,
    pub value: serde_json::Value,
}

/// Everything a parse produced, in a form that serializes cleanly.
///
/// Values appear in schema order. File references render as resolved
/// paths and module references as `{ "module": <path> }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionReport {
    pub values: Vec<ReportedValue>,
    pub args: Vec<String>,
    pub rest: Vec<String>,
    pub config_chain: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl ResolutionReport {
    pub fn from_state(state: &ConfigurationState) -> Self {
        let values = state
            .options()
            .filter_map(|(id, definition)| {
                state.entry(id).map(|entry| ReportedValue {
                    name: definition.name.clone(),
                    provenance: entry.provenance,
                    value: entry.value.to_json(),
                })
            })
            .collect();

        Self {
            values,
            args: state.args.clone(),
            rest: state.rest.clone(),
            config_chain: state
                .config_chain
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            diagnostics: state.diagnostics.clone(),
        }
    }

    /// Returns `true` when the parse reported no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Reported entry for `name`.
    pub fn value(&self, name: &str) -> Option<&ReportedValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::env::MemoryEnvironment;
    use crate::parse::parse;
    use crate::types::{OptionDefinition, OptionType, Schema};

    #[test]
    fn test_report_serializes_in_schema_order() {
        let schema = Schema::new()
            .with_option("config", OptionDefinition::new("config", OptionType::Module))
            .with_option("verbose", OptionDefinition::new("verbose", OptionType::Boolean))
            .with_option("level", OptionDefinition::new("level", OptionType::Number).with_default(3));

        let state = parse(["--verbose", "--", "x"], schema, Arc::new(MemoryEnvironment::new("/w"))).unwrap();
        let report = ResolutionReport::from_state(&state);

        assert!(report.is_clean());
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "values": [
                    { "name": "config", "provenance": "default", "value": { "module": "/w" } },
                    { "name": "verbose", "provenance": "argv", "value": true },
                    { "name": "level", "provenance": "default", "value": 3.0 },
                ],
                "args": [],
                "rest": ["x"],
                "config_chain": [],
                "diagnostics": [],
            })
        );
    }

    #[test]
    fn test_report_carries_diagnostics() {
        let schema = Schema::new().with_option("verbose", OptionDefinition::new("verbose", OptionType::Boolean));
        let state = parse(Vec::<String>::new(), schema, Arc::new(MemoryEnvironment::new("/w"))).unwrap();
        let report = ResolutionReport::from_state(&state);

        assert!(!report.is_clean());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.value("verbose").map(|v| v.provenance), Some(Provenance::Unprovided));
    }
}
