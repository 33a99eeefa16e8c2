//! Loading option schemas from JSON or YAML files.
//!
//! A schema file is a map from option key to definition. Key order in the
//! file is the schema order.
//!
//! ```yaml
//! config:
//!   name: config
//!   type: R
//!   default: ./app.config.json
//! jobs:
//!   name: jobs
//!   alias: j
//!   type: number
//!   description: Number of parallel jobs
//!   defaultValue: 4
//! ```

use std::path::Path;

use optlayer_core::{ConfigValue, OptionDefinition, Schema, TypeTag};
use serde::Deserialize;

use crate::error::{FsError, Result};
use crate::loader::ModuleFormat;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Line(String),
    Lines(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefinitionFile {
    name: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default, alias = "defaultValue")]
    default: Option<serde_json::Value>,
    #[serde(default)]
    required: bool,
}

impl DefinitionFile {
    fn into_definition(self, key: &str) -> Result<OptionDefinition> {
        let alias = match self.alias.as_deref() {
            None => None,
            Some(alias) => {
                let mut chars = alias.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => {
                        return Err(FsError::InvalidSchema(format!(
                            "option '{key}': alias '{alias}' must be a single character"
                        )));
                    }
                }
            }
        };

        let description = match self.description {
            None => Vec::new(),
            Some(Description::Line(line)) => vec![line],
            Some(Description::Lines(lines)) => lines,
        };

        Ok(OptionDefinition {
            name: self.name,
            alias,
            kind: TypeTag::parse(&self.kind),
            optional: self.optional,
            description,
            default: self.default.map(ConfigValue::from),
            required: self.required,
        })
    }
}

/// Parses a schema from `text` in the given format.
///
/// # Errors
///
/// Returns [`FsError::JsonError`] or [`FsError::YamlError`] for malformed
/// input and [`FsError::InvalidSchema`] when the document is not a map of
/// definitions.
pub fn parse_schema(text: &str, format: ModuleFormat) -> Result<Schema> {
    let document: serde_json::Value = match format {
        ModuleFormat::Json => serde_json::from_str(text)?,
        ModuleFormat::Yaml => serde_yaml::from_str(text)?,
    };

    let serde_json::Value::Object(entries) = document else {
        return Err(FsError::InvalidSchema(
            "expected a map of option definitions".to_string(),
        ));
    };

    let mut schema = Schema::new();
    for (key, value) in entries {
        let file: DefinitionFile = serde_json::from_value(value)
            .map_err(|e| FsError::InvalidSchema(format!("option '{key}': {e}")))?;
        let definition = file.into_definition(&key)?;
        schema.insert(key, definition);
    }
    Ok(schema)
}

/// Reads a schema file, choosing JSON or YAML by extension.
///
/// # Errors
///
/// Returns [`FsError::IoError`] if the file cannot be read, plus the errors
/// of [`parse_schema`].
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let schema = parse_schema(&text, ModuleFormat::from_path(path))?;
    tracing::debug!(path = %path.display(), options = schema.len(), "schema loaded");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use optlayer_core::OptionType;

    #[test]
    fn test_yaml_schema_keeps_order_and_fields() {
        let schema = parse_schema(
            "config:\n  name: config\n  type: R\njobs:\n  name: jobs\n  alias: j\n  type: number\n  description: [Parallel jobs, Defaults to 4]\n  defaultValue: 4\n",
            ModuleFormat::Yaml,
        )
        .unwrap();

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["config", "jobs"]);
        let jobs = schema.get("jobs").unwrap();
        assert_eq!(jobs.alias, Some('j'));
        assert_eq!(jobs.option_type(), Some(OptionType::Number));
        assert_eq!(jobs.description.len(), 2);
        assert_eq!(jobs.default, Some(ConfigValue::Number(4.0)));
    }

    #[test]
    fn test_unknown_type_is_kept_for_validation() {
        let schema = parse_schema(r#"{ "x": { "name": "x", "type": "z" } }"#, ModuleFormat::Json).unwrap();
        assert_eq!(schema.get("x").unwrap().kind, TypeTag::Unknown("z".to_string()));
    }

    #[test]
    fn test_long_alias_is_rejected() {
        let err = parse_schema(
            r#"{ "x": { "name": "x", "type": "s", "alias": "xx" } }"#,
            ModuleFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, FsError::InvalidSchema(_)));
    }

    #[test]
    fn test_non_map_document_is_rejected() {
        let err = parse_schema("[1, 2]", ModuleFormat::Json).unwrap_err();
        assert!(err.to_string().starts_with("invalid schema"));
    }
}
