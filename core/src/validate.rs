//! Schema validation and value type checks.
//!
//! [`validate_schema`] checks a schema for internal consistency before any
//! argument is looked at. The value checks here are shared by default
//! validation and configuration-module validation; they differ only in the
//! diagnostic code the caller reports them under.
//!
//! # Examples
//!
//! ```
//! use optlayer_core::*;
//!
//! let schema = Schema::new()
//!     .with_option("config", OptionDefinition::new("config", OptionType::Module));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Missing `config` option
//! let bad = Schema::new()
//!     .with_option("verbose", OptionDefinition::new("verbose", OptionType::Boolean));
//! assert!(validate_schema(&bad).contains(DiagnosticCode::OptionRequired));
//! ```

use std::collections::HashMap;

use regex::Regex;

use crate::diag::{DiagnosticCode, Diagnostics};
use crate::types::{CONFIG_OPTION, OptionType, Schema, TypeTag};
use crate::value::ConfigValue;

/// Which layer a value being checked came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueLayer {
    /// A schema default.
    Default,
    /// A configuration module option.
    Config,
}

/// A value (or list element) whose type does not fit the option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeMismatch {
    pub actual: &'static str,
    pub expected: &'static str,
}

/// Validates a schema, returning every problem found.
///
/// Checks, in order: the `config` option exists; every key equals its
/// definition's name; aliases are unique; every type tag is recognized and
/// `config` is a module; declared defaults fit their types.
pub fn validate_schema(schema: &Schema) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    if schema.get(CONFIG_OPTION).is_none() {
        diagnostics.push(DiagnosticCode::OptionRequired, &[CONFIG_OPTION]);
    }

    validate_names(schema, &mut diagnostics);
    validate_aliases(schema, &mut diagnostics);
    validate_types(schema, &mut diagnostics);
    validate_defaults(schema, &mut diagnostics);

    diagnostics
}

fn validate_names(schema: &Schema, diagnostics: &mut Diagnostics) {
    for (key, definition) in schema.iter() {
        if key != definition.name {
            diagnostics.push(DiagnosticCode::NameMismatch, &[key, &definition.name]);
        }
    }
}

fn validate_aliases(schema: &Schema, diagnostics: &mut Diagnostics) {
    let mut owners: HashMap<char, &str> = HashMap::new();
    for (key, definition) in schema.iter() {
        let Some(alias) = definition.alias else {
            continue;
        };
        match owners.get(&alias) {
            Some(owner) => {
                let alias = alias.to_string();
                diagnostics.push(DiagnosticCode::DuplicateAlias, &[key, *owner, &alias]);
            }
            None => {
                owners.insert(alias, key);
            }
        }
    }
}

fn validate_types(schema: &Schema, diagnostics: &mut Diagnostics) {
    for (key, definition) in schema.iter() {
        if let TypeTag::Unknown(raw) = &definition.kind {
            diagnostics.push(DiagnosticCode::InvalidOptionType, &[key, raw]);
        }
    }

    if let Some(config) = schema.get(CONFIG_OPTION) {
        if config.option_type() != Some(OptionType::Module) {
            let actual = config.kind.to_string();
            diagnostics.push(
                DiagnosticCode::UnexpectedOptionType,
                &[CONFIG_OPTION, &actual, OptionType::Module.tag()],
            );
        }
    }
}

fn validate_defaults(schema: &Schema, diagnostics: &mut Diagnostics) {
    for (key, definition) in schema.iter() {
        let (Some(kind), Some(default)) = (definition.option_type(), &definition.default) else {
            continue;
        };
        for mismatch in check_value(kind, default, ValueLayer::Default) {
            diagnostics.push(
                DiagnosticCode::DefaultValueType,
                &[key, mismatch.actual, mismatch.expected],
            );
        }
    }
}

/// Checks `value` against `kind`, element-wise for list types.
///
/// Module references are never checked. Objects are only checked when they
/// come from a configuration module; a default object has no canonical
/// shape to compare against.
pub(crate) fn check_value(kind: OptionType, value: &ConfigValue, layer: ValueLayer) -> Vec<TypeMismatch> {
    match kind {
        OptionType::StringList | OptionType::GlobList | OptionType::FileList => {
            check_list(value, check_string)
        }
        OptionType::NumberList => check_list(value, check_number),
        OptionType::String | OptionType::Glob | OptionType::File => {
            check_string(value).into_iter().collect()
        }
        OptionType::Number => check_number(value).into_iter().collect(),
        OptionType::Boolean => expect(matches!(value, ConfigValue::Bool(_)), value, "Boolean"),
        OptionType::Regex => expect(is_regex_like(value), value, "RegExp"),
        OptionType::Function => expect(matches!(value, ConfigValue::Function(_)), value, "Function"),
        OptionType::Object => match layer {
            ValueLayer::Default => Vec::new(),
            ValueLayer::Config => expect(matches!(value, ConfigValue::Object(_)), value, "Object"),
        },
        OptionType::Module => Vec::new(),
    }
}

fn check_list(value: &ConfigValue, check: fn(&ConfigValue) -> Option<TypeMismatch>) -> Vec<TypeMismatch> {
    match value {
        ConfigValue::Array(items) => items.iter().filter_map(check).collect(),
        other => vec![TypeMismatch {
            actual: other.type_name(),
            expected: "Array",
        }],
    }
}

fn check_string(value: &ConfigValue) -> Option<TypeMismatch> {
    expect(matches!(value, ConfigValue::String(_)), value, "String").pop()
}

fn check_number(value: &ConfigValue) -> Option<TypeMismatch> {
    expect(matches!(value, ConfigValue::Number(_)), value, "Number").pop()
}

fn expect(ok: bool, value: &ConfigValue, expected: &'static str) -> Vec<TypeMismatch> {
    if ok {
        Vec::new()
    } else {
        vec![TypeMismatch {
            actual: value.type_name(),
            expected,
        }]
    }
}

/// A compiled regex, or a string that compiles as one.
fn is_regex_like(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Regex(_) => true,
        ConfigValue::String(pattern) => Regex::new(pattern).is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionDefinition;
    use crate::value::{ConfigFn, ConfigObject};

    fn config() -> OptionDefinition {
        OptionDefinition::new("config", OptionType::Module)
    }

    fn codes(diagnostics: &Diagnostics) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_missing_config_is_reported() {
        let diagnostics = validate_schema(&Schema::new());
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::OptionRequired]);
    }

    #[test]
    fn test_name_mismatch_names_key_and_definition() {
        let schema = Schema::new()
            .with_option("test", OptionDefinition::new("not-test", OptionType::Boolean))
            .with_option("config", config());

        let diagnostics = validate_schema(&schema);
        assert_eq!(
            diagnostics.messages(),
            vec!["Invalid configuration option '--test': Option key 'test' does not match name 'not-test'"]
        );
    }

    #[test]
    fn test_duplicate_alias_names_first_owner() {
        let schema = Schema::new()
            .with_option("config", config().with_alias('c'))
            .with_option(
                "duplicate",
                OptionDefinition::new("duplicate", OptionType::String).with_alias('c'),
            );

        let diagnostics = validate_schema(&schema);
        assert_eq!(
            diagnostics.messages(),
            vec!["Invalid configuration option '--duplicate': Option '--config' already has alias '-c'"]
        );
    }

    #[test]
    fn test_third_alias_holder_still_blames_first() {
        let schema = Schema::new()
            .with_option("config", config())
            .with_option("a", OptionDefinition::new("a", OptionType::String).with_alias('x'))
            .with_option("b", OptionDefinition::new("b", OptionType::String).with_alias('x'))
            .with_option("c", OptionDefinition::new("c", OptionType::String).with_alias('x'));

        let diagnostics = validate_schema(&schema);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.message.contains("Option '--a'")));
    }

    #[test]
    fn test_unknown_type_tag() {
        let schema = Schema::new()
            .with_option("config", config())
            .with_option("bad", OptionDefinition::new("bad", TypeTag::parse("z")));

        let diagnostics = validate_schema(&schema);
        assert_eq!(
            diagnostics.messages(),
            vec!["Invalid configuration option '--bad': Option type 'z' is invalid"]
        );
    }

    #[test]
    fn test_config_must_be_module() {
        let schema = Schema::new().with_option(
            "config",
            OptionDefinition::new("config", OptionType::Boolean).with_default(true),
        );

        let diagnostics = validate_schema(&schema);
        assert_eq!(
            diagnostics.messages(),
            vec!["Invalid configuration option '--config': Option type 'b' is invalid, expected 'R'"]
        );
    }

    #[test]
    fn test_default_scalar_mismatches() {
        let schema = Schema::new()
            .with_option("config", config().with_default(ConfigObject::new()))
            .with_option("n", OptionDefinition::new("n", OptionType::Number).with_default("test"))
            .with_option("s", OptionDefinition::new("s", OptionType::String).with_default(1))
            .with_option("b", OptionDefinition::new("b", OptionType::Boolean).with_default("incorrect!"))
            .with_option("r", OptionDefinition::new("r", OptionType::Regex).with_default(1))
            .with_option("e", OptionDefinition::new("e", OptionType::Function).with_default(1));

        let diagnostics = validate_schema(&schema);
        assert_eq!(
            diagnostics.messages(),
            vec![
                "Invalid configuration option '--n': Default value is type 'String', expected 'Number'",
                "Invalid configuration option '--s': Default value is type 'Number', expected 'String'",
                "Invalid configuration option '--b': Default value is type 'String', expected 'Boolean'",
                "Invalid configuration option '--r': Default value is type 'Number', expected 'RegExp'",
                "Invalid configuration option '--e': Default value is type 'Number', expected 'Function'",
            ]
        );
    }

    #[test]
    fn test_default_list_checks_are_element_wise() {
        let schema = Schema::new()
            .with_option("config", config())
            .with_option("strings", OptionDefinition::new("strings", OptionType::StringList).with_default(vec![1, 2, 3]))
            .with_option("numbers", OptionDefinition::new("numbers", OptionType::NumberList).with_default("test"));

        let diagnostics = validate_schema(&schema);
        assert_eq!(diagnostics.len(), 4);
        assert_eq!(
            diagnostics.messages().last().copied(),
            Some("Invalid configuration option '--numbers': Default value is type 'String', expected 'Array'")
        );
    }

    #[test]
    fn test_object_and_module_defaults_are_not_checked() {
        let schema = Schema::new()
            .with_option("config", config().with_default(42))
            .with_option("o", OptionDefinition::new("o", OptionType::Object).with_default("anything"));
        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_valid_defaults_pass() {
        let schema = Schema::new()
            .with_option("config", config().with_default("./app.config.json"))
            .with_option("g", OptionDefinition::new("g", OptionType::GlobList).with_default(vec!["src/**/*.rs"]))
            .with_option("r", OptionDefinition::new("r", OptionType::Regex).with_default("^v[0-9]+$"))
            .with_option("e", OptionDefinition::new("e", OptionType::Function).with_default(ConfigFn::new(|_| ConfigValue::Null)));
        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_config_layer_checks_objects() {
        let mismatches = check_value(OptionType::Object, &ConfigValue::from(1), ValueLayer::Config);
        assert_eq!(
            mismatches,
            vec![TypeMismatch {
                actual: "Number",
                expected: "Object"
            }]
        );
    }

    #[test]
    fn test_uncompilable_regex_string_is_rejected() {
        let mismatches = check_value(OptionType::Regex, &ConfigValue::from("(unclosed"), ValueLayer::Config);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].actual, "String");
    }

}
