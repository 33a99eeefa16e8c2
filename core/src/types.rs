//! Option schema type definitions.
//!
//! A [`Schema`] is an ordered collection of [`OptionDefinition`]s keyed by
//! option name. Each definition carries a [`TypeTag`] that decides how the
//! option is tokenized from argv, how its default is checked, and how its
//! value is materialized.

use std::fmt;

use crate::value::ConfigValue;

/// Name of the one option every schema must declare.
pub const CONFIG_OPTION: &str = "config";

/// The closed set of option value shapes.
///
/// Every dispatch point in the engine matches on this enum exhaustively, so
/// adding a variant forces each stage to decide how to handle it.
///
/// # Examples
///
/// ```
/// use optlayer_core::OptionType;
///
/// assert_eq!(OptionType::from_tag("S"), Some(OptionType::StringList));
/// assert_eq!(OptionType::from_tag("number-list"), Some(OptionType::NumberList));
/// assert_eq!(OptionType::from_tag("z"), None);
/// assert_eq!(OptionType::Module.tag(), "R");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// A single glob pattern, resolved to a file list.
    Glob,
    /// Comma-separated glob patterns, resolved to a de-duplicated file list.
    GlobList,
    /// A plain string.
    String,
    /// Comma-separated strings.
    StringList,
    /// A floating point number.
    Number,
    /// Comma-separated numbers.
    NumberList,
    /// A single file reference.
    File,
    /// Comma-separated file references.
    FileList,
    /// A regular expression.
    Regex,
    /// A deferred reference to a configuration module.
    Module,
    /// A boolean switch.
    Boolean,
    /// An arbitrary object, config-file only.
    Object,
    /// A callable, config-file only.
    Function,
}

impl OptionType {
    /// All variants in tag order.
    pub const ALL: [OptionType; 13] = [
        OptionType::Glob,
        OptionType::GlobList,
        OptionType::String,
        OptionType::StringList,
        OptionType::Number,
        OptionType::NumberList,
        OptionType::File,
        OptionType::FileList,
        OptionType::Regex,
        OptionType::Module,
        OptionType::Boolean,
        OptionType::Object,
        OptionType::Function,
    ];

    /// Parses either the compact one-letter tag or the long kebab-case name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let parsed = match tag {
            "g" | "glob" => OptionType::Glob,
            "G" | "glob-list" => OptionType::GlobList,
            "s" | "string" => OptionType::String,
            "S" | "string-list" => OptionType::StringList,
            "n" | "number" => OptionType::Number,
            "N" | "number-list" => OptionType::NumberList,
            "f" | "file" => OptionType::File,
            "F" | "file-list" => OptionType::FileList,
            "r" | "regex" => OptionType::Regex,
            "R" | "module" => OptionType::Module,
            "b" | "boolean" => OptionType::Boolean,
            "o" | "object" => OptionType::Object,
            "e" | "function" => OptionType::Function,
            _ => return None,
        };
        Some(parsed)
    }

    /// The compact one-letter tag, as rendered in diagnostics.
    pub fn tag(self) -> &'static str {
        match self {
            OptionType::Glob => "g",
            OptionType::GlobList => "G",
            OptionType::String => "s",
            OptionType::StringList => "S",
            OptionType::Number => "n",
            OptionType::NumberList => "N",
            OptionType::File => "f",
            OptionType::FileList => "F",
            OptionType::Regex => "r",
            OptionType::Module => "R",
            OptionType::Boolean => "b",
            OptionType::Object => "o",
            OptionType::Function => "e",
        }
    }

    /// The long kebab-case name.
    pub fn long_name(self) -> &'static str {
        match self {
            OptionType::Glob => "glob",
            OptionType::GlobList => "glob-list",
            OptionType::String => "string",
            OptionType::StringList => "string-list",
            OptionType::Number => "number",
            OptionType::NumberList => "number-list",
            OptionType::File => "file",
            OptionType::FileList => "file-list",
            OptionType::Regex => "regex",
            OptionType::Module => "module",
            OptionType::Boolean => "boolean",
            OptionType::Object => "object",
            OptionType::Function => "function",
        }
    }

    /// Returns `true` for the comma-separated list shapes.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            OptionType::GlobList
                | OptionType::StringList
                | OptionType::NumberList
                | OptionType::FileList
        )
    }

    /// Returns `true` for shapes that can only come from a config module.
    pub fn is_config_only(self) -> bool {
        matches!(self, OptionType::Object | OptionType::Function)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A type tag as written in a schema, possibly unrecognized.
///
/// Schemas are user input, so an unknown tag must survive long enough for
/// the validator to report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    /// One of the recognized shapes.
    Known(OptionType),
    /// Anything else, kept verbatim.
    Unknown(String),
}

impl TypeTag {
    /// Parses a raw tag, keeping unrecognized input.
    pub fn parse(raw: &str) -> Self {
        match OptionType::from_tag(raw) {
            Some(kind) => TypeTag::Known(kind),
            None => TypeTag::Unknown(raw.to_string()),
        }
    }

    /// The recognized type, if any.
    pub fn known(&self) -> Option<OptionType> {
        match self {
            TypeTag::Known(kind) => Some(*kind),
            TypeTag::Unknown(_) => None,
        }
    }
}

impl From<OptionType> for TypeTag {
    fn from(kind: OptionType) -> Self {
        TypeTag::Known(kind)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Known(kind) => f.write_str(kind.tag()),
            TypeTag::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Definition of a single option.
///
/// Use [`OptionDefinition::new`] and the builder methods to construct one.
///
/// # Examples
///
/// ```
/// use optlayer_core::{ConfigValue, OptionDefinition, OptionType};
///
/// let jobs = OptionDefinition::new("jobs", OptionType::Number)
///     .with_alias('j')
///     .with_default(ConfigValue::Number(4.0))
///     .with_description("Number of parallel jobs");
///
/// assert_eq!(jobs.alias, Some('j'));
/// assert_eq!(jobs.option_type(), Some(OptionType::Number));
/// ```
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    /// Option name; must equal the schema key it is registered under.
    pub name: String,
    /// Single-character alias used with one leading dash.
    pub alias: Option<char>,
    /// Declared value shape.
    pub kind: TypeTag,
    /// Marks the option as optional in help output.
    pub optional: bool,
    /// Description lines for help output.
    pub description: Vec<String>,
    /// Declared default value.
    pub default: Option<ConfigValue>,
    /// Marks the option as required in help output.
    pub required: bool,
}

impl OptionDefinition {
    /// Creates a definition with the given name and type.
    pub fn new(name: impl Into<String>, kind: impl Into<TypeTag>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            kind: kind.into(),
            optional: false,
            description: Vec::new(),
            default: None,
            required: false,
        }
    }

    /// Sets the single-character alias.
    pub fn with_alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: impl Into<ConfigValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Appends a description line.
    pub fn with_description(mut self, line: impl Into<String>) -> Self {
        self.description.push(line.into());
        self
    }

    /// Marks the option as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The recognized option type, if the tag is valid.
    pub fn option_type(&self) -> Option<OptionType> {
        self.kind.known()
    }
}

/// An ordered option schema.
///
/// Entry order is significant: validation, registration, and default
/// resolution all walk the schema in insertion order, which in turn fixes
/// the order of diagnostics.
///
/// # Examples
///
/// ```
/// use optlayer_core::{OptionDefinition, OptionType, Schema};
///
/// let schema = Schema::new()
///     .with_option("config", OptionDefinition::new("config", OptionType::Module))
///     .with_option("verbose", OptionDefinition::new("verbose", OptionType::Boolean));
///
/// assert_eq!(schema.len(), 2);
/// assert!(schema.get("verbose").is_some());
/// assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["config", "verbose"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<(String, OptionDefinition)>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry and returns the schema.
    pub fn with_option(mut self, key: impl Into<String>, definition: OptionDefinition) -> Self {
        self.insert(key, definition);
        self
    }

    /// Adds an entry, replacing an existing entry under the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, definition: OptionDefinition) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = definition,
            None => self.entries.push((key, definition)),
        }
    }

    /// Looks up a definition by schema key.
    pub fn get(&self, key: &str) -> Option<&OptionDefinition> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, definition)| definition)
    }

    /// Iterates over `(key, definition)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionDefinition)> {
        self.entries
            .iter()
            .map(|(key, definition)| (key.as_str(), definition))
    }

    /// Iterates over schema keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the schema has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, OptionDefinition)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, OptionDefinition)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (key, definition) in iter {
            schema.insert(key, definition);
        }
        schema
    }
}
