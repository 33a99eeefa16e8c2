//! Values as they appear in configuration modules and schema defaults.
//!
//! [`ConfigValue`] is the loosely-typed shape a loaded configuration module
//! exposes. It is a superset of JSON: besides the usual scalars, arrays and
//! objects it can hold compiled regular expressions and callables, which
//! only a programmatic environment can produce.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// A callable exposed by a configuration module.
///
/// Cloning shares the underlying closure. Two values compare equal only if
/// they share the same closure.
#[derive(Clone)]
pub struct ConfigFn(Arc<dyn Fn(&[ConfigValue]) -> ConfigValue + Send + Sync>);

impl ConfigFn {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&[ConfigValue]) -> ConfigValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invokes the closure.
    pub fn call(&self, args: &[ConfigValue]) -> ConfigValue {
        (self.0)(args)
    }
}

impl fmt::Debug for ConfigFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfigFn(..)")
    }
}

impl PartialEq for ConfigFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// An insertion-ordered string-keyed map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigObject {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigObject {
    /// Creates an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up a value.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present, even when its value is `Null`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = ConfigObject::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

/// A value supplied by a configuration module or a schema default.
///
/// # Examples
///
/// ```
/// use optlayer_core::{ConfigObject, ConfigValue};
///
/// let module: ConfigValue = serde_json::json!({
///     "extends": "./base.json",
///     "options": { "jobs": 8 }
/// })
/// .into();
///
/// let object = module.as_object().unwrap();
/// assert_eq!(object.get("extends"), Some(&ConfigValue::from("./base.json")));
/// assert_eq!(module.type_name(), "Object");
/// ```
#[derive(Debug, Clone)]
pub enum ConfigValue {
    /// Absent or explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number; all numbers are floating point.
    Number(f64),
    /// String.
    String(String),
    /// Ordered list.
    Array(Vec<ConfigValue>),
    /// Ordered map.
    Object(ConfigObject),
    /// Compiled pattern.
    Regex(Regex),
    /// Callable.
    Function(ConfigFn),
}

impl ConfigValue {
    /// Display name of the value's runtime type, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "Null",
            ConfigValue::Bool(_) => "Boolean",
            ConfigValue::Number(_) => "Number",
            ConfigValue::String(_) => "String",
            ConfigValue::Array(_) => "Array",
            ConfigValue::Object(_) => "Object",
            ConfigValue::Regex(_) => "RegExp",
            ConfigValue::Function(_) => "Function",
        }
    }

    /// The string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The object payload, if this is an object.
    pub fn as_object(&self) -> Option<&ConfigObject> {
        match self {
            ConfigValue::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The array payload, if this is an array.
    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Renders the value as JSON. Regexes render as their source pattern,
    /// functions as the string `"[Function]"`, non-finite numbers as null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Object(object) => serde_json::Value::Object(
                object
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            ConfigValue::Regex(re) => serde_json::Value::String(re.as_str().to_string()),
            ConfigValue::Function(_) => serde_json::Value::String("[Function]".to_string()),
        }
    }
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigValue::Null, ConfigValue::Null) => true,
            (ConfigValue::Bool(a), ConfigValue::Bool(b)) => a == b,
            (ConfigValue::Number(a), ConfigValue::Number(b)) => a == b,
            (ConfigValue::String(a), ConfigValue::String(b)) => a == b,
            (ConfigValue::Array(a), ConfigValue::Array(b)) => a == b,
            (ConfigValue::Object(a), ConfigValue::Object(b)) => a == b,
            (ConfigValue::Regex(a), ConfigValue::Regex(b)) => a.as_str() == b.as_str(),
            (ConfigValue::Function(a), ConfigValue::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => ConfigValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(map) => ConfigValue::Object(map.into_iter().collect()),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        ConfigValue::Number(f64::from(n))
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<Regex> for ConfigValue {
    fn from(re: Regex) -> Self {
        ConfigValue::Regex(re)
    }
}

impl From<ConfigObject> for ConfigValue {
    fn from(object: ConfigObject) -> Self {
        ConfigValue::Object(object)
    }
}

impl From<ConfigFn> for ConfigValue {
    fn from(f: ConfigFn) -> Self {
        ConfigValue::Function(f)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::Array(items.into_iter().map(Into::into).collect())
    }
}
