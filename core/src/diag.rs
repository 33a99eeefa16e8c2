//! Diagnostic catalog and collector.
//!
//! Every expected failure in the engine is reported as a [`Diagnostic`]: a
//! stable [`DiagnosticCode`] plus a message produced by substituting
//! positional arguments into the code's template. Codes are grouped by
//! phase: `1xx` schema shape, `2xx` command-line tokens, `3xx`
//! configuration modules.

use std::fmt;

use serde::Serialize;

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// The `config` option is missing from the schema.
    #[serde(rename = "ASP100")]
    OptionRequired,
    /// A schema key differs from its definition's name.
    #[serde(rename = "ASP101")]
    NameMismatch,
    /// Two definitions share an alias.
    #[serde(rename = "ASP102")]
    DuplicateAlias,
    /// A definition's type tag is not recognized.
    #[serde(rename = "ASP103")]
    InvalidOptionType,
    /// The `config` option has a type other than module.
    #[serde(rename = "ASP104")]
    UnexpectedOptionType,
    /// A declared default does not match the option's type.
    #[serde(rename = "ASP105")]
    DefaultValueType,
    /// An option was given more than once on the command line.
    #[serde(rename = "ASP200")]
    AlreadyProvided,
    /// A flag does not name any option.
    #[serde(rename = "ASP201")]
    InvalidFlag,
    /// A flag that takes a value was not followed by one.
    #[serde(rename = "ASP202")]
    ArgumentMissing,
    /// A config-only option appeared on the command line.
    #[serde(rename = "ASP204")]
    CannotBePassed,
    /// A command-line value could not be converted to the option's type.
    #[serde(rename = "ASP205")]
    InvalidArgumentValue,
    /// A configuration module is not an object.
    #[serde(rename = "ASP300")]
    MustBeObject,
    /// A configuration module property has the wrong shape.
    #[serde(rename = "ASP301")]
    ShapeTypeExpected,
    /// A configuration module sets an option the schema does not declare.
    #[serde(rename = "ASP303")]
    UnexpectedOption,
    /// A configuration module sets an option to a value of the wrong type.
    #[serde(rename = "ASP304")]
    ConfigOptionType,
    /// Any other problem with a configuration module.
    #[serde(rename = "ASP305")]
    InvalidConfiguration,
}

impl DiagnosticCode {
    /// The stable machine-readable code.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::OptionRequired => "ASP100",
            DiagnosticCode::NameMismatch => "ASP101",
            DiagnosticCode::DuplicateAlias => "ASP102",
            DiagnosticCode::InvalidOptionType => "ASP103",
            DiagnosticCode::UnexpectedOptionType => "ASP104",
            DiagnosticCode::DefaultValueType => "ASP105",
            DiagnosticCode::AlreadyProvided => "ASP200",
            DiagnosticCode::InvalidFlag => "ASP201",
            DiagnosticCode::ArgumentMissing => "ASP202",
            DiagnosticCode::CannotBePassed => "ASP204",
            DiagnosticCode::InvalidArgumentValue => "ASP205",
            DiagnosticCode::MustBeObject => "ASP300",
            DiagnosticCode::ShapeTypeExpected => "ASP301",
            DiagnosticCode::UnexpectedOption => "ASP303",
            DiagnosticCode::ConfigOptionType => "ASP304",
            DiagnosticCode::InvalidConfiguration => "ASP305",
        }
    }

    /// The message template with `{n}` placeholders.
    pub fn template(self) -> &'static str {
        match self {
            DiagnosticCode::OptionRequired => {
                "Invalid configuration option '--{0}': '--{0}' is always required in user defined definitions"
            }
            DiagnosticCode::NameMismatch => {
                "Invalid configuration option '--{0}': Option key '{0}' does not match name '{1}'"
            }
            DiagnosticCode::DuplicateAlias => {
                "Invalid configuration option '--{0}': Option '--{1}' already has alias '-{2}'"
            }
            DiagnosticCode::InvalidOptionType => {
                "Invalid configuration option '--{0}': Option type '{1}' is invalid"
            }
            DiagnosticCode::UnexpectedOptionType => {
                "Invalid configuration option '--{0}': Option type '{1}' is invalid, expected '{2}'"
            }
            DiagnosticCode::DefaultValueType => {
                "Invalid configuration option '--{0}': Default value is type '{1}', expected '{2}'"
            }
            DiagnosticCode::AlreadyProvided => {
                "Invalid CLI argument '--{0}': Option already provided"
            }
            DiagnosticCode::InvalidFlag => "Invalid CLI argument '{0}': Option is not valid",
            DiagnosticCode::ArgumentMissing => "Invalid CLI argument '--{0}': Argument missing",
            DiagnosticCode::CannotBePassed => {
                "Invalid CLI argument '--{0}': option has type '{1}' and cannot be passed via argv"
            }
            DiagnosticCode::InvalidArgumentValue => {
                "Invalid CLI argument '--{0}': Value '{1}' is not a valid {2}"
            }
            DiagnosticCode::MustBeObject => "Invalid Configuration at '{0}': Must be an object",
            DiagnosticCode::ShapeTypeExpected => {
                "Invalid Configuration at '{0}': Property '{1}' must be '{2}', received '{3}'"
            }
            DiagnosticCode::UnexpectedOption => {
                "Invalid Configuration Option at '{0}': Property '{1}' is invalid"
            }
            DiagnosticCode::ConfigOptionType => {
                "Invalid Configuration Option at '{0}': Property '{1}' has an invalid type '{2}', expected '{3}'"
            }
            DiagnosticCode::InvalidConfiguration => "Invalid Configuration at '{0}': {1}",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substitutes `{n}` placeholders with the matching positional argument.
///
/// Placeholders without a matching argument are left in place.
///
/// # Examples
///
/// ```
/// use optlayer_core::format_template;
///
/// assert_eq!(format_template("'--{0}' and '{1}' and '{0}'", &["a", "b"]), "'--a' and 'b' and 'a'");
/// assert_eq!(format_template("{2}", &["a"]), "{2}");
/// ```
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let digits = &after[..close];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let index: usize = digits.parse().ok()?;
            args.get(index).map(|arg| (*arg, close))
        });

        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// A single formatted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Stable code.
    pub code: DiagnosticCode,
    /// Rendered message.
    pub message: String,
}

impl Diagnostic {
    /// Renders `code`'s template with `args`.
    pub fn new(code: DiagnosticCode, args: &[&str]) -> Self {
        Self {
            code,
            message: format_template(code.template(), args),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Append-only, ordered diagnostic list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats and appends a diagnostic.
    pub fn push(&mut self, code: DiagnosticCode, args: &[&str]) {
        let diagnostic = Diagnostic::new(code, args);
        tracing::debug!(code = %code, message = %diagnostic.message, "diagnostic");
        self.items.push(diagnostic);
    }

    /// Moves every diagnostic from `other` to the end of this list.
    pub fn append(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates in the order diagnostics were reported.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Returns `true` if any diagnostic carries `code`.
    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    /// Rendered messages in order.
    pub fn messages(&self) -> Vec<&str> {
        self.items.iter().map(|d| d.message.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_message_repeats_first_argument() {
        let d = Diagnostic::new(DiagnosticCode::OptionRequired, &["config"]);
        assert_eq!(
            d.message,
            "Invalid configuration option '--config': '--config' is always required in user defined definitions"
        );
        assert_eq!(d.to_string(), d.message);
    }

    #[test]
    fn test_format_template_ignores_non_numeric_braces() {
        assert_eq!(format_template("{x} {0} {", &["a"]), "{x} a {");
        assert_eq!(format_template("{10}", &["a"]), "{10}");
    }

    #[test]
    fn test_collector_keeps_every_append_in_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticCode::InvalidFlag, &["--x"]);
        diagnostics.push(DiagnosticCode::InvalidFlag, &["--x"]);
        diagnostics.push(DiagnosticCode::ArgumentMissing, &["y"]);

        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.contains(DiagnosticCode::ArgumentMissing));
        assert!(!diagnostics.contains(DiagnosticCode::MustBeObject));
        assert_eq!(
            diagnostics.messages(),
            vec![
                "Invalid CLI argument '--x': Option is not valid",
                "Invalid CLI argument '--x': Option is not valid",
                "Invalid CLI argument '--y': Argument missing",
            ]
        );
    }

    #[test]
    fn test_code_serializes_as_stable_string() {
        let json = serde_json::to_value(Diagnostic::new(DiagnosticCode::MustBeObject, &["a.json"]))
            .unwrap();
        assert_eq!(json["code"], "ASP300");
        assert_eq!(json["message"], "Invalid Configuration at 'a.json': Must be an object");
    }
}
