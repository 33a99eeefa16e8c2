//! Single-pass argv tokenizer.
//!
//! Walks the argument vector left to right with one token of lookahead.
//! Flags are matched against the state's registries; a matched option is
//! immediately claimed with provenance `Argv`, so a second occurrence is
//! emitted as [`TokenKind::AlreadyProvided`] and the first one wins.

use crate::resolved::{OptionValue, Provenance, ResolvedValue};
use crate::state::{ConfigurationState, OptionId};
use crate::types::OptionType;

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A positional argument.
    Default,
    /// A matched option with its raw value.
    Flag,
    /// An argument after `--`.
    Rest,
    /// A flag that matches no option.
    UnknownFlag,
    /// A second occurrence of an option.
    AlreadyProvided,
    /// A list option followed by nothing, or by another flag.
    ArgumentMissing,
    /// A scalar option at the end of argv.
    Unprovided,
    /// A config-only option on the command line.
    CannotBePassed,
}

/// Raw token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    None,
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl TokenValue {
    /// The single value, or an empty string for any other payload.
    pub fn into_text(self) -> String {
        match self {
            TokenValue::Text(text) => text,
            _ => String::new(),
        }
    }

    /// The list value, or an empty list for any other payload.
    pub fn into_list(self) -> Vec<String> {
        match self {
            TokenValue::List(items) => items,
            _ => Vec::new(),
        }
    }
}

/// One classified argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgvToken {
    pub kind: TokenKind,
    pub option: Option<OptionId>,
    pub value: TokenValue,
}

impl ArgvToken {
    fn bare(kind: TokenKind, value: TokenValue) -> Self {
        Self {
            kind,
            option: None,
            value,
        }
    }

    fn for_option(kind: TokenKind, option: OptionId, value: TokenValue) -> Self {
        Self {
            kind,
            option: Some(option),
            value,
        }
    }
}

/// Tokenizes `argv` against the registries in `state`.
///
/// Matching an option that is still unprovided claims it for `Argv` in
/// `state` before its value is consumed.
pub fn tokenize(argv: &[String], state: &mut ConfigurationState) -> Vec<ArgvToken> {
    let mut tokens = Vec::with_capacity(argv.len());
    let mut rest = false;
    let mut i = 0;

    while i < argv.len() {
        let arg = &argv[i];
        i += 1;

        if rest {
            tokens.push(ArgvToken::bare(TokenKind::Rest, TokenValue::Text(arg.clone())));
            continue;
        }

        let (flag, option) = if let Some(name) = arg.strip_prefix("--") {
            if name.is_empty() {
                rest = true;
                continue;
            }
            (name, state.option_id(name))
        } else if let Some(alias) = arg.strip_prefix('-') {
            (alias, single_char(alias).and_then(|c| state.alias_id(c)))
        } else {
            tokens.push(ArgvToken::bare(TokenKind::Default, TokenValue::Text(arg.clone())));
            continue;
        };

        // Unknown flags keep the name or alias without its dashes.
        let Some(id) = option else {
            tokens.push(ArgvToken::bare(TokenKind::UnknownFlag, TokenValue::Text(flag.to_string())));
            continue;
        };

        if state.entry(id).is_some_and(|entry| !entry.is_unprovided()) {
            tokens.push(ArgvToken::for_option(TokenKind::AlreadyProvided, id, TokenValue::None));
            continue;
        }

        if let Some(entry) = state.entry_mut(id) {
            *entry = OptionValue {
                provenance: Provenance::Argv,
                value: ResolvedValue::Null,
            };
        }

        let Some(kind) = state.definition(id).and_then(|d| d.option_type()) else {
            continue;
        };
        let next = argv.get(i).map(String::as_str);

        let token = match kind {
            OptionType::Boolean => {
                let value = match next {
                    Some("true") => {
                        i += 1;
                        true
                    }
                    Some("false") => {
                        i += 1;
                        false
                    }
                    _ => true,
                };
                ArgvToken::for_option(TokenKind::Flag, id, TokenValue::Bool(value))
            }
            OptionType::StringList
            | OptionType::NumberList
            | OptionType::FileList
            | OptionType::GlobList => match next {
                Some(value) if !value.starts_with('-') => {
                    i += 1;
                    let items = value.split(',').map(str::to_string).collect();
                    ArgvToken::for_option(TokenKind::Flag, id, TokenValue::List(items))
                }
                _ => ArgvToken::for_option(TokenKind::ArgumentMissing, id, TokenValue::None),
            },
            OptionType::Module
            | OptionType::File
            | OptionType::Glob
            | OptionType::Number
            | OptionType::Regex
            | OptionType::String => match next {
                Some(value) if !value.starts_with('-') => {
                    i += 1;
                    ArgvToken::for_option(TokenKind::Flag, id, TokenValue::Text(value.to_string()))
                }
                Some(_) => ArgvToken::for_option(TokenKind::ArgumentMissing, id, TokenValue::None),
                None => ArgvToken::for_option(TokenKind::Unprovided, id, TokenValue::None),
            },
            OptionType::Object | OptionType::Function => {
                ArgvToken::for_option(TokenKind::CannotBePassed, id, TokenValue::None)
            }
        };
        tokens.push(token);
    }

    tokens
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionDefinition, Schema};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn state() -> ConfigurationState {
        ConfigurationState::new(
            Schema::new()
                .with_option("config", OptionDefinition::new("config", OptionType::Module))
                .with_option("flag", OptionDefinition::new("flag", OptionType::Boolean).with_alias('f'))
                .with_option("list", OptionDefinition::new("list", OptionType::StringList))
                .with_option("name", OptionDefinition::new("name", OptionType::String).with_alias('n'))
                .with_option("hook", OptionDefinition::new("hook", OptionType::Function)),
        )
    }

    fn kinds(tokens: &[ArgvToken]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_boolean_lookahead() {
        let mut s = state();
        let tokens = tokenize(&argv(&["--flag", "false", "pos"]), &mut s);
        assert_eq!(kinds(&tokens), vec![TokenKind::Flag, TokenKind::Default]);
        assert_eq!(tokens[0].value, TokenValue::Bool(false));

        let mut s = state();
        let tokens = tokenize(&argv(&["-f", "--name", "x"]), &mut s);
        assert_eq!(tokens[0].value, TokenValue::Bool(true));
        assert_eq!(tokens[1].value, TokenValue::Text("x".to_string()));
    }

    #[test]
    fn test_boolean_does_not_consume_other_words() {
        let mut s = state();
        let tokens = tokenize(&argv(&["--flag", "yes"]), &mut s);
        assert_eq!(kinds(&tokens), vec![TokenKind::Flag, TokenKind::Default]);
        assert_eq!(tokens[0].value, TokenValue::Bool(true));
    }

    #[test]
    fn test_list_splits_on_commas() {
        let mut s = state();
        let tokens = tokenize(&argv(&["--list", "a,b,,c"]), &mut s);
        assert_eq!(
            tokens[0].value,
            TokenValue::List(argv(&["a", "b", "", "c"]))
        );
    }

    #[test]
    fn test_list_missing_argument_variants() {
        for args in [&["--list"][..], &["--list", "--flag"][..], &["--list", "--"][..]] {
            let mut s = state();
            let tokens = tokenize(&argv(args), &mut s);
            assert_eq!(tokens[0].kind, TokenKind::ArgumentMissing, "argv: {args:?}");
        }
    }

    #[test]
    fn test_scalar_missing_argument_distinguishes_end_of_input() {
        let mut s = state();
        let tokens = tokenize(&argv(&["-n"]), &mut s);
        assert_eq!(kinds(&tokens), vec![TokenKind::Unprovided]);

        let mut s = state();
        let tokens = tokenize(&argv(&["-n", "-f"]), &mut s);
        assert_eq!(kinds(&tokens), vec![TokenKind::ArgumentMissing, TokenKind::Flag]);
    }

    #[test]
    fn test_rest_mode_captures_everything_verbatim() {
        let mut s = state();
        let tokens = tokenize(&argv(&["a", "--", "--flag", "-x", "--", "b"]), &mut s);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Default,
                TokenKind::Rest,
                TokenKind::Rest,
                TokenKind::Rest,
                TokenKind::Rest
            ]
        );
        assert_eq!(s.provenance("flag"), Some(Provenance::Unprovided));
    }

    #[test]
    fn test_second_occurrence_is_already_provided() {
        let mut s = state();
        let tokens = tokenize(&argv(&["-n", "x", "--name", "y"]), &mut s);
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Flag, TokenKind::AlreadyProvided, TokenKind::Default]
        );
        assert_eq!(s.provenance("name"), Some(Provenance::Argv));
    }

    #[test]
    fn test_unknown_flags_drop_their_dashes() {
        let mut s = state();
        let tokens = tokenize(&argv(&["--nope", "-zz", "-q"]), &mut s);
        assert_eq!(
            tokens
                .iter()
                .map(|t| (t.kind, t.value.clone()))
                .collect::<Vec<_>>(),
            vec![
                (TokenKind::UnknownFlag, TokenValue::Text("nope".to_string())),
                (TokenKind::UnknownFlag, TokenValue::Text("zz".to_string())),
                (TokenKind::UnknownFlag, TokenValue::Text("q".to_string())),
            ]
        );
    }

    #[test]
    fn test_config_only_option_never_consumes() {
        let mut s = state();
        let tokens = tokenize(&argv(&["--hook", "value"]), &mut s);
        assert_eq!(kinds(&tokens), vec![TokenKind::CannotBePassed, TokenKind::Default]);
    }
}
