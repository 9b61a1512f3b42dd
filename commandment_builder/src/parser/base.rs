use std::any::Any;
use std::collections::HashMap;
use thiserror::Error;

use crate::api::Context;
use crate::matcher::{
    ArgumentConfig, CommandConfig, MatchError, MatchTokens, Matches, OptionConfig,
    TokenMatcherError,
};
use crate::model::Position;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Error for an invalid command configuration.
///
/// Returned from [`Command::build_parser`](crate::Command::build_parser); these are programming errors, never user input errors.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

impl From<TokenMatcherError> for ConfigError {
    fn from(error: TokenMatcherError) -> Self {
        ConfigError(error.to_string())
    }
}

/// The category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An unrecognized option or a surplus value.
    Syntax,
    /// Too few or too many values for a parameter.
    Arity,
    /// A required parameter was not supplied.
    RequiredMissing,
    /// A value could not be converted (or the custom parser rejected it).
    Parse,
    /// A validator rejected the value.
    Validation,
}

/// A problem with the user's input.
///
/// Every problem found during a parse is collected into the [`ParseResult`](crate::ParseResult); none aborts the parse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Parse error: {message}")]
pub struct ParseError {
    kind: ErrorKind,
    symbol: Option<String>,
    message: String,
    position: Option<Position>,
}

impl ParseError {
    pub(crate) fn new(
        kind: ErrorKind,
        symbol: Option<String>,
        message: String,
        position: Option<Position>,
    ) -> Self {
        Self {
            kind,
            symbol,
            message,
            position,
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The display name of the offending parameter (ex: `--count` or `count`), when one is at fault.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// The description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where in the input the problem was found, when it can be pinned to a token.
    pub fn position(&self) -> Option<Position> {
        self.position
    }
}

impl From<(Position, MatchError)> for ParseError {
    fn from((position, error): (Position, MatchError)) -> Self {
        let kind = if error.is_arity() {
            ErrorKind::Arity
        } else {
            ErrorKind::Syntax
        };

        ParseError::new(kind, error.symbol(), error.to_string(), Some(position))
    }
}

pub(crate) type Value = Box<dyn Any + Send + Sync>;

/// Behaviour to resolve a parameter into its (type erased) value.
///
/// We use this at the top of the command object graph so the resolver needn't know each parameter's type.
pub(crate) trait AnonymousResolvable: Send + Sync {
    /// Resolve the parameter from its supplied tokens (if any), recording problems in `errors`.
    fn resolve(
        &self,
        supplied: Option<&MatchTokens>,
        context: &Context,
        errors: &mut Vec<ParseError>,
    ) -> Option<Value>;
}

pub(crate) type OptionCapture = (OptionConfig, Box<dyn AnonymousResolvable>);
pub(crate) type ArgumentCapture = (ArgumentConfig, Box<dyn AnonymousResolvable>);

/// The parameters of one command.
pub(crate) struct Resolver {
    options: Vec<OptionCapture>,
    arguments: Vec<ArgumentCapture>,
}

impl Resolver {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(Vec::default(), Vec::default())
    }

    pub(crate) fn new(options: Vec<OptionCapture>, arguments: Vec<ArgumentCapture>) -> Self {
        Self { options, arguments }
    }

    /// The matcher's view of this command.
    pub(crate) fn config(
        &self,
        name: impl Into<String>,
        sub_commands: HashMap<String, CommandConfig>,
    ) -> CommandConfig {
        CommandConfig::new(
            name,
            self.options.iter().map(|(oc, _)| oc.clone()).collect(),
            self.arguments.iter().map(|(ac, _)| ac.clone()).collect(),
            sub_commands,
        )
    }

    /// Resolve every parameter of the command at `level`: options first, then arguments in declared order.
    pub(crate) fn resolve(
        &self,
        level: usize,
        matches: &Matches,
        values: &mut HashMap<(usize, String), Value>,
        errors: &mut Vec<ParseError>,
    ) {
        let path = &matches.path[..=level];
        let symbols = self
            .options
            .iter()
            .map(|(oc, r)| (oc.name(), format!("--{}", oc.name()), r))
            .chain(
                self.arguments
                    .iter()
                    .map(|(ac, r)| (ac.name(), ac.name().to_string(), r)),
            );

        for (name, display_name, resolvable) in symbols {
            if matches.has_failed(level, name) {
                // Already reported by the matcher.
                continue;
            }

            let context = Context::new(&display_name, path);

            if let Some(value) = resolvable.resolve(matches.get(level, name), &context, errors) {
                values.insert((level, name.to_string()), value);
            } else {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("No value for '{display_name}' at level {level}.");
                }
            }
        }
    }
}
