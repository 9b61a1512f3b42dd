use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

use crate::constant::*;
use crate::matcher::api::*;
use crate::matcher::model::*;
use crate::matcher::tokenizer::*;
use crate::model::Position;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TokenMatcherError {
    #[error("Cannot duplicate the option '--{0}'.")]
    DuplicateOption(String),

    #[error("Cannot duplicate the short option '-{0}'.")]
    DuplicateShortOption(char),

    #[error("Cannot duplicate the parameter '{0}'.")]
    DuplicateParameter(String),

    #[error("Cannot redefine the reserved option '{0}'.")]
    ReservedOption(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MatchError {
    #[error("Not enough tokens provided to parameter '{name}' (provided {provided}, expected at least {expected}).")]
    Undercomplete {
        name: String,
        provided: usize,
        expected: u8,
    },

    #[error("Too many tokens provided to parameter '{name}' (provided {provided}, expected at most {expected}).")]
    Overcomplete {
        name: String,
        provided: usize,
        expected: u8,
    },

    #[error("Unexpected argument '{0}': no more arguments to match against.")]
    ArgumentsExhausted(String),

    #[error("Option '--{0}' does not exist.")]
    InvalidOption(String),

    #[error("Short option '-{0}' does not exist.")]
    InvalidShortOption(char),
}

impl MatchError {
    /// Whether the error concerns the number of values (as opposed to an unrecognized token).
    pub(crate) fn is_arity(&self) -> bool {
        matches!(
            self,
            MatchError::Undercomplete { .. } | MatchError::Overcomplete { .. }
        )
    }

    /// The display name of the parameter at fault, if any.
    pub(crate) fn symbol(&self) -> Option<String> {
        match self {
            MatchError::Undercomplete { name, .. } | MatchError::Overcomplete { name, .. } => {
                Some(name.clone())
            }
            MatchError::ArgumentsExhausted(_) => None,
            MatchError::InvalidOption(name) => Some(format!("--{name}")),
            MatchError::InvalidShortOption(short) => Some(format!("-{short}")),
        }
    }
}

impl From<CloseError> for MatchError {
    fn from(error: CloseError) -> Self {
        match error {
            CloseError::TooFewValues {
                name,
                provided,
                expected,
            } => MatchError::Undercomplete {
                name,
                provided,
                expected,
            },
            CloseError::TooManyValues {
                name,
                provided,
                expected,
            } => MatchError::Overcomplete {
                name,
                provided,
                expected,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionTarget {
    level: usize,
    name: String,
    bound: Bound,
    global: bool,
}

/// The options visible at one point of the command tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    long: HashMap<String, OptionTarget>,
    short: HashMap<char, OptionTarget>,
}

impl Scope {
    /// The scope a sub-command starts from: only the global options survive.
    pub(crate) fn descend(&self) -> Self {
        Self {
            long: self
                .long
                .iter()
                .filter(|(_, target)| target.global)
                .map(|(name, target)| (name.clone(), target.clone()))
                .collect(),
            short: self
                .short
                .iter()
                .filter(|(_, target)| target.global)
                .map(|(short, target)| (*short, target.clone()))
                .collect(),
        }
    }

    pub(crate) fn extend(
        &mut self,
        config: &CommandConfig,
        level: usize,
    ) -> Result<(), TokenMatcherError> {
        for option_config in config.options() {
            let target = OptionTarget {
                level,
                name: option_config.name().to_string(),
                bound: option_config.bound(),
                global: option_config.global(),
            };

            for long in std::iter::once(option_config.name())
                .chain(option_config.aliases().iter().map(String::as_str))
            {
                if long == HELP_NAME {
                    return Err(TokenMatcherError::ReservedOption(format!("--{long}")));
                }

                if self.long.insert(long.to_string(), target.clone()).is_some() {
                    return Err(TokenMatcherError::DuplicateOption(long.to_string()));
                }
            }

            if let Some(short) = option_config.short() {
                if *short == HELP_SHORT {
                    return Err(TokenMatcherError::ReservedOption(format!("-{short}")));
                }

                if self.short.insert(*short, target.clone()).is_some() {
                    return Err(TokenMatcherError::DuplicateShortOption(*short));
                }
            }
        }

        Ok(())
    }

    fn long(&self, name: &str) -> Option<&OptionTarget> {
        self.long.get(name)
    }

    fn short(&self, short: char) -> Option<&OptionTarget> {
        self.short.get(&short)
    }
}

impl CommandConfig {
    /// Check the whole tree for colliding names, taking inherited global options into account.
    pub(crate) fn validate(&self) -> Result<(), TokenMatcherError> {
        self.validate_within(&Scope::default(), 0)
    }

    fn validate_within(&self, inherited: &Scope, level: usize) -> Result<(), TokenMatcherError> {
        let mut scope = inherited.descend();
        scope.extend(self, level)?;
        let mut names = HashSet::new();

        for name in self
            .options()
            .iter()
            .map(OptionConfig::name)
            .chain(self.arguments().iter().map(ArgumentConfig::name))
        {
            if !names.insert(name) {
                return Err(TokenMatcherError::DuplicateParameter(name.to_string()));
            }
        }

        for sub_command in self.sub_commands() {
            sub_command.validate_within(&scope, level + 1)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferClass {
    Opt,
    Arg,
}

#[derive(Debug)]
struct OpenBuffer {
    class: BufferClass,
    level: usize,
    buffer: MatchBuffer,
}

#[derive(Debug)]
struct Level<'c> {
    config: &'c CommandConfig,
    arguments: VecDeque<&'c ArgumentConfig>,
    matches: Vec<MatchTokens>,
}

impl<'c> Level<'c> {
    fn new(config: &'c CommandConfig) -> Self {
        Self {
            config,
            arguments: config.arguments().iter().collect(),
            matches: Vec::default(),
        }
    }
}

/// Walks the command tree, aligning tokens to options, arguments and sub-commands.
///
/// Errors never stop the walk; they are collected and reported together on `close`.
#[derive(Debug)]
pub(crate) struct TokenMatcher<'c> {
    levels: Vec<Level<'c>>,
    scope: Scope,
    buffer: Option<OpenBuffer>,
    /// An argument interrupted by an option, resumed by the next positional value.
    parked: Option<OpenBuffer>,
    separated: bool,
    errors: Vec<(Position, MatchError)>,
    failed: HashSet<(usize, String)>,
    help: bool,
}

impl<'c> TokenMatcher<'c> {
    pub(crate) fn new(root: &'c CommandConfig) -> Self {
        let mut scope = Scope::default();

        if let Err(error) = scope.extend(root, 0) {
            unreachable!("internal error - the command tree must be validated: {error}");
        }

        Self {
            levels: vec![Level::new(root)],
            scope,
            buffer: None,
            parked: None,
            separated: false,
            errors: Vec::default(),
            failed: HashSet::default(),
            help: false,
        }
    }

    pub(crate) fn feed(&mut self, token: Token) {
        let Token { kind, position } = token;

        match kind {
            TokenKind::Separator => {
                self.close_option();
                self.separated = true;
            }
            TokenKind::Long { name, value } => self.match_option(position, name, value),
            TokenKind::Short { flags, value } => self.match_option_short(position, flags, value),
            TokenKind::Value(value) => self.match_value(position, value),
        }
    }

    fn current(&self) -> &'c CommandConfig {
        match self.levels.last() {
            Some(level) => level.config,
            None => unreachable!("internal error - the root level is never removed"),
        }
    }

    fn match_value(&mut self, position: Position, value: String) {
        if self.separated {
            return self.match_argument(position, value);
        }

        // 1. An option that hasn't met its minimum claims the value.
        if let Some(open) = self.buffer.as_mut() {
            if open.class == BufferClass::Opt && !open.buffer.can_close() {
                open.buffer.push(position, value);
                return;
            }
        }

        // 2. Descend into a sub-command.
        if let Some(sub_command) = self.current().sub_command(&value) {
            return self.descend(sub_command, position);
        }

        // 3. An option that may still take values.
        if let Some(open) = self.buffer.as_mut() {
            if open.class == BufferClass::Opt && open.buffer.is_open() {
                open.buffer.push(position, value);
                return;
            }
        }

        // 4. Match against an argument.
        self.match_argument(position, value)
    }

    fn match_argument(&mut self, position: Position, value: String) {
        self.close_option();

        if self.buffer.is_none() {
            self.buffer = self.parked.take();
        }

        let open_argument = matches!(&self.buffer, Some(open) if open.buffer.is_open());

        if open_argument {
            if let Some(open) = self.buffer.as_mut() {
                open.buffer.push(position, value);
            }

            return;
        }

        // Flip to the next argument.
        self.close_buffer();
        let level = self.levels.len() - 1;

        loop {
            match self.levels[level].arguments.pop_front() {
                Some(argument_config) => {
                    let mut buffer =
                        MatchBuffer::new(argument_config.name(), argument_config.bound(), position);

                    if !buffer.is_open() {
                        // Arguments that take no values are matched in passing.
                        self.buffer = Some(OpenBuffer {
                            class: BufferClass::Arg,
                            level,
                            buffer,
                        });
                        self.close_buffer();
                        continue;
                    }

                    buffer.push(position, value);
                    self.buffer = Some(OpenBuffer {
                        class: BufferClass::Arg,
                        level,
                        buffer,
                    });
                }
                None => {
                    self.error(position, MatchError::ArgumentsExhausted(value));
                }
            }

            return;
        }
    }

    fn match_option(&mut self, position: Position, name: String, value: Option<String>) {
        self.park_argument();

        if name == HELP_NAME {
            self.help = true;
            return;
        }

        match self.scope.long(&name).cloned() {
            Some(target) => {
                // The 3 comes from the option specifier '--' and value specifier '='.
                let value_position = Position::new(position.index, name.len() + 3);
                self.open_option(target, position, value.map(|v| (value_position, v)));
            }
            None => self.error(position, MatchError::InvalidOption(name)),
        }
    }

    fn match_option_short(&mut self, position: Position, flags: String, value: Option<String>) {
        // Negative numbers, such as '-5' or '-0.5', unless they name a short option.
        if let Some(first) = flags.chars().next() {
            if first.is_ascii_digit() && self.scope.short(first).is_none() {
                let raw = match value {
                    Some(v) => format!("-{flags}={v}"),
                    None => format!("-{flags}"),
                };
                return self.match_value(position, raw);
            }
        }

        self.park_argument();

        let mut value = value;
        let count = flags.chars().count();

        for (i, (offset, single)) in flags.char_indices().enumerate() {
            // The 1 comes from the short option specifier '-'.
            let flag_position = Position::new(position.index, offset + 1);

            if single == HELP_SHORT {
                self.help = true;
                continue;
            }

            let target = match self.scope.short(single) {
                Some(target) => target.clone(),
                None => {
                    self.error(flag_position, MatchError::InvalidShortOption(single));
                    continue;
                }
            };

            if i + 1 == count {
                // Only the final flag may accept subsequent tokens.
                // The 2 comes from the short option specifier '-' and value specifier '='.
                let value_position = Position::new(position.index, flags.len() + 2);
                self.open_option(
                    target,
                    flag_position,
                    value.take().map(|v| (value_position, v)),
                );
                return;
            }

            if target.bound.max() != Some(0) {
                // The remainder of the token is the value, as in '-n5'.
                let rest_offset = offset + single.len_utf8();
                let mut rest = flags[rest_offset..].to_string();

                if let Some(v) = value.take() {
                    rest.push('=');
                    rest.push_str(&v);
                }

                let value_position = Position::new(position.index, rest_offset + 1);
                self.open_option(target, flag_position, Some((value_position, rest)));
                return;
            }

            // All flags in the head of the token must allow no values.
            self.open_option(target, flag_position, None);
            self.close_buffer();
        }
    }

    fn open_option(
        &mut self,
        target: OptionTarget,
        position: Position,
        attached: Option<PositionValue>,
    ) {
        let mut buffer = MatchBuffer::new(target.name, target.bound, position);
        let closed = attached.is_some();

        if let Some((value_position, value)) = attached {
            buffer.push(value_position, value);
        }

        self.buffer = Some(OpenBuffer {
            class: BufferClass::Opt,
            level: target.level,
            buffer,
        });

        if closed {
            // Options using k=v syntax cannot follow up with more values afterwards.
            self.close_buffer();
        }
    }

    fn descend(&mut self, config: &'c CommandConfig, position: Position) {
        self.close_buffer();
        self.close_parked();
        let level = self.levels.len();
        let mut scope = self.scope.descend();

        if let Err(error) = scope.extend(config, level) {
            unreachable!("internal error - the command tree must be validated: {error}");
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Descending into sub-command '{}' at {position}.",
                config.name()
            );
        }
        #[cfg(not(feature = "tracing_debug"))]
        let _ = position;

        self.scope = scope;
        self.levels.push(Level::new(config));
    }

    fn park_argument(&mut self) {
        if matches!(&self.buffer, Some(open) if open.class == BufferClass::Arg && open.buffer.is_open())
        {
            self.close_parked();
            self.parked = self.buffer.take();
        } else {
            self.close_buffer();
        }
    }

    fn close_parked(&mut self) {
        if let Some(parked) = self.parked.take() {
            self.close_buffer();
            self.buffer = Some(parked);
            self.close_buffer();
        }
    }

    fn close_option(&mut self) {
        if matches!(&self.buffer, Some(open) if open.class == BufferClass::Opt) {
            self.close_buffer();
        }
    }

    fn close_buffer(&mut self) {
        let OpenBuffer {
            class,
            level,
            buffer,
        } = match self.buffer.take() {
            Some(open) => open,
            None => return,
        };
        let name = buffer.name().to_string();
        let position = buffer.position();

        match buffer.close() {
            Ok(match_tokens) => self.merge(class, level, match_tokens),
            Err(error) => {
                let error = match (class, MatchError::from(error)) {
                    (BufferClass::Opt, MatchError::Undercomplete { name, provided, expected }) => {
                        MatchError::Undercomplete {
                            name: format!("--{name}"),
                            provided,
                            expected,
                        }
                    }
                    (BufferClass::Opt, MatchError::Overcomplete { name, provided, expected }) => {
                        MatchError::Overcomplete {
                            name: format!("--{name}"),
                            provided,
                            expected,
                        }
                    }
                    (_, error) => error,
                };
                self.failed.insert((level, name));
                self.error(position, error);
            }
        }
    }

    fn merge(&mut self, class: BufferClass, level: usize, match_tokens: MatchTokens) {
        let matches = &mut self.levels[level].matches;

        match matches.iter_mut().find(|mt| mt.name == match_tokens.name) {
            // A repeated option accumulates its values.
            Some(existing) if class == BufferClass::Opt => {
                existing.values.extend(match_tokens.values);
                let provided = existing.values.len();
                let bound = self.levels[level]
                    .config
                    .options()
                    .iter()
                    .find(|oc| oc.name() == match_tokens.name)
                    .map(OptionConfig::bound);

                if let Some(expected) = bound.and_then(|b| b.max()) {
                    // Reported once, by the repeat which first overflows.
                    if provided > expected as usize
                        && self.failed.insert((level, match_tokens.name.clone()))
                    {
                        self.error(
                            match_tokens.position,
                            MatchError::Overcomplete {
                                name: format!("--{}", match_tokens.name),
                                provided,
                                expected,
                            },
                        );
                    }
                }
            }
            Some(_) => unreachable!("internal error - an argument is matched at most once"),
            None => matches.push(match_tokens),
        }
    }

    fn error(&mut self, position: Position, error: MatchError) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Match error at {position}: {error}");
        }

        self.errors.push((position, error));
    }

    pub(crate) fn close(mut self) -> Matches {
        self.close_buffer();
        self.close_parked();
        let mut path = Vec::with_capacity(self.levels.len());
        let mut levels = Vec::with_capacity(self.levels.len());

        for level in self.levels {
            path.push(level.config.name().to_string());
            levels.push(level.matches);
        }

        Matches {
            path,
            levels,
            failed: self.failed,
            errors: self.errors,
            help: self.help,
        }
    }
}

/// Tokenize and match the input against the command tree rooted at `root`.
pub(crate) fn match_tokens(root: &CommandConfig, input: &[&str]) -> Matches {
    let mut token_matcher = TokenMatcher::new(root);

    for token in tokenize(input) {
        token_matcher.feed(token);
    }

    token_matcher.close()
}
