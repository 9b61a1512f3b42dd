use std::collections::{HashMap, HashSet};

use crate::matcher::MatchTokens;
use crate::matcher::MatchError;
use crate::model::{Nargs, Position};

pub(crate) type PositionValue = (Position, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Bound {
    Range(u8, u8),
    Lower(u8),
}

impl Bound {
    pub(crate) fn min(&self) -> u8 {
        match self {
            Bound::Range(n, _) | Bound::Lower(n) => *n,
        }
    }

    pub(crate) fn max(&self) -> Option<u8> {
        match self {
            Bound::Range(_, n) => Some(*n),
            Bound::Lower(_) => None,
        }
    }
}

impl TryFrom<Nargs> for Bound {
    type Error = String;

    fn try_from(value: Nargs) -> Result<Self, Self::Error> {
        match value.max() {
            Some(max) if value.min() > max => Err(format!(
                "minimum {min} exceeds maximum {max}",
                min = value.min()
            )),
            Some(max) => Ok(Bound::Range(value.min(), max)),
            None => Ok(Bound::Lower(value.min())),
        }
    }
}


#[derive(Debug, Clone)]
pub(crate) struct ArgumentConfig {
    name: String,
    bound: Bound,
}

impl ArgumentConfig {
    pub(crate) fn new(name: impl Into<String>, bound: Bound) -> Self {
        Self {
            name: name.into(),
            bound,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionConfig {
    name: String,
    aliases: Vec<String>,
    short: Option<char>,
    bound: Bound,
    global: bool,
}

impl OptionConfig {
    pub(crate) fn new(name: impl Into<String>, short: Option<char>, bound: Bound) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::default(),
            short,
            bound,
            global: false,
        }
    }

    pub(crate) fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub(crate) fn with_global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn short(&self) -> &Option<char> {
        &self.short
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }

    pub(crate) fn global(&self) -> bool {
        self.global
    }
}

/// The matcher's view of one command in the tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct CommandConfig {
    name: String,
    options: Vec<OptionConfig>,
    arguments: Vec<ArgumentConfig>,
    sub_commands: HashMap<String, CommandConfig>,
}

impl CommandConfig {
    pub(crate) fn new(
        name: impl Into<String>,
        options: Vec<OptionConfig>,
        arguments: Vec<ArgumentConfig>,
        sub_commands: HashMap<String, CommandConfig>,
    ) -> Self {
        Self {
            name: name.into(),
            options,
            arguments,
            sub_commands,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn options(&self) -> &[OptionConfig] {
        &self.options
    }

    pub(crate) fn arguments(&self) -> &[ArgumentConfig] {
        &self.arguments
    }

    pub(crate) fn sub_command(&self, name: &str) -> Option<&CommandConfig> {
        self.sub_commands.get(name)
    }

    pub(crate) fn sub_commands(&self) -> impl Iterator<Item = &CommandConfig> {
        self.sub_commands.values()
    }
}

/// Everything the matcher found, one entry in `levels` per command on the `path`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Matches {
    pub path: Vec<String>,
    pub levels: Vec<Vec<MatchTokens>>,
    pub failed: HashSet<(usize, String)>,
    pub errors: Vec<(Position, MatchError)>,
    pub help: bool,
}

impl Matches {
    pub(crate) fn get(&self, level: usize, name: &str) -> Option<&MatchTokens> {
        self.levels
            .get(level)
            .and_then(|matches| matches.iter().find(|mt| mt.name == name))
    }

    pub(crate) fn has_failed(&self, level: usize, name: &str) -> bool {
        self.failed.contains(&(level, name.to_string()))
    }
}
