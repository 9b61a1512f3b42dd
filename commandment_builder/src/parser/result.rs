use std::collections::HashMap;

use crate::parser::{ParseError, Value};

/// The immutable outcome of one parse.
///
/// Holds the matched command path, the resolved value of every parameter along that path, and every problem found.
/// Values are keyed by parameter name; a name is looked up from the deepest matched command toward the root.
pub struct ParseResult {
    path: Vec<String>,
    values: HashMap<(usize, String), Value>,
    errors: Vec<ParseError>,
    help: bool,
}

impl ParseResult {
    pub(crate) fn new(
        path: Vec<String>,
        values: HashMap<(usize, String), Value>,
        errors: Vec<ParseError>,
        help: bool,
    ) -> Self {
        Self {
            path,
            values,
            errors,
            help,
        }
    }

    /// The names of the matched commands, root first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The name of the deepest matched command.
    pub fn command(&self) -> &str {
        match self.path.last() {
            Some(name) => name,
            None => unreachable!("internal error - the path always contains the root"),
        }
    }

    /// Whether the parse found no problems.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every problem found, in the order found.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether `-h`/`--help` was given.
    /// When requested, nothing is resolved.
    pub fn help_requested(&self) -> bool {
        self.help
    }

    /// Whether a value (supplied or defaulted) exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        (0..self.path.len())
            .rev()
            .any(|level| self.values.contains_key(&(level, name.to_string())))
    }

    /// Get the value for `name`, searching from the deepest matched command toward the root.
    ///
    /// Returns `None` when there is no value, or when it is not of type `T`.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Command, Parameter, Scalar};
    ///
    /// let command_line = Command::new("program")
    ///     .add(Parameter::argument(Scalar::<u32>::new(), "count"))
    ///     .build();
    /// let result = command_line.parse_tokens(&["3"]);
    ///
    /// assert_eq!(result.get::<u32>("count"), Some(&3));
    /// assert_eq!(result.get::<i64>("count"), None);
    /// ```
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        (0..self.path.len())
            .rev()
            .find_map(|level| self.values.get(&(level, name.to_string())))
            .and_then(|value| value.downcast_ref::<T>())
    }
}

impl std::fmt::Debug for ParseResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&(usize, String)> = self.values.keys().collect();
        names.sort();
        f.debug_struct("ParseResult")
            .field("path", &self.path)
            .field("values", &names)
            .field("errors", &self.errors)
            .field("help", &self.help)
            .finish()
    }
}
