/// The cardinality of values to match for an argument/option.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    Precisely(u8),
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
    /// `?`: Either zero or one value.
    AtMostOne,
    /// Between `min` and `max` values (inclusive).
    Range(u8, u8),
    /// At least `min` values, without an upper limit.
    Lower(u8),
}

impl Nargs {
    /// The minimum number of values.
    pub fn min(&self) -> u8 {
        match self {
            Nargs::Precisely(n) => *n,
            Nargs::Any | Nargs::AtMostOne => 0,
            Nargs::AtLeastOne => 1,
            Nargs::Range(min, _) | Nargs::Lower(min) => *min,
        }
    }

    /// The maximum number of values, or `None` when unbounded.
    pub fn max(&self) -> Option<u8> {
        match self {
            Nargs::Precisely(n) => Some(*n),
            Nargs::AtMostOne => Some(1),
            Nargs::Range(_, max) => Some(*max),
            Nargs::Any | Nargs::AtLeastOne | Nargs::Lower(_) => None,
        }
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Where in the input a token (or part of one) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// The index into the input tokens (the program name excluded).
    pub index: usize,
    /// The byte offset within that token.
    pub offset: usize,
}

impl Position {
    pub(crate) fn new(index: usize, offset: usize) -> Self {
        Self { index, offset }
    }

    pub(crate) fn at(index: usize) -> Self {
        Self::new(index, 0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.index, self.offset)
    }
}
