use crate::model::Position;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `--name` or `--name=value`.
    Long { name: String, value: Option<String> },
    /// `-abc` or `-abc=value`: one or more short flags.
    Short { flags: String, value: Option<String> },
    /// Anything else; every token after the separator.
    Value(String),
    /// `--`.
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    fn new(kind: TokenKind, index: usize) -> Self {
        Self {
            kind,
            position: Position::at(index),
        }
    }
}

/// Lex the input into tokens.
///
/// Lexing never fails: whether `-x` names an option or is a value is left for the matcher to decide.
pub(crate) fn tokenize(input: &[&str]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(input.len());
    let mut separated = false;

    for (index, raw) in input.iter().enumerate() {
        let kind = if separated {
            TokenKind::Value(raw.to_string())
        } else if *raw == "--" {
            separated = true;
            TokenKind::Separator
        } else if let Some(body) = raw.strip_prefix("--") {
            let (name, value) = split_equals_delimiter(body);
            TokenKind::Long {
                name: name.to_string(),
                value: value.map(str::to_string),
            }
        } else if let Some(body) = raw.strip_prefix('-').filter(|body| !body.is_empty()) {
            let (flags, value) = split_equals_delimiter(body);
            TokenKind::Short {
                flags: flags.to_string(),
                value: value.map(str::to_string),
            }
        } else {
            TokenKind::Value(raw.to_string())
        };

        tokens.push(Token::new(kind, index));
    }

    #[cfg(feature = "tracing_debug")]
    {
        debug!("Tokenized {} inputs: {tokens:?}", input.len());
    }

    tokens
}

fn split_equals_delimiter(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((n, v)) => (n, Some(v)),
        None => (token, None),
    }
}
