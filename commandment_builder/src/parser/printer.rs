use terminal_size::{terminal_size, Width};

use crate::constant::*;
use crate::model::{Nargs, Position};
use crate::parser::interface::{ColumnRenderer, UserInterface};

// Used when the terminal width cannot be detected (ex: output is piped).
const DEFAULT_TOTAL_WIDTH: usize = 80;
const MAIN_INDENT: usize = 1;
const CHOICE_INDENT: usize = 2;

#[derive(Debug, Clone)]
pub(crate) struct OptionParameter {
    name: String,
    short: Option<char>,
    aliases: Vec<String>,
    nargs: Nargs,
    required: bool,
    help: Option<String>,
    choices: Vec<(String, String)>,
}

impl OptionParameter {
    #[cfg(test)]
    fn basic(name: &str, short: Option<char>, nargs: Nargs, help: Option<&str>) -> Self {
        Self::new(
            name.to_string(),
            short,
            Vec::default(),
            nargs,
            false,
            help.map(str::to_string),
            Vec::default(),
        )
    }

    pub(crate) fn new(
        name: String,
        short: Option<char>,
        aliases: Vec<String>,
        nargs: Nargs,
        required: bool,
        help: Option<String>,
        choices: Vec<(String, String)>,
    ) -> Self {
        Self {
            name,
            short,
            aliases,
            nargs,
            required,
            help,
            choices,
        }
    }

    fn flags(&self, grammar: &str) -> String {
        let grammar = prefixed(grammar);
        let mut flags = Vec::default();

        if let Some(s) = self.short {
            flags.push(format!("-{s}{grammar}"));
        }

        flags.push(format!("--{}{grammar}", self.name));

        for alias in &self.aliases {
            flags.push(format!("--{alias}{grammar}"));
        }

        flags.join(", ")
    }

    fn summary(&self, grammar: &str) -> String {
        let grammar = prefixed(grammar);
        let flag = match self.short {
            Some(s) => format!("-{s}{grammar}"),
            None => format!("--{}{grammar}", self.name),
        };

        if self.required {
            flag
        } else {
            format!("[{flag}]")
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArgumentParameter {
    name: String,
    nargs: Nargs,
    help: Option<String>,
    choices: Vec<(String, String)>,
}

impl ArgumentParameter {
    #[cfg(test)]
    fn basic(name: &str, nargs: Nargs, help: Option<&str>) -> Self {
        Self::new(
            name.to_string(),
            nargs,
            help.map(str::to_string),
            Vec::default(),
        )
    }

    pub(crate) fn new(
        name: String,
        nargs: Nargs,
        help: Option<String>,
        choices: Vec<(String, String)>,
    ) -> Self {
        Self {
            name,
            nargs,
            help,
            choices,
        }
    }
}

fn prefixed(grammar: &str) -> String {
    if grammar.is_empty() {
        String::default()
    } else {
        format!(" {grammar}")
    }
}

/// The usage grammar of a parameter (ex: `FLAG`, `[ITEM ...]`).
fn grammar(name: &str, nargs: Nargs) -> String {
    let example = name.to_ascii_uppercase().replace('-', "_");
    let mut parts: Vec<String> = (0..nargs.min()).map(|_| example.clone()).collect();

    match (nargs, nargs.max()) {
        (Nargs::AtLeastOne, _) => parts.push("[...]".to_string()),
        (Nargs::Lower(min), None) if min > 0 => parts.push("[...]".to_string()),
        (_, None) => parts.push(format!("[{example} ...]")),
        (_, Some(max)) if max == nargs.min() => {}
        (_, Some(max)) if max - nargs.min() == 1 => parts.push(format!("[{example}]")),
        (_, Some(_)) => parts.push(format!("[{example} ...]")),
    }

    parts.join(" ")
}

fn described(help: &Option<String>, choices: &[(String, String)]) -> String {
    let help = help.clone().unwrap_or_default();

    if choices.is_empty() {
        help
    } else {
        let variants: Vec<&str> = choices.iter().map(|(v, _)| v.as_str()).collect();
        format!("{{{}}} {help}", variants.join(", "))
            .trim_end()
            .to_string()
    }
}

/// Renders the help and usage of one command.
pub(crate) struct Printer {
    program: String,
    about: Option<String>,
    options: Vec<OptionParameter>,
    arguments: Vec<ArgumentParameter>,
    commands: Vec<(String, Option<String>)>,
    terminal_width: Option<usize>,
}

impl Printer {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(
            "program",
            None,
            Vec::default(),
            Vec::default(),
            Vec::default(),
            None,
        )
    }

    pub(crate) fn terminal(
        program: impl Into<String>,
        about: Option<String>,
        options: Vec<OptionParameter>,
        arguments: Vec<ArgumentParameter>,
        commands: Vec<(String, Option<String>)>,
    ) -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(program, about, options, arguments, commands, terminal_width)
    }

    pub(crate) fn new(
        program: impl Into<String>,
        about: Option<String>,
        options: Vec<OptionParameter>,
        arguments: Vec<ArgumentParameter>,
        mut commands: Vec<(String, Option<String>)>,
        terminal_width: Option<usize>,
    ) -> Self {
        commands.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            program: program.into(),
            about,
            options,
            arguments,
            commands,
            terminal_width,
        }
    }

    /// The single usage line (ex: `usage: app build [-h] [--jobs JOBS] TARGET`).
    pub(crate) fn usage(&self) -> String {
        let mut summary = vec![format!("[-{HELP_SHORT}]")];

        for option in &self.options {
            summary.push(option.summary(&grammar(&option.name, option.nargs)));
        }

        for argument in &self.arguments {
            let g = grammar(&argument.name, argument.nargs);

            if !g.is_empty() {
                summary.push(g);
            }
        }

        if !self.commands.is_empty() {
            let names: Vec<&str> = self.commands.iter().map(|(n, _)| n.as_str()).collect();
            summary.push(format!("{{{}}} ...", names.join(", ")));
        }

        format!("usage: {p} {s}", p = self.program, s = summary.join(" "))
    }

    pub(crate) fn print_usage_error(&self, user_interface: &(impl UserInterface + ?Sized)) {
        user_interface.print_diagnostic(self.usage());
    }

    pub(crate) fn print_help(&self, user_interface: &(impl UserInterface + ?Sized)) {
        let help_flags = format!("-{HELP_SHORT}, --{HELP_NAME}");
        // (indent, left, middle)
        let mut arguments_rows: Vec<(usize, String, String)> = Vec::default();
        let mut options_rows: Vec<(usize, String, String)> =
            vec![(MAIN_INDENT, help_flags, HELP_MESSAGE.to_string())];
        let mut commands_rows: Vec<(usize, String, String)> = Vec::default();

        for argument in &self.arguments {
            arguments_rows.push((
                MAIN_INDENT,
                grammar(&argument.name, argument.nargs),
                described(&argument.help, &argument.choices),
            ));

            for (variant, description) in &argument.choices {
                arguments_rows.push((
                    MAIN_INDENT + CHOICE_INDENT,
                    variant.clone(),
                    description.clone(),
                ));
            }
        }

        for option in &self.options {
            options_rows.push((
                MAIN_INDENT,
                option.flags(&grammar(&option.name, option.nargs)),
                described(&option.help, &option.choices),
            ));

            for (variant, description) in &option.choices {
                options_rows.push((
                    MAIN_INDENT + CHOICE_INDENT,
                    variant.clone(),
                    description.clone(),
                ));
            }
        }

        for (name, about) in &self.commands {
            commands_rows.push((MAIN_INDENT, name.clone(), about.clone().unwrap_or_default()));
        }

        let all_rows = || {
            arguments_rows
                .iter()
                .chain(options_rows.iter())
                .chain(commands_rows.iter())
        };
        let left_column_width = all_rows()
            .map(|(indent, left, _)| indent + left.chars().count())
            .max()
            .unwrap_or_default();
        let middle_column_width = all_rows()
            .map(|(_, _, middle)| middle.chars().count())
            .max()
            .unwrap_or_default();
        let column_renderer = ColumnRenderer::guided(
            left_column_width,
            middle_column_width,
            self.terminal_width.unwrap_or(DEFAULT_TOTAL_WIDTH),
        );

        user_interface.print(self.usage());

        if let Some(about) = &self.about {
            user_interface.print("".to_string());
            user_interface.print(about.clone());
        }

        for (heading, rows) in [
            ("positional arguments:", &arguments_rows),
            ("options:", &options_rows),
            ("commands:", &commands_rows),
        ] {
            if rows.is_empty() {
                continue;
            }

            user_interface.print("".to_string());
            user_interface.print(heading.to_string());

            for (indent, left, middle) in rows {
                for line in column_renderer.render(*indent, left, middle) {
                    user_interface.print(line);
                }
            }
        }
    }
}

/// Points out where in the input tokens an error occurred.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    position: Position,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(position: Position, tokens: &[&str]) -> Self {
        Self {
            position,
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let projection = self.tokens.join(" ");
        let column = match self.tokens.get(self.position.index) {
            Some(token) => {
                let preceding: usize = self.tokens[..self.position.index]
                    .iter()
                    .map(|t| t.chars().count() + 1)
                    .sum();
                let within = token.chars().count().saturating_sub(1);
                // The offset counts bytes; the caret counts characters.
                let offset = token
                    .char_indices()
                    .take_while(|(i, _)| *i < self.position.offset)
                    .count();
                preceding + std::cmp::min(offset, within)
            }
            // The error is past the last token (ex: a missing value).
            None => projection.chars().count(),
        };

        write!(f, "{projection}\n{:column$}^", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::util::InMemoryInterface;
    use rstest::rstest;

    #[test]
    fn print_help_empty() {
        // Setup
        let printer = Printer::new(
            "program",
            None,
            Vec::default(),
            Vec::default(),
            Vec::default(),
            Some(40),
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_help(&interface);

        // Verify
        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"usage: program [-h]

options:
 -h, --help   Show this help message
              and exit."#
        );
    }

    #[test]
    fn print_help_default_width() {
        let interface = InMemoryInterface::default();
        Printer::empty().print_help(&interface);

        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"usage: program [-h]

options:
 -h, --help   Show this help message and exit."#
        );
    }

    #[test]
    fn print_help_full() {
        // Setup
        let printer = Printer::new(
            "app build",
            Some("Build things.".to_string()),
            vec![
                OptionParameter::basic("flag", Some('f'), Nargs::Precisely(1), Some("message")),
                OptionParameter::new(
                    "level".to_string(),
                    None,
                    vec!["lvl".to_string()],
                    Nargs::Precisely(1),
                    true,
                    Some("the level".to_string()),
                    vec![
                        ("low".to_string(), "go slow".to_string()),
                        ("high".to_string(), "go fast".to_string()),
                    ],
                ),
            ],
            vec![
                ArgumentParameter::basic("target", Nargs::Precisely(1), Some("what to build")),
                ArgumentParameter::basic("extras", Nargs::Any, None),
            ],
            Vec::default(),
            Some(120),
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_help(&interface);

        // Verify
        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"usage: app build [-h] [-f FLAG] --level LEVEL TARGET [EXTRAS ...]

Build things.

positional arguments:
 TARGET                       what to build
 [EXTRAS ...]

options:
 -h, --help                   Show this help message and exit.
 -f FLAG, --flag FLAG         message
 --level LEVEL, --lvl LEVEL   {low, high} the level
   low                        go slow
   high                       go fast"#
        );
    }

    #[test]
    fn print_help_commands() {
        // Setup
        let printer = Printer::new(
            "app",
            None,
            vec![OptionParameter::basic(
                "verbose",
                Some('v'),
                Nargs::Precisely(0),
                None,
            )],
            Vec::default(),
            vec![
                ("test".to_string(), None),
                ("build".to_string(), Some("Build things.".to_string())),
            ],
            Some(120),
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_help(&interface);

        // Verify
        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"usage: app [-h] [-v] {build, test} ...

options:
 -h, --help      Show this help message and exit.
 -v, --verbose

commands:
 build           Build things.
 test"#
        );
    }

    #[test]
    fn print_usage_error() {
        let printer = Printer::new(
            "app",
            None,
            vec![OptionParameter::basic("jobs", None, Nargs::Precisely(1), None)],
            vec![ArgumentParameter::basic("item", Nargs::AtLeastOne, None)],
            Vec::default(),
            None,
        );
        let interface = InMemoryInterface::default();

        printer.print_usage_error(&interface);

        assert_eq!(
            interface.consume_error(),
            "usage: app [-h] [--jobs JOBS] ITEM [...]"
        );
    }

    #[rstest]
    #[case("item", Nargs::Precisely(0), "")]
    #[case("item", Nargs::Precisely(1), "ITEM")]
    #[case("item", Nargs::Precisely(2), "ITEM ITEM")]
    #[case("item", Nargs::Any, "[ITEM ...]")]
    #[case("item", Nargs::AtLeastOne, "ITEM [...]")]
    #[case("item", Nargs::AtMostOne, "[ITEM]")]
    #[case("item", Nargs::Range(1, 2), "ITEM [ITEM]")]
    #[case("item", Nargs::Range(0, 3), "[ITEM ...]")]
    #[case("item", Nargs::Range(2, 2), "ITEM ITEM")]
    #[case("item", Nargs::Lower(0), "[ITEM ...]")]
    #[case("item", Nargs::Lower(2), "ITEM ITEM [...]")]
    #[case("dry-run", Nargs::Precisely(1), "DRY_RUN")]
    fn grammars(#[case] name: &str, #[case] nargs: Nargs, #[case] expected: &str) {
        assert_eq!(grammar(name, nargs), expected);
    }

    #[rstest]
    #[case(None, vec![], "")]
    #[case(Some("help"), vec![], "help")]
    #[case(None, vec![("a", "x"), ("b", "y")], "{a, b}")]
    #[case(Some("help"), vec![("a", "x")], "{a} help")]
    fn descriptions(
        #[case] help: Option<&str>,
        #[case] choices: Vec<(&str, &str)>,
        #[case] expected: &str,
    ) {
        let choices: Vec<(String, String)> = choices
            .into_iter()
            .map(|(v, d)| (v.to_string(), d.to_string()))
            .collect();
        assert_eq!(described(&help.map(str::to_string), &choices), expected);
    }

    #[rstest]
    #[case(Position::at(0), vec![], "\n^")]
    #[case(Position::at(3), vec![], "\n^")]
    #[case(Position::at(0), vec!["abc"], "abc\n^")]
    #[case(Position::new(0, 1), vec!["abc"], "abc\n ^")]
    #[case(Position::new(0, 10), vec!["abc"], "abc\n  ^")]
    #[case(Position::new(1, 2), vec!["--flag", "abc"], "--flag abc\n         ^")]
    #[case(Position::at(2), vec!["a", "b"], "a b\n   ^")]
    #[case(Position::at(1), vec!["", "x"], " x\n ^")]
    #[case(Position::new(0, 3), vec!["-éxy"], "-éxy\n  ^")]
    #[case(Position::new(1, 8), vec!["ü", "--ünï=5"], "ü --ünï=5\n         ^")]
    fn error_context(
        #[case] position: Position,
        #[case] tokens: Vec<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(ErrorContext::new(position, &tokens).to_string(), expected);
    }
}
