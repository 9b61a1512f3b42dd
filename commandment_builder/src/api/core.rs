use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::api::{Parameter, ParameterClass};
use crate::constant::program_name;
use crate::matcher::{ArgumentConfig, OptionConfig};
use crate::parser::{
    Action, ArgumentCapture, ArgumentParameter, CommandLine, CommandUnit, ConfigError,
    ConsoleInterface, OptionCapture, OptionParameter, ParseResult, Printer, Resolver,
    UserInterface,
};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A command of the command line, along with its sub-commands.
///
/// ### Example
/// ```
/// use commandment_builder::Command;
///
/// let command_line = Command::new("program")
///     // Configure with Command::add, Command::command, and Command::action.
///     .build();
/// let result = command_line.parse_tokens(&[]);
///
/// assert!(result.is_success());
/// ```
pub struct Command {
    name: String,
    about: Option<String>,
    option_parameters: Vec<OptionParameter>,
    argument_parameters: Vec<ArgumentParameter>,
    global_parameters: Vec<OptionParameter>,
    option_captures: Vec<OptionCapture>,
    argument_captures: Vec<ArgumentCapture>,
    sub_commands: Vec<Command>,
    action: Option<Action>,
    deferred_error: Option<ConfigError>,
}

impl Command {
    /// Create a command.
    ///
    /// As the root of the tree, `name` is the program name shown in the help and usage.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            option_parameters: Vec::default(),
            argument_parameters: Vec::default(),
            global_parameters: Vec::default(),
            option_captures: Vec::default(),
            argument_captures: Vec::default(),
            sub_commands: Vec::default(),
            action: None,
            deferred_error: None,
        }
    }

    /// Create the root command, named after the running program.
    pub fn program() -> Self {
        Self::new(program_name())
    }

    /// Document the about message for this command.
    /// If repeated, only the final message will apply.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::Command;
    ///
    /// let command_line = Command::new("program")
    ///     .about("--this will get discarded--")
    ///     .about("My program that does awesome stuff.  Check it out!")
    ///     .build();
    /// ```
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    fn defer(&mut self, error: ConfigError) {
        // Only the first problem is reported.
        self.deferred_error.get_or_insert(error);
    }

    /// Add an argument/option to the command.
    ///
    /// The order of argument parameters corresponds to their positional order during parsing.
    /// The order of option parameters does not affect the command semantics.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Command, Parameter, Scalar};
    ///
    /// let command_line = Command::new("program")
    ///     .add(Parameter::argument(Scalar::<u32>::new(), "a"))
    ///     .add(Parameter::argument(Scalar::<u32>::new(), "b"))
    ///     .build();
    /// let result = command_line.parse_tokens(&["1", "2"]);
    ///
    /// assert_eq!(result.get::<u32>("a"), Some(&1));
    /// assert_eq!(result.get::<u32>("b"), Some(&2));
    /// ```
    pub fn add<T: Send + Sync + 'static>(mut self, parameter: Parameter<T>) -> Self {
        let inner = parameter.consume();

        if let Err(message) = inner.validate() {
            self.defer(ConfigError(message));
            return self;
        }

        match inner.class() {
            ParameterClass::Opt => {
                self.option_parameters.push(OptionParameter::from(&inner));

                if inner.is_global() {
                    self.global_parameters.push(OptionParameter::from(&inner));
                }

                self.option_captures
                    .push((OptionConfig::from(&inner), Box::new(inner)));
            }
            ParameterClass::Arg => {
                self.argument_parameters
                    .push(ArgumentParameter::from(&inner));
                self.argument_captures
                    .push((ArgumentConfig::from(&inner), Box::new(inner)));
            }
        }

        self
    }

    /// Setup a sub-command.
    ///
    /// The sub-command is selected when its `name` appears in the input (after any values owed to this command's options).
    /// Sub-command names must be unique within their parent.
    /// The order of sub-commands does not affect the command semantics.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Command, Parameter, Scalar};
    ///
    /// let command_line = Command::new("program")
    ///     .command("a", |sub| sub.add(Parameter::argument(Scalar::<u32>::new(), "value_a")))
    ///     .command("b", |sub| {
    ///         sub.about("Description for the sub-command 'b'.")
    ///             .add(Parameter::argument(Scalar::<u32>::new(), "value_b"))
    ///     })
    ///     .build();
    /// let result = command_line.parse_tokens(&["a", "1"]);
    ///
    /// assert_eq!(result.command(), "a");
    /// assert_eq!(result.get::<u32>("value_a"), Some(&1));
    /// assert_eq!(result.get::<u32>("value_b"), None);
    /// ```
    pub fn command(
        mut self,
        name: impl Into<String>,
        setup_fn: impl FnOnce(Command) -> Command,
    ) -> Self {
        let name = name.into();

        if name.is_empty() || name.starts_with('-') {
            self.defer(ConfigError(format!(
                "command '{}' contains invalid sub-command '{name}'.",
                self.name
            )));
        } else if self.sub_commands.iter().any(|c| c.name == name) {
            self.defer(ConfigError(format!(
                "command '{}' contains duplicate sub-command '{name}'.",
                self.name
            )));
        } else {
            self.sub_commands.push(setup_fn(Command::new(name)));
        }

        self
    }

    /// Bind a blocking action to this command, returning the exit code.
    /// If repeated, only the final action will apply.
    ///
    /// The action runs when this command is the deepest matched command, or when it is the nearest ancestor with an action.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Command, Parameter, Scalar};
    ///
    /// let command_line = Command::new("program")
    ///     .add(Parameter::argument(Scalar::<i32>::new(), "code"))
    ///     .action(|result| *result.get::<i32>("code").unwrap())
    ///     .build();
    ///
    /// assert_eq!(command_line.invoke_tokens(&["3"]), 3);
    /// ```
    pub fn action(mut self, action: impl Fn(&ParseResult) -> i32 + Send + Sync + 'static) -> Self {
        self.action.replace(Action::Blocking(Box::new(action)));
        self
    }

    /// Bind a cancellable async action to this command, resolving to the exit code.
    /// If repeated, only the final action will apply.
    ///
    /// The action receives the cancellation token of the invocation; cancellation is cooperative, so the action is responsible for observing it.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{CancellationToken, Command};
    ///
    /// let command_line = Command::new("program")
    ///     .async_action(|_result, cancellation: CancellationToken| async move {
    ///         if cancellation.is_cancelled() {
    ///             1
    ///         } else {
    ///             0
    ///         }
    ///     })
    ///     .build();
    ///
    /// assert_eq!(command_line.invoke_tokens(&[]), 0);
    /// ```
    pub fn async_action<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(ParseResult, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = i32> + Send + 'static,
    {
        self.action.replace(Action::Cancellable(Box::new(
            move |result: ParseResult, cancellation: CancellationToken| -> BoxFuture<'static, i32> {
                action(result, cancellation).boxed()
            },
        )));
        self
    }

    fn build_unit(
        self,
        program: &str,
        inherited: &[OptionParameter],
    ) -> Result<CommandUnit, ConfigError> {
        if let Some(error) = self.deferred_error {
            return Err(error);
        }

        let Command {
            about,
            option_parameters,
            argument_parameters,
            global_parameters,
            option_captures,
            argument_captures,
            sub_commands,
            action,
            ..
        } = self;
        let mut descendant_globals = inherited.to_vec();
        descendant_globals.extend(global_parameters);
        let commands = sub_commands
            .iter()
            .map(|c| (c.name.clone(), c.about.clone()))
            .collect();
        let mut units = HashMap::default();

        for sub_command in sub_commands {
            let name = sub_command.name.clone();
            let sub_program = format!("{program} {name}");
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Building sub-command '{sub_program}'.");
            }

            let unit = sub_command.build_unit(&sub_program, &descendant_globals)?;
            units.insert(name, unit);
        }

        let mut visible_options = inherited.to_vec();
        visible_options.extend(option_parameters);

        Ok(CommandUnit::new(
            Resolver::new(option_captures, argument_captures),
            Printer::terminal(
                program,
                about,
                visible_options,
                argument_parameters,
                commands,
            ),
            action,
            units,
        ))
    }

    fn build_with_interface(
        self,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<CommandLine, ConfigError> {
        let program = self.name.clone();
        let root = self.build_unit(&program, &[])?;
        CommandLine::new(program, root, user_interface)
    }

    /// Build the command line as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    pub fn build_parser(self) -> Result<CommandLine, ConfigError> {
        self.build_with_interface(Box::new(ConsoleInterface::default()))
    }

    /// Build the command line.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> CommandLine {
        match self.build_parser() {
            Ok(command_line) => command_line,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collection, Scalar, Switch};
    use crate::model::Nargs;
    use crate::parser::util::InMemoryInterface;
    use crate::parser::ErrorKind;
    use crate::test::assert_contains;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn build(command: Command) -> (CommandLine, InMemoryInterface) {
        let interface = InMemoryInterface::default();
        let command_line = command
            .build_with_interface(Box::new(interface.clone()))
            .unwrap();
        (command_line, interface)
    }

    fn build_error(command: Command) -> String {
        match command.build_with_interface(Box::new(InMemoryInterface::default())) {
            Ok(_) => panic!("expected a config error"),
            Err(error) => error.to_string(),
        }
    }

    #[test]
    fn empty() {
        // Setup
        let (command_line, interface) = build(Command::new("program"));

        // Execute
        let result = command_line.parse_tokens(&[]);

        // Verify
        assert!(result.is_success());
        assert_eq!(result.command(), "program");
        assert_eq!(interface.consume(), (None, None));
    }

    #[test]
    fn program() {
        assert!(!Command::program().name.is_empty());
    }

    #[rstest]
    #[case(vec![], false, None, vec![])]
    #[case(vec!["-v"], true, None, vec![])]
    #[case(vec!["--items", "1", "2", "-v"], true, None, vec![1, 2])]
    #[case(vec!["x", "--items", "3"], false, Some("x"), vec![3])]
    #[case(vec!["--items=4", "--", "-v"], false, Some("-v"), vec![4])]
    fn add(
        #[case] tokens: Vec<&str>,
        #[case] verbose: bool,
        #[case] name: Option<&str>,
        #[case] items: Vec<u32>,
    ) {
        // Setup
        let (command_line, _) = build(
            Command::new("program")
                .add(Parameter::option(Switch::new(true), "verbose", Some('v')).default_value(false))
                .add(Parameter::option(
                    Collection::<Vec<u32>, u32>::new(Nargs::AtLeastOne),
                    "items",
                    None,
                ))
                .add(Parameter::argument(Scalar::<String>::new(), "name").zero_or_one_arg()),
        );

        // Execute
        let result = command_line.parse_tokens(tokens.as_slice());

        // Verify
        assert!(result.is_success(), "{result:?}");
        assert_eq!(result.get::<bool>("verbose"), Some(&verbose));
        assert_eq!(result.get::<String>("name").map(String::as_str), name);

        if items.is_empty() {
            assert_eq!(result.get::<Vec<u32>>("items"), None);
        } else {
            assert_eq!(result.get::<Vec<u32>>("items"), Some(&items));
        }
    }

    #[test]
    fn add_errors_accumulate() {
        // Setup
        let (command_line, _) = build(
            Command::new("program")
                .add(Parameter::option(Scalar::<u8>::new(), "level", None).required())
                .add(Parameter::argument(Scalar::<u32>::new(), "count"))
                .add(Parameter::argument(Scalar::<u32>::new(), "other").less_than(5)),
        );

        // Execute
        let result = command_line.parse_tokens(&["abc", "7", "--bogus"]);

        // Verify
        let kinds: Vec<ErrorKind> = result.errors().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::Syntax,
                ErrorKind::RequiredMissing,
                ErrorKind::Parse,
                ErrorKind::Validation,
            ]
        );
        let symbols: Vec<Option<&str>> = result.errors().iter().map(|e| e.symbol()).collect();
        assert_eq!(
            symbols,
            vec![Some("--bogus"), Some("--level"), Some("count"), Some("other")]
        );
    }

    #[rstest]
    #[case(vec!["-v", "build"])]
    #[case(vec!["build", "-v"])]
    #[case(vec!["build", "--verbose", "--jobs", "2"])]
    fn global_option(#[case] tokens: Vec<&str>) {
        // Setup
        let (command_line, _) = build(
            Command::new("app")
                .add(Parameter::option(Switch::new(true), "verbose", Some('v')).global())
                .command("build", |sub| {
                    sub.add(Parameter::option(Scalar::<u8>::new(), "jobs", Some('j')))
                }),
        );

        // Execute
        let result = command_line.parse_tokens(tokens.as_slice());

        // Verify
        assert!(result.is_success(), "{result:?}");
        assert_eq!(result.path(), &["app".to_string(), "build".to_string()]);
        assert_eq!(result.get::<bool>("verbose"), Some(&true));
    }

    #[test]
    fn global_option_help() {
        // Setup
        let (command_line, interface) = build(
            Command::new("app")
                .add(Parameter::option(Switch::new(true), "verbose", Some('v')).global())
                .add(Parameter::option(Switch::new(true), "local", None))
                .command("build", |sub| {
                    sub.about("Build it.")
                        .add(Parameter::option(Scalar::<u8>::new(), "jobs", Some('j')))
                }),
        );

        // Execute
        let root = command_line.invoke_tokens(&["-h"]);
        let root_message = interface.consume_message();
        let sub = command_line.invoke_tokens(&["build", "-h"]);
        let sub_message = interface.consume_message();

        // Verify
        assert_eq!(root, 0);
        assert_contains!(root_message, "usage: app [-h] [-v] [--local] {build} ...");
        assert_contains!(root_message, "Build it.");
        assert_eq!(sub, 0);
        assert_contains!(sub_message, "usage: app build [-h] [-v] [-j JOBS]");
        assert!(!sub_message.contains("--local"));
    }

    #[test]
    fn actions() {
        // Setup
        let root = Arc::new(AtomicUsize::default());
        let build_calls = Arc::new(AtomicUsize::default());
        let root_clone = root.clone();
        let build_clone = build_calls.clone();
        let (command_line, _) = build(
            Command::new("app")
                .action(move |_| {
                    root_clone.fetch_add(1, Ordering::SeqCst);
                    0
                })
                .command("build", |sub| {
                    sub.add(Parameter::argument(Scalar::<i32>::new(), "code"))
                        .async_action(move |result, _| {
                            let calls = build_clone.clone();
                            async move {
                                calls.fetch_add(1, Ordering::SeqCst);
                                *result.get::<i32>("code").unwrap()
                            }
                        })
                })
                .command("test", |sub| sub),
        );

        // Execute & verify
        assert_eq!(command_line.invoke_tokens(&["build", "9"]), 9);
        assert_eq!(command_line.invoke_tokens(&["test"]), 0);
        assert_eq!(command_line.invoke_tokens(&[]), 0);
        assert_eq!(root.load(Ordering::SeqCst), 2);
        assert_eq!(build_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn action_replaced() {
        let (command_line, _) = build(Command::new("app").action(|_| 1).action(|_| 2));
        assert_eq!(command_line.invoke_tokens(&[]), 2);
    }

    #[rstest]
    #[case(
        Command::new("p")
            .add(Parameter::option(Scalar::<u8>::new(), "x", None))
            .add(Parameter::option(Scalar::<u8>::new(), "x", None)),
        "Cannot duplicate the option '--x'."
    )]
    #[case(
        Command::new("p")
            .add(Parameter::option(Scalar::<u8>::new(), "x", Some('a')))
            .add(Parameter::option(Scalar::<u8>::new(), "y", Some('a'))),
        "'-a'"
    )]
    #[case(
        Command::new("p")
            .add(Parameter::option(Scalar::<u8>::new(), "x", None).alias("y"))
            .add(Parameter::option(Scalar::<u8>::new(), "y", None)),
        "'--y'"
    )]
    #[case(
        Command::new("p")
            .add(Parameter::argument(Scalar::<u8>::new(), "x"))
            .add(Parameter::argument(Scalar::<u8>::new(), "x")),
        "'x'"
    )]
    #[case(
        Command::new("p").add(Parameter::option(Switch::new(true), "help", None)),
        "reserved option '--help'"
    )]
    #[case(
        Command::new("p").add(Parameter::option(Switch::new(true), "hide", Some('h'))),
        "reserved option '-h'"
    )]
    #[case(
        Command::new("p")
            .add(Parameter::option(Switch::new(true), "verbose", Some('v')).global())
            .command("sub", |sub| sub.add(Parameter::option(Switch::new(true), "verbose", None))),
        "'--verbose'"
    )]
    #[case(
        Command::new("p").add(Parameter::argument(Scalar::<u8>::new(), "x").nargs(Nargs::Range(3, 1))),
        "invalid nargs"
    )]
    #[case(
        Command::new("p").add(Parameter::option(Scalar::<u8>::new(), "x", None).zero_or_one_arg().required()),
        "cannot be required"
    )]
    #[case(
        Command::new("p").add(Parameter::argument(Scalar::<u8>::new(), "x").alias("y")),
        "cannot have aliases"
    )]
    #[case(
        Command::new("p").command("sub", |sub| sub).command("sub", |sub| sub),
        "duplicate sub-command 'sub'"
    )]
    #[case(
        Command::new("p").command("--sub", |sub| sub),
        "invalid sub-command '--sub'"
    )]
    #[case(
        Command::new("p").command("sub", |sub| {
            sub.add(Parameter::argument(Scalar::<u8>::new(), "-x"))
        }),
        "invalid name"
    )]
    fn config_error(#[case] command: Command, #[case] expected: &str) {
        let message = build_error(command);
        assert_contains!(message, "Config error: ");
        assert_contains!(message, expected);
    }

    #[test]
    fn config_error_first_wins() {
        let message = build_error(
            Command::new("p")
                .command("", |sub| sub)
                .command("--x", |sub| sub),
        );
        assert_contains!(message, "invalid sub-command ''");
    }
}
