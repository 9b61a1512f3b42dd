use futures::future::BoxFuture;
use std::collections::HashMap;
use std::env;
use tokio_util::sync::CancellationToken;

use crate::constant::{CANCELLED_EXIT_CODE, PARSE_FAILURE_EXIT_CODE};
use crate::matcher::{match_tokens, CommandConfig};
use crate::parser::base::*;
use crate::parser::interface::UserInterface;
use crate::parser::printer::Printer;
use crate::parser::{ErrorContext, ParseResult};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

pub(crate) type BlockingAction = Box<dyn Fn(&ParseResult) -> i32 + Send + Sync>;
pub(crate) type CancellableAction =
    Box<dyn Fn(ParseResult, CancellationToken) -> BoxFuture<'static, i32> + Send + Sync>;

/// The unit of work bound to a command.
pub(crate) enum Action {
    Blocking(BlockingAction),
    Cancellable(CancellableAction),
}

/// One (built) command in the tree.
pub(crate) struct CommandUnit {
    resolver: Resolver,
    printer: Printer,
    action: Option<Action>,
    sub_commands: HashMap<String, CommandUnit>,
}

impl CommandUnit {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(
            Resolver::empty(),
            Printer::empty(),
            None,
            HashMap::default(),
        )
    }

    pub(crate) fn new(
        resolver: Resolver,
        printer: Printer,
        action: Option<Action>,
        sub_commands: HashMap<String, CommandUnit>,
    ) -> Self {
        Self {
            resolver,
            printer,
            action,
            sub_commands,
        }
    }

    fn config(&self, name: &str) -> CommandConfig {
        let sub_commands = self
            .sub_commands
            .iter()
            .map(|(sub_name, unit)| (sub_name.clone(), unit.config(sub_name)))
            .collect();
        self.resolver.config(name, sub_commands)
    }
}

/// The configured command line.
/// Built via [`Command::build_parser`](crate::Command::build_parser) or [`Command::build`](crate::Command::build).
///
/// A `CommandLine` is immutable, so it may be shared across threads and used for any number of parses.
pub struct CommandLine {
    config: CommandConfig,
    root: CommandUnit,
    user_interface: Box<dyn UserInterface>,
}

#[cfg(test)]
impl std::fmt::Debug for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLine{..}").finish()
    }
}

impl CommandLine {
    pub(crate) fn new(
        program: impl Into<String>,
        root: CommandUnit,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<Self, ConfigError> {
        let config = root.config(&program.into());
        config.validate()?;

        Ok(Self {
            config,
            root,
            user_interface,
        })
    }

    /// The units of each command along the `path`, root first.
    fn units(&self, path: &[String]) -> Vec<&CommandUnit> {
        let mut unit = &self.root;
        let mut units = vec![unit];

        for name in path.iter().skip(1) {
            unit = match unit.sub_commands.get(name) {
                Some(sub_command) => sub_command,
                None => unreachable!("internal error - matched command '{name}' must exist"),
            };
            units.push(unit);
        }

        units
    }

    /// Parse the input tokens, without printing anything or running any action.
    ///
    /// Parsing happens in two phases:
    /// 1. Token matching aligns the tokens to the options, arguments, and sub-commands of the command tree.
    /// 2. Resolution converts, defaults, and validates every parameter of every command along the matched path.
    ///
    /// Every problem found in either phase is collected into the result; neither phase stops at the first problem.
    /// If the help switch (`-h` or `--help`) is encountered, resolution is skipped and no errors are reported.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Command, Parameter, Scalar, Switch};
    ///
    /// let command_line = Command::new("program")
    ///     .add(Parameter::option(Switch::new(true), "verbose", Some('v')))
    ///     .add(Parameter::argument(Scalar::<String>::new(), "name"))
    ///     .build();
    /// let result = command_line.parse_tokens(&["-v", "abc"]);
    ///
    /// assert!(result.is_success());
    /// assert_eq!(result.get::<bool>("verbose"), Some(&true));
    /// assert_eq!(result.get::<String>("name"), Some(&"abc".to_string()));
    /// ```
    pub fn parse_tokens(&self, tokens: &[&str]) -> ParseResult {
        let mut matches = match_tokens(&self.config, tokens);
        let mut values = HashMap::default();
        let mut errors: Vec<ParseError> = Vec::default();

        if !matches.help {
            errors.extend(
                std::mem::take(&mut matches.errors)
                    .into_iter()
                    .map(ParseError::from),
            );

            for (level, unit) in self.units(&matches.path).into_iter().enumerate() {
                unit.resolver
                    .resolve(level, &matches, &mut values, &mut errors);
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Parsed {:?} with {} value(s) and {} error(s).",
                matches.path,
                values.len(),
                errors.len()
            );
        }

        ParseResult::new(matches.path, values, errors, matches.help)
    }

    /// Print the outcome of the parse, when there is no action to run.
    fn report(&self, result: &ParseResult, tokens: &[&str]) -> Option<i32> {
        let units = self.units(result.path());
        let printer = match units.last() {
            Some(unit) => &unit.printer,
            None => unreachable!("internal error - the path always contains the root"),
        };

        if result.help_requested() {
            printer.print_help(&*self.user_interface);
            return Some(0);
        }

        if !result.is_success() {
            for error in result.errors() {
                self.user_interface.print_error(error.clone());

                if let Some(position) = error.position() {
                    self.user_interface
                        .print_error_context(ErrorContext::new(position, tokens));
                }
            }

            printer.print_usage_error(&*self.user_interface);
            return Some(PARSE_FAILURE_EXIT_CODE);
        }

        if self.action(result.path()).is_none() {
            self.user_interface.print_diagnostic(format!(
                "No action for command '{}'.",
                result.path().join(" ")
            ));
            printer.print_usage_error(&*self.user_interface);
            return Some(PARSE_FAILURE_EXIT_CODE);
        }

        None
    }

    /// The action of the deepest command along the `path` which has one.
    fn action(&self, path: &[String]) -> Option<&Action> {
        self.units(path)
            .into_iter()
            .rev()
            .find_map(|unit| unit.action.as_ref())
    }

    /// Parse the input tokens and run the selected action, blocking until it completes.
    ///
    /// The action of the deepest matched command runs; when it has none, the nearest ancestor's action runs instead.
    /// Returns the exit code:
    /// * `0` when help was requested (the help is printed).
    /// * [`PARSE_FAILURE_EXIT_CODE`](crate::PARSE_FAILURE_EXIT_CODE) when the input has problems (each is printed, followed by the usage).
    /// * [`PARSE_FAILURE_EXIT_CODE`](crate::PARSE_FAILURE_EXIT_CODE) when no command along the matched path has an action (the usage is printed).
    /// * Otherwise, the action's own exit code.
    ///
    /// Async actions are run to completion on a fresh current-thread runtime, with a token that is never cancelled.
    /// Do not call this from within an async context; use [`CommandLine::invoke_tokens_async`] instead.
    pub fn invoke_tokens(&self, tokens: &[&str]) -> i32 {
        let result = self.parse_tokens(tokens);

        if let Some(exit_code) = self.report(&result, tokens) {
            return exit_code;
        }

        match self.action(result.path()) {
            Some(Action::Blocking(action)) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Running the blocking action of {:?}.", result.path());
                }

                action(&result)
            }
            Some(Action::Cancellable(action)) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Running the async action of {:?} to completion.", result.path());
                }

                match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime.block_on(action(result, CancellationToken::new())),
                    Err(error) => {
                        self.user_interface
                            .print_diagnostic(format!("Unable to start the async runtime: {error}"));
                        1
                    }
                }
            }
            None => unreachable!("internal error - the action must have been checked"),
        }
    }

    /// Parse the input tokens and run the selected action, cancellably.
    ///
    /// Behaves as [`CommandLine::invoke_tokens`], except:
    /// * When `cancellation` has already fired by the time the action would start, the action is skipped and [`CANCELLED_EXIT_CODE`](crate::CANCELLED_EXIT_CODE) is returned.
    /// * Otherwise, async actions receive `cancellation` and are responsible for observing it.
    ///   The action is never forcibly stopped.
    pub async fn invoke_tokens_async(&self, tokens: &[&str], cancellation: CancellationToken) -> i32 {
        let result = self.parse_tokens(tokens);

        if let Some(exit_code) = self.report(&result, tokens) {
            return exit_code;
        }

        if cancellation.is_cancelled() {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Cancelled before the action of {:?} could start.", result.path());
            }

            return CANCELLED_EXIT_CODE;
        }

        match self.action(result.path()) {
            Some(Action::Blocking(action)) => action(&result),
            Some(Action::Cancellable(action)) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Running the async action of {:?}.", result.path());
                }

                action(result, cancellation).await
            }
            None => unreachable!("internal error - the action must have been checked"),
        }
    }

    /// Run the command line against the Cli [`env::args`], exiting the process with the resulting exit code.
    ///
    /// See [`CommandLine::invoke_tokens`] for the details.
    pub fn invoke(&self) -> ! {
        let command_input: Vec<String> = env::args().skip(1).collect();
        let exit_code = self.invoke_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        );
        std::process::exit(exit_code);
    }

    /// Run the command line against the Cli [`env::args`], returning the resulting exit code.
    ///
    /// An interrupt (Ctrl-C) cancels the token handed to the action.
    /// See [`CommandLine::invoke_tokens_async`] for the details.
    pub async fn invoke_async(&self) -> i32 {
        let command_input: Vec<String> = env::args().skip(1).collect();
        let cancellation = CancellationToken::new();
        let interrupt = tokio::spawn({
            let cancellation = cancellation.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Interrupted, cancelling.");
                    }

                    cancellation.cancel();
                }
            }
        });
        let exit_code = self
            .invoke_tokens_async(
                command_input
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<&str>>()
                    .as_slice(),
                cancellation,
            )
            .await;
        interrupt.abort();
        exit_code
    }
}
