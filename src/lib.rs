//! `commandment` is a typed command line parser for Rust.
//!
//! Although other crates provide command line parser functionality, we have found they prioritize different concerns than those we are interested in.
//! `commandment` attempts to prioritize the following design concerns:
//! * *Type safe argument parsing*:
//! The user should not call any `&str -> T` conversion functions directly.
//! Values are retrieved, already converted, from the [`ParseResult`].
//! * *Domain sensitive argument parsing*:
//! The user should not validate/reject any domain invalid inputs (see footnotes #1 for examples).
//! Instead, the parameters are configured with validators which reject these.
//! * *Every problem at once*:
//! A parse never stops at the first problem.
//! All problems with an invocation are collected and reported together.
//! * *Argument vs. option paradigm*:
//! Arguments are parameters specified positionally on the Cli.
//! Options are parameters specified via `--..` or `-..` syntax.
//! * *Command tree paradigm*:
//! The user may configure sub-commands (to any depth) which act to collect multiple related programs into a single Cli.
//! * *Cancellable actions*:
//! A command may bind an async action which receives a [`CancellationToken`], so that Ctrl-C is observed cooperatively.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/summer.rs")]
//! ```
//!
//! ```console
//! $ summer -h
//! usage: summer [-h] ITEM [...]
//!
//! positional arguments:
//!  ITEM [...]   The items to sum.
//!
//! options:
//!  -h, --help   Show this help message and exit.
//!
//! $ summer 1 2 3
//! Sum: 6
//!
//! $ summer
//! Parse error: Argument 'item' is required.
//! usage: summer [-h] ITEM [...]
//!
//! $ summer 1 blah
//! Parse error: Invalid value for 'item': cannot convert 'blah' to u32.
//! 1 blah
//! ^
//! usage: summer [-h] ITEM [...]
//! ```
//!
//! # Builder Api
//! Configure `commandment` by starting with a [`Command`] and `add`ing parameters.
//! There are two classes of parameters: [`Parameter::argument`] and [`Parameter::option`].
//!
//! Each parameter takes a *field* which serves to specify the following aspects on the Cli:
//! * The underlying type `T` of the parameter (ex: `u32`).
//! * Whether `T` is wrapped in a container type `C` (ex: `Vec<T>`).
//! * The cardinality of the parameter (ex: 0, 1, N, at least 1, etc).
//!
//! All type `T` conversion in `commandment` is controlled by [`std::str::FromStr`], unless a custom [`Parameter::parser`] is attached.
//!
//! The other aspects of parameter configuration relate to additional Cli usage and optics:
//! * Parameter naming, including the short name and [aliases](./struct.Parameter.html#method.alias) of a `Parameter::option`.
//! * Whether the parameter is [required](./struct.Parameter.html#method.required).
//! * The [default](./struct.Parameter.html#method.default_factory) used when the parameter is not supplied.
//! * Description of the parameter (and its [choices](./prelude/trait.Choices.html)) when displaying `--help`.
//!
//! ### Fields
//! * [`Scalar`]: defines a single-value `Parameter` (applies to both `Parameter::argument` & `Parameter::option`).
//! This is the most common field to use in your Cli.
//! * [`Collection`]: defines a multi-value `Parameter` (applies to both `Parameter::argument` & `Parameter::option`).
//! This field allows you to configure the cardinality (aka: [`Nargs`]) for any collection that implements [Collectable](./prelude/trait.Collectable.html).
//! `commandment` provides this `Collectable` implementations for `Vec<T>` and `HashSet<T>`.
//! * [`Switch`]: defines a no-value `Parameter::option` (not applicable to `Parameter::argument`).
//! This is used when specifying Cli *flags* (ex: `--verbose`).
//! Note that `Switch` may apply to any type `T` (not restricted to just `bool`).
//!
//! ### Validators
//! Validators run after conversion, in the order they are attached.
//! Each may report any number of problems, and none stops the others.
//! * Numeric: [`Parameter::non_zero`], [`Parameter::greater_than`], [`Parameter::less_than`] (and their `_or_equal_to` forms).
//! On options, these apply only when the option is required.
//! * Paths: [`Parameter::valid_file_path`] and [`Parameter::valid_directory_path`].
//! * Enums: [`Parameter::valid_enum_variant`], for any type implementing [Variants](./prelude/trait.Variants.html).
//! * Custom: [`Parameter::validator`].
//!
//! ### Sub-commands
//! Sub-commands are configured via [`Command::command`], which takes the name of the sub-command and a `impl FnOnce(Command) -> Command` to setup its parameters, actions and (nested) sub-commands.
//! Options marked [`Parameter::global`] are visible to every descendant command.
//!
//! The following demonstrates how to organize the values of a sub-command Cli into a single type, and unit test the configuration.
//!
//! ```no_run
#![doc = include_str!("../demos/organization.rs")]
//! ```
//!
//! ### Actions & Exit Codes
//! A command binds either a blocking [action](./struct.Command.html#method.action) or a cancellable [async action](./struct.Command.html#method.async_action).
//! When the deepest matched command has no action, the nearest ancestor's action runs instead.
//! Invoking the [`CommandLine`] exits with:
//! * `0` when help is requested.
//! * [`PARSE_FAILURE_EXIT_CODE`] (2) when the parse fails, or no command along the path has an action.
//! * [`CANCELLED_EXIT_CODE`] (130) when the invocation is cancelled before the action runs.
//! * Otherwise, whatever the action returns.
//!
//! ```no_run
#![doc = include_str!("../demos/fetcher.rs")]
//! ```
//!
//! # Cli Semantics
//! `commandment` matches the Cli tokens according to the following set of rules.
//!
//! * Each parameter matches a number of tokens based off its cardinality.
//! * Arguments are matched based off positional ordering.
//! Once the expected cardinality is matched, then the parser naturally switches to the next argument.
//! For example, `a b c` will match `a b` into a cardinality=2 argument, and `c` into the next argument.
//! * Options are matched based off the `--NAME` (or short name `-N`) specifier.
//! Once specified, the cardinality is matched against the subsequent tokens.
//! * Explicit option tokens always take precedence over positional matching.
//! * An option between positional values does not end the current argument.
//! For example, `a -v b` matches both `a` and `b` into a `+` argument.
//! * Repeating an option accumulates its values; exceeding the cardinality in total is an error.
//! * A token naming a sub-command descends into that sub-command, unless an option still requires values.
//! * The key-value pair of an option may be separated with the `=` character.
//! Subsequent tokens always rollover to the next parameter.
//! For example, `--key=123` is equivalent to `--key 123`.
//! * Multiple short named options may be combined into a single flag.
//! For example, `-abc` is equivalent to `--apple --banana --carrot`.
//! The final option in this syntax may take the remainder as its value: `-abn5` is equivalent to `-ab -n 5`.
//! * Negative numbers (ex: `-5`) are values, unless the digit is a short option name.
//! * Every token after `--` is a value.
//! * `-h`/`--help` anywhere prints the help of the deepest matched command.
//!
//! ### Field-Narg Interaction
//! ```console
//! Parameter         | Narg | Cardinality | Syntax           | Description
//! -----------------------------------------------------------------------------------------------
//! Scalar<T>         |      | [1]         | VALUE            | precisely 1
//! Collection<C<T>>  | n    | [n]         | VALUE .. VALUE   | precisely n
//! Collection<C<T>>  | *    | [0, ∞)      | [VALUE ...]      | any amount; captured greedily
//! Collection<C<T>>  | +    | [1, ∞)      | VALUE [...]      | at least 1; captured greedily
//! Switch<T>         |      | [0]         | [--NAME]         | precisely 0 (options only)
//! ```
//!
//! # Footnotes
//! 1. Examples of domain sensitive argument parsing:
//!     * A numeric parameter that must be positive: `worker-program --threads 0`
//!     * A path parameter that must name an existing file: `check-program missing.txt`
//!
//! # Features
//! * `tracing_debug`: Emit `tracing` debug events while configuring and parsing.
pub use commandment_builder::*;
