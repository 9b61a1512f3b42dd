use std::any::Any;
use std::fmt::Display;
use std::path::Path;

use crate::api::validate::{self, Context, Numeric, Validation};
use crate::api::{CliArgument, CliOption, GenericCapturable};
use crate::matcher::{ArgumentConfig, Bound, MatchTokens, OptionConfig};
use crate::model::Nargs;
use crate::parser::{AnonymousResolvable, ArgumentParameter, ErrorKind, OptionParameter, ParseError};
use crate::prelude::{Choices, Variants};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

type DefaultFactory<T> = Box<dyn Fn(&Context) -> T + Send + Sync>;
type CustomParser<T> = Box<dyn Fn(&[&str]) -> Result<T, String> + Send + Sync>;
type Validator<T> = Box<dyn Fn(&T, &mut Validation) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParameterClass {
    Opt,
    Arg,
}

pub(crate) struct ParameterInner<T> {
    class: ParameterClass,
    field: Box<dyn GenericCapturable<T>>,
    nargs: Nargs,
    name: String,
    short: Option<char>,
    aliases: Vec<String>,
    global: bool,
    required: Option<bool>,
    help: Option<String>,
    choices: Vec<(String, String)>,
    default: Option<DefaultFactory<T>>,
    parser: Option<CustomParser<T>>,
    validators: Vec<Validator<T>>,
}

impl<T> ParameterInner<T> {
    pub(crate) fn class(&self) -> ParameterClass {
        self.class
    }

    /// The name as it appears in messages: `--name` for options, `name` for arguments.
    pub(crate) fn display_name(&self) -> String {
        match self.class {
            ParameterClass::Opt => format!("--{}", self.name),
            ParameterClass::Arg => self.name.clone(),
        }
    }

    pub(crate) fn is_global(&self) -> bool {
        self.global
    }

    pub(crate) fn is_required(&self) -> bool {
        match (self.required, self.class) {
            (Some(required), _) => required,
            (None, ParameterClass::Opt) => false,
            (None, ParameterClass::Arg) => self.nargs.min() >= 1,
        }
    }

    fn bound(&self) -> Bound {
        match Bound::try_from(self.nargs) {
            Ok(bound) => bound,
            Err(error) => {
                unreachable!("internal error - the parameter must be validated: {error}")
            }
        }
    }

    /// Check the configuration invariants of this parameter.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let display_name = self.display_name();

        if let Err(error) = Bound::try_from(self.nargs) {
            return Err(format!("parameter '{display_name}' has invalid nargs: {error}."));
        }

        if self.name.is_empty() || self.name.starts_with('-') {
            return Err(format!("parameter '{display_name}' has an invalid name."));
        }

        if self.is_required() && self.nargs.min() == 0 {
            return Err(format!(
                "parameter '{display_name}' cannot be required while accepting zero values ({nargs}).",
                nargs = self.nargs,
            ));
        }

        if self.class == ParameterClass::Arg && (!self.aliases.is_empty() || self.global) {
            return Err(format!(
                "argument '{display_name}' cannot have aliases or be global."
            ));
        }

        Ok(())
    }
}

impl<T> std::fmt::Debug for ParameterInner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let class = match &self.class {
            ParameterClass::Opt => "Opt",
            ParameterClass::Arg => "Arg",
        };
        let short = match &self.short {
            Some(s) => format!(" -{s},"),
            None => "".to_string(),
        };
        let help = if let Some(d) = &self.help {
            format!(", {d}")
        } else {
            "".to_string()
        };

        write!(
            f,
            "{class}[{t}, {nargs}, {name},{short} {help}]",
            t = std::any::type_name::<T>(),
            nargs = self.nargs,
            name = self.display_name(),
        )
    }
}

impl<T> From<&ParameterInner<T>> for OptionConfig {
    fn from(value: &ParameterInner<T>) -> Self {
        OptionConfig::new(value.name.clone(), value.short, value.bound())
            .with_aliases(value.aliases.clone())
            .with_global(value.global)
    }
}

impl<T> From<&ParameterInner<T>> for OptionParameter {
    fn from(value: &ParameterInner<T>) -> Self {
        OptionParameter::new(
            value.name.clone(),
            value.short,
            value.aliases.clone(),
            value.nargs,
            value.is_required(),
            value.help.clone(),
            value.choices.clone(),
        )
    }
}

impl<T> From<&ParameterInner<T>> for ArgumentConfig {
    fn from(value: &ParameterInner<T>) -> Self {
        ArgumentConfig::new(value.name.clone(), value.bound())
    }
}

impl<T> From<&ParameterInner<T>> for ArgumentParameter {
    fn from(value: &ParameterInner<T>) -> Self {
        ArgumentParameter::new(
            value.name.clone(),
            value.nargs,
            value.help.clone(),
            value.choices.clone(),
        )
    }
}

impl<T: Send + Sync + 'static> AnonymousResolvable for ParameterInner<T> {
    fn resolve(
        &self,
        supplied: Option<&MatchTokens>,
        context: &Context,
        errors: &mut Vec<ParseError>,
    ) -> Option<Box<dyn Any + Send + Sync>> {
        let display_name = self.display_name();
        let position = supplied.map(MatchTokens::first_position);
        let mut value: Option<T> = None;

        // 1. Convert the supplied tokens; failure halts this parameter.
        if let Some(match_tokens) = supplied {
            let raw = match_tokens.raw();
            let captured = match &self.parser {
                // Matched without values, the field decides (ex: `Scalar` treats it as not supplied).
                Some(parser) if !raw.is_empty() => parser(raw.as_slice()).map(Some),
                _ => self
                    .field
                    .capture(&raw)
                    .map_err(|error| format!("Invalid value for '{display_name}': {error}")),
            };

            match captured {
                Ok(captured) => value = captured,
                Err(message) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Failed to parse '{display_name}': {message}");
                    }

                    errors.push(ParseError::new(
                        ErrorKind::Parse,
                        Some(display_name),
                        message,
                        position,
                    ));
                    return None;
                }
            }
        }

        // 2. The default applies only when no value was supplied.
        if value.is_none() {
            if let Some(factory) = &self.default {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Using the default for '{display_name}'.");
                }

                value.replace(factory(context));
            }
        }

        // 3. Required check.
        let value = match value {
            Some(value) => value,
            None => {
                if self.is_required() {
                    let message = match self.class {
                        ParameterClass::Opt => format!("Option '{display_name}' is required."),
                        ParameterClass::Arg => format!("Argument '{display_name}' is required."),
                    };
                    errors.push(ParseError::new(
                        ErrorKind::RequiredMissing,
                        Some(display_name),
                        message,
                        None,
                    ));
                }

                return None;
            }
        };

        // 4. Validators, in registration order; none short-circuit.
        let mut validation = Validation::new(
            display_name.clone(),
            self.is_required(),
            self.class == ParameterClass::Opt,
        );

        for validator in &self.validators {
            validator(&value, &mut validation);
        }

        for message in validation.into_errors() {
            errors.push(ParseError::new(
                ErrorKind::Validation,
                Some(display_name.clone()),
                message,
                position,
            ));
        }

        Some(Box::new(value))
    }
}

/// An argument/option for the command.
/// Used with [`Command::add`](./struct.Command.html#method.add).
///
/// The type `T` is the resolved value of the parameter, as retrieved via [`ParseResult::get`](./struct.ParseResult.html#method.get).
pub struct Parameter<T>(ParameterInner<T>);

impl<T: Send + Sync + 'static> Parameter<T> {
    fn new(
        class: ParameterClass,
        field: impl GenericCapturable<T> + 'static,
        name: impl Into<String>,
        short: Option<char>,
    ) -> Self {
        let nargs = field.nargs();
        Self(ParameterInner {
            class,
            field: Box::new(field),
            nargs,
            name: name.into(),
            short,
            aliases: Vec::default(),
            global: false,
            required: None,
            help: None,
            choices: Vec::default(),
            default: None,
            parser: None,
            validators: Vec::default(),
        })
    }

    /// Create an option parameter.
    ///
    /// Options are optional unless marked [`Parameter::required`].
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Parameter, Switch};
    ///
    /// Parameter::option(Switch::new(true), "verbose", Some('v'));
    /// ```
    pub fn option(
        field: impl GenericCapturable<T> + CliOption + 'static,
        name: impl Into<String>,
        short: Option<char>,
    ) -> Self {
        Self::new(ParameterClass::Opt, field, name, short)
    }

    /// Create an argument parameter.
    ///
    /// Arguments are required exactly when they demand at least one value, unless configured otherwise.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Parameter, Scalar};
    ///
    /// Parameter::argument(Scalar::<u32>::new(), "count");
    /// ```
    pub fn argument(
        field: impl GenericCapturable<T> + CliArgument + 'static,
        name: impl Into<String>,
    ) -> Self {
        Self::new(ParameterClass::Arg, field, name, None)
    }

    /// Set the number of values this parameter accepts, overriding the field's default.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Nargs, Parameter, Scalar};
    ///
    /// Parameter::option(Scalar::<u32>::new(), "level", None)
    ///     .nargs(Nargs::AtMostOne);
    /// ```
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.0.nargs = nargs;
        self
    }

    /// Accept no values (precisely 0).
    pub fn no_args(self) -> Self {
        self.nargs(Nargs::Precisely(0))
    }

    /// Accept zero or one value.
    pub fn zero_or_one_arg(self) -> Self {
        self.nargs(Nargs::AtMostOne)
    }

    /// Accept any number of values.
    pub fn zero_or_more_args(self) -> Self {
        self.nargs(Nargs::Any)
    }

    /// Accept precisely one value.
    pub fn one_arg(self) -> Self {
        self.nargs(Nargs::Precisely(1))
    }

    /// Accept at least one value.
    pub fn one_or_more_args(self) -> Self {
        self.nargs(Nargs::AtLeastOne)
    }

    /// Mark this parameter as required.
    /// A required parameter must accept at least one value.
    pub fn required(self) -> Self {
        self.required_if(true)
    }

    /// Mark this parameter as optional.
    pub fn optional(self) -> Self {
        self.required_if(false)
    }

    /// Mark this parameter as required (or not).
    pub fn required_if(mut self, required: bool) -> Self {
        self.0.required.replace(required);
        self
    }

    /// Add an alternative long name for this option.
    /// Aliases are a configuration error on arguments.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Parameter, Scalar};
    ///
    /// Parameter::option(Scalar::<String>::new(), "colour", Some('c'))
    ///     .alias("color");
    /// ```
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.0.aliases.push(alias.into());
        self
    }

    /// Make this option visible to every descendant command.
    /// Global is a configuration error on arguments.
    pub fn global(mut self) -> Self {
        self.0.global = true;
        self
    }

    /// Document the help message for this parameter.
    /// If repeated, only the final message will apply to the parameter.
    ///
    /// A help message describes the parameter in full sentence/paragraph format.
    /// We recommend allowing `commandment` to format this field (ex: it is not recommended to use line breaks `'\n'`).
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Parameter, Switch};
    ///
    /// Parameter::option(Switch::new(true), "verbose", None)
    ///     .help("--this will get discarded--")
    ///     .help("Make the program output verbose.  Description may include multiple sentences.");
    /// ```
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.0.help.replace(description.into());
        self
    }

    /// Use this value when the parameter is not supplied.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Command, Parameter, Scalar};
    ///
    /// let command_line = Command::new("program")
    ///     .add(Parameter::option(Scalar::<u32>::new(), "level", None).default_value(3))
    ///     .build();
    /// let result = command_line.parse_tokens(&[]);
    ///
    /// assert_eq!(result.get::<u32>("level"), Some(&3));
    /// ```
    pub fn default_value(self, value: T) -> Self
    where
        T: Clone,
    {
        self.default_factory(move |_| value.clone())
    }

    /// Produce the value lazily when the parameter is not supplied.
    /// The factory runs at most once per parse.
    pub fn default_factory(mut self, factory: impl Fn(&Context) -> T + Send + Sync + 'static) -> Self {
        self.0.default.replace(Box::new(factory));
        self
    }

    /// Convert the raw tokens with a custom parser, in place of the field's conversion.
    /// An `Err` message is reported as a parse error for this parameter.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Command, Parameter, Scalar};
    ///
    /// let command_line = Command::new("program")
    ///     .add(
    ///         Parameter::argument(Scalar::<u32>::new(), "mask")
    ///             .parser(|tokens| {
    ///                 let digits = tokens[0].trim_start_matches("0x");
    ///                 u32::from_str_radix(digits, 16).map_err(|e| format!("'{}' is not hex: {e}", tokens[0]))
    ///             }),
    ///     )
    ///     .build();
    /// let result = command_line.parse_tokens(&["0xff"]);
    ///
    /// assert_eq!(result.get::<u32>("mask"), Some(&255));
    /// ```
    pub fn parser(
        mut self,
        parser: impl Fn(&[&str]) -> Result<T, String> + Send + Sync + 'static,
    ) -> Self {
        self.0.parser.replace(Box::new(parser));
        self
    }

    /// Attach a validator; validators run in the order they are attached.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{Parameter, Scalar};
    ///
    /// Parameter::argument(Scalar::<String>::new(), "name")
    ///     .validator(|value, validation| {
    ///         if value.is_empty() {
    ///             validation.add_error("name cannot be empty");
    ///         }
    ///     });
    /// ```
    pub fn validator(
        mut self,
        validator: impl Fn(&T, &mut Validation) + Send + Sync + 'static,
    ) -> Self {
        self.0.validators.push(Box::new(validator));
        self
    }

    pub(crate) fn consume(self) -> ParameterInner<T> {
        self.0
    }
}

/// Numeric constraints.
///
/// On options these only apply when the option is required; on arguments they always apply.
impl<T: Numeric> Parameter<T> {
    /// Reject zero.
    pub fn non_zero(self) -> Self {
        self.validator(validate::non_zero)
    }

    /// Reject values less than or equal to `operand`.
    pub fn greater_than(self, operand: T) -> Self {
        self.validator(validate::greater_than(operand))
    }

    /// Reject values less than `operand`.
    pub fn greater_than_or_equal_to(self, operand: T) -> Self {
        self.validator(validate::greater_than_or_equal_to(operand))
    }

    /// Reject values greater than or equal to `operand`.
    pub fn less_than(self, operand: T) -> Self {
        self.validator(validate::less_than(operand))
    }

    /// Reject values greater than `operand`.
    pub fn less_than_or_equal_to(self, operand: T) -> Self {
        self.validator(validate::less_than_or_equal_to(operand))
    }
}

impl<T: AsRef<Path> + Send + Sync + 'static> Parameter<T> {
    /// Reject paths that do not name an existing file.
    pub fn valid_file_path(self) -> Self {
        self.validator(validate::file_path)
    }

    /// Reject paths that do not name an existing directory.
    pub fn valid_directory_path(self) -> Self {
        self.validator(validate::directory_path)
    }
}

impl<T: AsRef<str> + Send + Sync + 'static> Parameter<T> {
    /// Reject values that do not name a variant of `E`.
    ///
    /// ### Example
    /// ```
    /// use commandment_builder::{prelude::*, Command, Parameter, Scalar};
    ///
    /// enum Mode {}
    /// impl Variants for Mode {
    ///     const VARIANTS: &'static [&'static str] = &["Fast", "Safe"];
    /// }
    ///
    /// let command_line = Command::new("program")
    ///     .add(Parameter::argument(Scalar::<String>::new(), "mode").valid_enum_variant::<Mode>(true, true))
    ///     .build();
    ///
    /// assert!(command_line.parse_tokens(&["FAST"]).is_success());
    /// assert!(!command_line.parse_tokens(&["slow"]).is_success());
    /// ```
    pub fn valid_enum_variant<E: Variants + 'static>(
        self,
        ignore_case: bool,
        show_variants_on_error: bool,
    ) -> Self {
        self.validator(validate::enum_variant::<E, T>(
            ignore_case,
            show_variants_on_error,
        ))
    }
}

impl<T, V: Display> Choices<V> for Parameter<T> {
    /// Document a choice's help message for this parameter.
    /// If repeated for the same `variant`, only the final message will apply to the parameter.
    /// Repeat using different variants to document multiple choices.
    /// Needn't be exhaustive.
    ///
    /// Notice, the documented or un-documented choices *do not* affect the actual command semantics.
    /// To actually limit the values, use a validator (ex: [`Parameter::valid_enum_variant`]).
    fn choice(mut self, variant: V, description: impl Into<String>) -> Self {
        let variant = variant.to_string();
        let description = description.into();

        match self.0.choices.iter_mut().find(|(v, _)| *v == variant) {
            Some((_, existing)) => *existing = description,
            None => self.0.choices.push((variant, description)),
        }

        self
    }
}
