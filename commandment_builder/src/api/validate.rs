use std::fmt::Display;
use std::path::Path;

use crate::prelude::Variants;

/// Behaviour of an orderable number with a zero value.
///
/// Implemented for every primitive integer and float, and required by the numeric constraints of [`Parameter`](crate::Parameter).
pub trait Numeric: Copy + PartialOrd + Display + Send + Sync + 'static {
    /// The zero value of this type.
    const ZERO: Self;
}

macro_rules! impl_numeric {
    ($zero:expr => $($t:ty),*) => {
        $(
            impl Numeric for $t {
                const ZERO: Self = $zero;
            }
        )*
    };
}

impl_numeric!(0 => u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
impl_numeric!(0.0 => f32, f64);

/// The context handed to each validator of a parameter.
///
/// Validators report problems via [`Validation::add_error`]; every message becomes its own error in the [`ParseResult`](crate::ParseResult).
#[derive(Debug)]
pub struct Validation {
    name: String,
    required: bool,
    option: bool,
    errors: Vec<String>,
}

impl Validation {
    pub(crate) fn new(name: impl Into<String>, required: bool, option: bool) -> Self {
        Self {
            name: name.into(),
            required,
            option,
            errors: Vec::default(),
        }
    }

    /// The display name of the parameter under validation (ex: `--count` for an option, `count` for an argument).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the parameter under validation is required.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the parameter under validation is an option (as opposed to an argument).
    pub fn is_option(&self) -> bool {
        self.option
    }

    /// Report a validation failure.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub(crate) fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// The context handed to a default factory.
#[derive(Debug, Clone, Copy)]
pub struct Context<'r> {
    name: &'r str,
    path: &'r [String],
}

impl<'r> Context<'r> {
    pub(crate) fn new(name: &'r str, path: &'r [String]) -> Self {
        Self { name, path }
    }

    /// The display name of the parameter being defaulted.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The names of the matched commands, root first.
    pub fn path(&self) -> &[String] {
        self.path
    }

    /// The name of the command the parameter belongs to.
    pub fn command(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

/// Whether a numeric constraint applies: options only when required, arguments always.
fn numeric_gate(validation: &Validation) -> bool {
    !validation.is_option() || validation.is_required()
}

pub(crate) fn non_zero<T: Numeric>(value: &T, validation: &mut Validation) {
    if numeric_gate(validation) && *value == T::ZERO {
        let message = format!("{} cannot be zero", validation.name());
        validation.add_error(message);
    }
}

pub(crate) fn greater_than<T: Numeric>(operand: T) -> impl Fn(&T, &mut Validation) {
    move |value, validation| {
        if numeric_gate(validation) && *value <= operand {
            let message = format!(
                "{} cannot be less than or equal to {operand}",
                validation.name()
            );
            validation.add_error(message);
        }
    }
}

pub(crate) fn greater_than_or_equal_to<T: Numeric>(operand: T) -> impl Fn(&T, &mut Validation) {
    move |value, validation| {
        if numeric_gate(validation) && *value < operand {
            let message = format!("{} cannot be less than {operand}", validation.name());
            validation.add_error(message);
        }
    }
}

pub(crate) fn less_than<T: Numeric>(operand: T) -> impl Fn(&T, &mut Validation) {
    move |value, validation| {
        if numeric_gate(validation) && *value >= operand {
            let message = format!(
                "{} cannot be greater than or equal to {operand}",
                validation.name()
            );
            validation.add_error(message);
        }
    }
}

pub(crate) fn less_than_or_equal_to<T: Numeric>(operand: T) -> impl Fn(&T, &mut Validation) {
    move |value, validation| {
        if numeric_gate(validation) && *value > operand {
            let message = format!("{} cannot be greater than {operand}", validation.name());
            validation.add_error(message);
        }
    }
}

pub(crate) fn file_path<T: AsRef<Path>>(value: &T, validation: &mut Validation) {
    let path = value.as_ref();

    if !path.is_file() {
        validation.add_error(format!("Path '{}' doesn't exist", path.display()));
    }
}

pub(crate) fn directory_path<T: AsRef<Path>>(value: &T, validation: &mut Validation) {
    let path = value.as_ref();

    if !path.is_dir() {
        validation.add_error(format!("Path '{}' doesn't exist", path.display()));
    }
}

pub(crate) fn enum_variant<E: Variants + 'static, T: AsRef<str>>(
    ignore_case: bool,
    show_variants_on_error: bool,
) -> impl Fn(&T, &mut Validation) {
    move |value, validation| {
        let value = value.as_ref();
        let found = E::VARIANTS.iter().any(|variant| {
            if ignore_case {
                variant.eq_ignore_ascii_case(value)
            } else {
                *variant == value
            }
        });

        if found {
            return;
        }

        let class = if validation.is_option() {
            "option"
        } else {
            "argument"
        };
        let mut message = format!(
            "'{value}' is not a valid value for {class} '{name}'",
            name = validation.name()
        );

        if show_variants_on_error {
            let variants: Vec<String> = E::VARIANTS
                .iter()
                .map(|variant| {
                    if ignore_case {
                        variant.to_lowercase()
                    } else {
                        variant.to_string()
                    }
                })
                .collect();
            message.push_str(&format!(
                "\n\tValid {class}s are: [{}]",
                variants.join(", ")
            ));
        }

        validation.add_error(message);
    }
}
