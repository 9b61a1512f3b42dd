use thiserror::Error;

use crate::model::Nargs;

/// Marker trait for capturable types that can formulate an option in the Cli
pub trait CliOption {}

/// Marker trait for capturable types that can formulate an argument in the Cli.
pub trait CliArgument {}

/// Behaviour to capture an explicit generic type T from the input tokens matched to a parameter.
///
/// We use this at the bottom of the command object graph so the compiler can maintain each field's type.
#[doc(hidden)]
pub trait GenericCapturable<T>: Send + Sync {
    /// Capture the matched tokens into the generic type T for this parameter.
    ///
    /// `Ok(None)` means the parameter was matched without producing a value.
    fn capture(&self, tokens: &[&str]) -> Result<Option<T>, InvalidCapture>;

    /// Get the `Nargs` for this implementation.
    fn nargs(&self) -> Nargs;
}

#[derive(Debug, Error, PartialEq, Eq)]
#[doc(hidden)]
pub enum InvalidCapture {
    #[error("cannot convert '{token}' to {type_name}.")]
    InvalidConversion {
        token: String,
        type_name: &'static str,
    },
}
