mod capture;
mod core;
mod field;
mod parameter;
mod validate;

pub use self::capture::*;
pub use self::core::*;
pub use self::field::*;
pub use self::parameter::Parameter;
pub(crate) use self::parameter::ParameterClass;
pub use self::validate::{Context, Numeric, Validation};
