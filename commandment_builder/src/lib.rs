//! Builder module for `commandment`.
//! See [documentation root](https://docs.rs/commandment/latest/commandment/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod constant;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;

pub use api::*;
pub use constant::{CANCELLED_EXIT_CODE, PARSE_FAILURE_EXIT_CODE};
pub use model::*;
pub use parser::{CommandLine, ConfigError, ErrorKind, ParseError, ParseResult};

/// Re-exported so that async actions can be written without a direct `tokio-util` dependency.
pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
