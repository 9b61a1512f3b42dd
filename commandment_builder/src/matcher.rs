mod api;
mod core;
mod model;
mod tokenizer;

pub(crate) use self::api::*;
pub(crate) use self::core::*;
pub(crate) use self::model::*;
