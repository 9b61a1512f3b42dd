mod base;
mod interface;
mod middleware;
mod printer;
mod result;

pub use self::base::*;
pub(crate) use self::interface::*;
pub use self::middleware::*;
pub(crate) use self::printer::*;
pub use self::result::*;
