use std::collections::HashSet;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::api::capture::*;
use crate::model::Nargs;
use crate::prelude::Collectable;

fn convert<T: FromStr>(token: &str) -> Result<T, InvalidCapture> {
    T::from_str(token).map_err(|_| InvalidCapture::InvalidConversion {
        token: token.to_string(),
        type_name: std::any::type_name::<T>(),
    })
}

/// A parameter that takes a single value (default precisely 1).
///
/// When the arity is widened with [`Parameter::nargs`](crate::Parameter::nargs) and more than one value is matched, the last one wins.
pub struct Scalar<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> CliOption for Scalar<T> {}
impl<T> CliArgument for Scalar<T> {}

impl<T> Scalar<T> {
    /// Create a scalar parameter.
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for Scalar<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GenericCapturable<T> for Scalar<T>
where
    T: FromStr,
{
    fn capture(&self, tokens: &[&str]) -> Result<Option<T>, InvalidCapture> {
        let mut value = None;

        for token in tokens {
            value.replace(convert(token)?);
        }

        Ok(value)
    }

    fn nargs(&self) -> Nargs {
        Nargs::Precisely(1)
    }
}

/// A parameter that takes no values (default precisely 0), producing its target when matched.
pub struct Switch<T> {
    target: T,
}

impl<T> CliOption for Switch<T> {}

impl<T> Switch<T> {
    /// Create a switch parameter.
    pub fn new(target: T) -> Self {
        Self { target }
    }
}

impl<T> GenericCapturable<T> for Switch<T>
where
    T: FromStr + Clone + Send + Sync,
{
    fn capture(&self, tokens: &[&str]) -> Result<Option<T>, InvalidCapture> {
        match tokens.last() {
            Some(token) => convert(token).map(Some),
            None => Ok(Some(self.target.clone())),
        }
    }

    fn nargs(&self) -> Nargs {
        Nargs::Precisely(0)
    }
}

/// A parameter that takes multiple values (specifiable [`Nargs`]).
pub struct Collection<C, T> {
    nargs: Nargs,
    _phantom: PhantomData<fn() -> (C, T)>,
}

impl<C, T> CliOption for Collection<C, T> where C: Collectable<T> {}

impl<C, T> CliArgument for Collection<C, T> where C: Collectable<T> {}

impl<C, T> Collection<C, T>
where
    C: Collectable<T>,
{
    /// Create a collection parameter.
    pub fn new(nargs: Nargs) -> Self {
        Self {
            nargs,
            _phantom: PhantomData,
        }
    }
}

impl<C, T> GenericCapturable<C> for Collection<C, T>
where
    T: FromStr,
    C: Collectable<T> + Default,
{
    fn capture(&self, tokens: &[&str]) -> Result<Option<C>, InvalidCapture> {
        let mut collection = C::default();

        for token in tokens {
            collection.add(convert(token)?);
        }

        Ok(Some(collection))
    }

    fn nargs(&self) -> Nargs {
        self.nargs
    }
}

impl<T> Collectable<T> for Vec<T> {
    fn add(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: Eq + std::hash::Hash> Collectable<T> for HashSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }
}
