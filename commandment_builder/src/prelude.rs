//! Traits which, typically, may be imported without concern: `use commandment::prelude::*`.

/// Behaviour for multiple (0 to many) items T to be collected together.
// Needs to be imported in order to implement a custom `Collectable`.
pub trait Collectable<T> {
    /// Add a value to this `Collectable`.
    fn add(&mut self, item: T);
}

/// Behaviour for documenting choices on a `Parameter`.
// Needs to be imported in order to document choices.
pub trait Choices<T> {
    fn choice(self, variant: T, description: impl Into<String>) -> Self;
}

/// An enumerable set of named constants.
///
/// Used by [`Parameter::valid_enum_variant`](crate::Parameter::valid_enum_variant) to list (and match against) the variant names.
pub trait Variants {
    /// The names of every variant, in declaration order.
    const VARIANTS: &'static [&'static str];
}
