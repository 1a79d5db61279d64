//! Variant constructors derived from registry entries.
//!
//! A [`Variant`] is what the registry entry "is" at runtime: a constructor
//! with the entry's status and stable code fixed, producing
//! [`TaxonomyError`] values with either the default or an overridden message.
//!
//! Variants are `Copy` handles around a `&'static ErrorDefinition`, so two
//! variants made from the same definition at different times behave
//! identically. Compare errors by stable code, not by variant identity.

use crate::{ErrorDefinition, TaxonomyError};
use std::borrow::Cow;
use std::fmt;

/// Constructor for one registry entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variant {
    definition: &'static ErrorDefinition,
}

/// Derive the variant constructor for `definition`.
///
/// Equivalent to [`Variant::of`].
#[inline]
pub const fn make_variant(definition: &'static ErrorDefinition) -> Variant {
    Variant::of(definition)
}

impl Variant {
    /// Derive the variant constructor for `definition`.
    #[inline]
    pub const fn of(definition: &'static ErrorDefinition) -> Self {
        Self { definition }
    }

    /// Build an error with the definition's default message.
    #[inline]
    pub fn build(self) -> TaxonomyError {
        TaxonomyError::from_definition(self.definition, None)
    }

    /// Build an error with `message` replacing the default.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> TaxonomyError {
        TaxonomyError::from_definition(self.definition, Some(message.into()))
    }

    /// Build with an optional override; `None` keeps the default message.
    #[inline]
    pub fn build_with(self, message: Option<impl Into<Cow<'static, str>>>) -> TaxonomyError {
        TaxonomyError::from_definition(self.definition, message.map(Into::into))
    }

    /// The definition this constructor is bound to.
    #[inline]
    pub const fn definition(self) -> &'static ErrorDefinition {
        self.definition
    }

    /// Stable code of the bound definition.
    #[inline]
    pub const fn stable_code(self) -> &'static str {
        self.definition.code()
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variant").field(&self.definition.kind()).finish()
    }
}
