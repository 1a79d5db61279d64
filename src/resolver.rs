//! Stable code resolution.
//!
//! The [`Resolver`] is an explicit map from stable code to [`Variant`], built
//! directly from a definition slice. It is used to rehydrate a precisely-typed
//! error when only a code is known (for example, a code supplied by calling
//! code or relayed from another service).
//!
//! The process-wide instance over the built-in registry is built once on first
//! use and is read-only afterwards, so it is safe to share across threads
//! without synchronization beyond the one-time initialisation.

use crate::codes::RegistryError;
use crate::{ErrorDefinition, HttpStatus, TaxonomyError, Variant, definitions};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Reverse index from stable code to variant constructor.
#[derive(Debug, Clone)]
pub struct Resolver {
    variants: HashMap<&'static str, Variant>,
}

impl Resolver {
    /// Build over a definition set, rejecting duplicate keys or codes.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate found, in slice order.
    pub fn try_from_definitions(
        definitions: &[&'static ErrorDefinition],
    ) -> Result<Self, RegistryError> {
        let mut variants = HashMap::with_capacity(definitions.len());
        let mut keys = HashSet::with_capacity(definitions.len());

        for &definition in definitions {
            if !keys.insert(definition.key()) {
                return Err(RegistryError::DuplicateKey {
                    key: definition.key(),
                });
            }
            if variants
                .insert(definition.code(), Variant::of(definition))
                .is_some()
            {
                return Err(RegistryError::DuplicateCode {
                    code: definition.code(),
                });
            }
        }

        Ok(Self { variants })
    }

    /// Build over the built-in registry.
    ///
    /// The registry's uniqueness is a const assertion in `definitions`, so no
    /// duplicate can reach this point.
    pub fn builtin() -> Self {
        let variants = definitions::ALL
            .iter()
            .map(|&definition| (definition.code(), Variant::of(definition)))
            .collect();
        Self { variants }
    }

    /// Look up the variant for `stable_code`.
    #[inline]
    pub fn resolve(&self, stable_code: &str) -> Option<Variant> {
        self.variants.get(stable_code).copied()
    }

    /// Number of codes indexed.
    /// Number of registered codes.
    #[inline]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether no code is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Build an error from a status/message/code triple.
    ///
    /// A known code yields its registry variant with `message` as override
    /// (the caller's status is ignored in favour of the definition's). Unknown
    /// or absent codes fall back to the generic HTTP variant with `status`;
    /// statuses outside 100-599 become 500.
    pub fn rehydrate(
        &self,
        status: u16,
        message: impl Into<Cow<'static, str>>,
        code: Option<&str>,
    ) -> TaxonomyError {
        match code.and_then(|c| self.resolve(c)) {
            Some(variant) => variant.with_message(message),
            None => TaxonomyError::http(
                HttpStatus::checked_new(status).unwrap_or(HttpStatus::INTERNAL_SERVER_ERROR),
                message,
            ),
        }
    }
}

/// The process-wide resolver over the built-in registry.
pub fn resolver() -> &'static Resolver {
    static RESOLVER: OnceLock<Resolver> = OnceLock::new();
    RESOLVER.get_or_init(Resolver::builtin)
}

/// Shorthand for `resolver().resolve(stable_code)`.
#[inline]
pub fn resolve(stable_code: &str) -> Option<Variant> {
    resolver().resolve(stable_code)
}

impl TaxonomyError {
    /// Build an error from a status, message, and optional stable code using
    /// the built-in registry. See [`Resolver::rehydrate`].
    ///
    /// ```rust
    /// use taxon_errors::TaxonomyError;
    ///
    /// let typed = TaxonomyError::from_code(400, "Missing SKU", Some("FIELD_REQUIRED"));
    /// assert_eq!(typed.kind(), "FieldRequiredError");
    ///
    /// let generic = TaxonomyError::from_code(418, "Teapot", Some("NOT_A_CODE"));
    /// assert_eq!(generic.kind(), "HttpError");
    /// assert_eq!(generic.stable_code(), None);
    /// ```
    pub fn from_code(
        status: u16,
        message: impl Into<Cow<'static, str>>,
        code: Option<&str>,
    ) -> Self {
        resolver().rehydrate(status, message, code)
    }
}
