//! Declarative macros for defining the taxonomy and raising its errors.
//!
//! # Defining entries
//!
//! [`define_error_definitions!`] turns a grouped table into one `const`
//! [`ErrorDefinition`](crate::ErrorDefinition) per row plus an enumerable
//! `ALL` slice in declaration order. The row identifier is both the registry
//! key and the stable code; the second identifier is the kind name.
//!
//! ```rust
//! mod billing {
//!     taxon_errors::define_error_definitions! {
//!         taxon_errors::ErrorGroup::Application => {
//!             PAYMENT_REQUIRED => PaymentRequiredError = (402, "Payment required"),
//!             CARD_DECLINED    => CardDeclinedError    = (402, "Card declined"),
//!         }
//!     }
//! }
//!
//! assert_eq!(billing::ALL.len(), 2);
//! assert_eq!(billing::CARD_DECLINED.code(), "CARD_DECLINED");
//! assert_eq!(billing::CARD_DECLINED.kind(), "CardDeclinedError");
//! ```
//!
//! Adding an error kind means adding one row. Nothing else changes.
//!
//! # Raising errors
//!
//! [`taxonomy_err!`] builds a [`TaxonomyError`](crate::TaxonomyError) from a
//! definition, optionally overriding the message with a format string:
//!
//! ```rust
//! use taxon_errors::{definitions, taxonomy_err};
//!
//! let user_id = 42;
//! let err = taxonomy_err!(definitions::RECORD_NOT_FOUND, "User {} not found", user_id);
//! assert_eq!(err.message(), "User 42 not found");
//! assert_eq!(err.stable_code(), Some("RECORD_NOT_FOUND"));
//!
//! let plain = taxonomy_err!(definitions::FORBIDDEN);
//! assert_eq!(plain.message(), "Forbidden");
//! ```

/// Build a [`TaxonomyError`](crate::TaxonomyError) from a registry definition.
///
/// - `taxonomy_err!(DEF)`: default message
/// - `taxonomy_err!(DEF, "fmt", args...)`: message override via `format!`
#[macro_export]
macro_rules! taxonomy_err {
    ($definition:expr) => {
        $crate::Variant::of(&$definition).build()
    };
    ($definition:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::Variant::of(&$definition).with_message(format!($fmt $(, $arg)*))
    };
}

/// Define a batch of registry entries grouped by [`ErrorGroup`](crate::ErrorGroup).
///
/// Emits one `pub const` per row and a `pub const ALL` slice covering every
/// row of every group.
#[macro_export]
macro_rules! define_error_definitions {
    (
        $(
            $group:expr => {
                $( $name:ident => $kind:ident = ($status:literal, $message:literal) ),+ $(,)?
            }
        ),+ $(,)?
    ) => {
        $(
            $(
                #[doc = $message]
                pub const $name: $crate::ErrorDefinition = $crate::ErrorDefinition::const_new(
                    stringify!($name),
                    stringify!($kind),
                    $crate::HttpStatus::new($status),
                    $message,
                    stringify!($name),
                    $group,
                );
            )+
        )+

        /// Every definition in this table, in declaration order.
        pub const ALL: &[&$crate::ErrorDefinition] = &[ $( $( &$name ),+ ),+ ];
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::{ErrorGroup, definitions};

    mod inventory {
        crate::define_error_definitions! {
            crate::ErrorGroup::Storage => {
                OUT_OF_STOCK => OutOfStockError = (409, "Out of stock"),
            },
            crate::ErrorGroup::ExternalService => {
                SUPPLIER_DOWN => SupplierDownError = (502, "Supplier unavailable"),
                SUPPLIER_SLOW => SupplierSlowError = (504, "Supplier timed out"),
            }
        }
    }

    #[test]
    fn macro_batch_definition() {
        assert_eq!(inventory::ALL.len(), 3);
        assert_eq!(inventory::OUT_OF_STOCK.key(), "OUT_OF_STOCK");
        assert_eq!(inventory::OUT_OF_STOCK.code(), "OUT_OF_STOCK");
        assert_eq!(inventory::OUT_OF_STOCK.group(), ErrorGroup::Storage);
        assert_eq!(inventory::SUPPLIER_SLOW.status().value(), 504);
        assert_eq!(inventory::SUPPLIER_SLOW.group(), ErrorGroup::ExternalService);
    }

    #[test]
    fn macro_preserves_declaration_order() {
        let codes: Vec<_> = inventory::ALL.iter().map(|d| d.code()).collect();
        assert_eq!(codes, ["OUT_OF_STOCK", "SUPPLIER_DOWN", "SUPPLIER_SLOW"]);
    }

    #[test]
    fn taxonomy_err_default_message() {
        let err = taxonomy_err!(definitions::GONE);
        assert_eq!(err.message(), "Resource gone");
        assert_eq!(err.status().value(), 410);
    }

    #[test]
    fn taxonomy_err_formats_override() {
        let field = "email";
        let err = taxonomy_err!(definitions::FIELD_REQUIRED, "{} is required", field);
        assert_eq!(err.message(), "email is required");
        assert_eq!(err.stable_code(), Some("FIELD_REQUIRED"));
        assert_eq!(err.status().value(), 400);
    }
}
