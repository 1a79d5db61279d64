//! Error definition identity: HTTP status, groups, and the definition record.
//!
//! Every error kind the taxonomy knows about is an [`ErrorDefinition`]: a
//! symbolic key, the HTTP status it maps to, a default client message, and a
//! stable machine-readable code. Definitions are `const` data, created once
//! through [`define_error_definitions!`](crate::define_error_definitions) and
//! never mutated.
//!
//! # Governance
//!
//! - Status codes are validated at construction (100-599). In const contexts
//!   an invalid status is a compile error.
//! - Stable codes are unique across the registry. The built-in registry checks
//!   this with a const assertion (see `definitions`), so a duplicate fails the
//!   build rather than surfacing at runtime.
//! - A stable code is a contract with clients: it is never reused for a
//!   different meaning.
//!
//! # Example
//!
//! ```rust
//! use taxon_errors::{ErrorDefinition, ErrorGroup, HttpStatus};
//!
//! const PAYMENT_REQUIRED: ErrorDefinition = ErrorDefinition::const_new(
//!     "PAYMENT_REQUIRED",
//!     "PaymentRequiredError",
//!     HttpStatus::new(402),
//!     "Payment required",
//!     "PAYMENT_REQUIRED",
//!     ErrorGroup::Application,
//! );
//!
//! assert_eq!(PAYMENT_REQUIRED.status().value(), 402);
//! assert_eq!(PAYMENT_REQUIRED.to_string(), "PAYMENT_REQUIRED (402)");
//! ```

use std::fmt;

// ============================================================================
// HTTP Status (Validated)
// ============================================================================

/// Validated HTTP status code (100-599).
///
/// `Copy` because it is a plain `u16` and gets passed around by value through
/// every classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HttpStatus(u16);

impl HttpStatus {
    /// 500, the status every unclassified failure falls back to.
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Create a status with compile-time validation.
    ///
    /// # Panics
    ///
    /// Panics at compile time (in const contexts) if `code` is outside 100-599.
    /// Panics at runtime (in non-const contexts) if `code` is outside 100-599.
    #[inline]
    pub const fn new(code: u16) -> Self {
        assert!(code >= 100 && code <= 599, "HTTP status must be 100-599");
        Self(code)
    }

    /// Create a status with runtime validation.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `code` is outside 100-599.
    #[inline]
    pub const fn checked_new(code: u16) -> Result<Self, StatusError> {
        if code >= 100 && code <= 599 {
            Ok(Self(code))
        } else {
            Err(StatusError::OutOfRange { value: code })
        }
    }

    /// Validate a status taken from an untyped source, falling back to 500.
    #[inline]
    pub fn or_internal(code: Option<i64>) -> Self {
        code.and_then(|c| u16::try_from(c).ok())
            .and_then(|c| Self::checked_new(c).ok())
            .unwrap_or(Self::INTERNAL_SERVER_ERROR)
    }

    /// Get the raw numeric value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// `true` below 400. This is what the envelope `status` flag reports.
    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 < 400
    }

    /// 400-499.
    #[inline]
    pub const fn is_client_error(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// 500-599.
    #[inline]
    pub const fn is_server_error(self) -> bool {
        self.0 >= 500
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for HttpStatus {
    type Error = StatusError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::checked_new(value)
    }
}

/// Error type for status validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    /// Status is outside 100-599.
    #[error("HTTP status {value} is out of range (must be 100-599)")]
    OutOfRange {
        /// The rejected status.
        value: u16,
    },
}

// ============================================================================
// Error Group (Documentation Partition)
// ============================================================================

/// Conventional grouping of registry entries.
///
/// Groups document intent only. Nothing in classification or resolution
/// branches on them, and a definition may use any status regardless of group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorGroup {
    /// 4xx caused by the request itself.
    Client,
    /// 5xx caused by the server.
    Server,
    /// Authentication and authorization.
    Auth,
    /// Input validation.
    Validation,
    /// Database and storage.
    Storage,
    /// File handling.
    File,
    /// Calls to other services.
    ExternalService,
    /// Throttling.
    RateLimit,
    /// Application-specific conditions, including the catch-all unknown error.
    Application,
}

impl ErrorGroup {
    /// Human-readable group name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Server => "Server",
            Self::Auth => "Authentication & Authorization",
            Self::Validation => "Validation",
            Self::Storage => "Storage",
            Self::File => "File",
            Self::ExternalService => "External Service",
            Self::RateLimit => "Rate Limiting",
            Self::Application => "Application",
        }
    }
}

// ============================================================================
// Error Definition (Primary Identity Type)
// ============================================================================

/// One entry of the taxonomy.
///
/// Not `Clone`: definitions live as `const`/`static` items and are passed by
/// `&'static` reference. Two definitions are the same kind iff their stable
/// codes are equal.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ErrorDefinition {
    key: &'static str,
    kind: &'static str,
    status: HttpStatus,
    message: &'static str,
    code: &'static str,
    group: ErrorGroup,
}

impl ErrorDefinition {
    /// Create a definition with compile-time validation.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in const contexts) if the key, kind name, or
    /// stable code is empty.
    #[inline]
    pub const fn const_new(
        key: &'static str,
        kind: &'static str,
        status: HttpStatus,
        message: &'static str,
        code: &'static str,
        group: ErrorGroup,
    ) -> Self {
        assert!(!key.is_empty(), "Definition key must not be empty");
        assert!(!kind.is_empty(), "Definition kind name must not be empty");
        assert!(!code.is_empty(), "Stable code must not be empty");

        Self {
            key,
            kind,
            status,
            message,
            code,
            group,
        }
    }

    /// Symbolic registry key (e.g. `NOT_FOUND`).
    #[inline]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Kind name reported as the diagnostic `name` (e.g. `NotFoundError`).
    #[inline]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// HTTP status for this kind of failure.
    #[inline]
    pub const fn status(&self) -> HttpStatus {
        self.status
    }

    /// Message used when the caller gives none.
    #[inline]
    pub const fn default_message(&self) -> &'static str {
        self.message
    }

    /// Stable, client-facing error code.
    #[inline]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Registry group the definition belongs to.
    #[inline]
    pub const fn group(&self) -> ErrorGroup {
        self.group
    }
}

impl fmt::Display for ErrorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.status)
    }
}

/// Registry consistency violations, reported when building a resolver over
/// a caller-supplied definition set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two definitions share a stable code.
    #[error("stable code {code} is defined more than once")]
    DuplicateCode {
        /// The repeated code.
        code: &'static str,
    },
    /// Two definitions share a key.
    #[error("registry key {key} is defined more than once")]
    DuplicateKey {
        /// The repeated key.
        key: &'static str,
    },
}

// ============================================================================
// Const Uniqueness Checks
// ============================================================================

const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// `true` if no two definitions share a stable code or a key.
///
/// Usable in const context: `const _: () = assert!(all_unique(ALL));`
pub const fn all_unique(definitions: &[&ErrorDefinition]) -> bool {
    let mut i = 0;
    while i < definitions.len() {
        let mut j = i + 1;
        while j < definitions.len() {
            if str_eq(definitions[i].code, definitions[j].code)
                || str_eq(definitions[i].key, definitions[j].key)
            {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

// ============================================================================
// Tests
// ============================================================================
