//! Ordered classification of arbitrary failures.
//!
//! [`RULES`] is a fixed table of `(predicate, resolver)` pairs evaluated top
//! to bottom; the first rule whose predicate matches produces the
//! [`ClassificationOutcome`] and no later rule runs. The final rule matches
//! everything, so classification is total.
//!
//! | # | Rule | Status | Message |
//! |---|------|--------|---------|
//! | 1 | own taxonomy error | its own | its own |
//! | 2 | duplicate key (code 11000) | 409 | `Duplicate entry: k: v, ... already exists.` |
//! | 3 | `ValidationError` | 400 | field messages joined by `, ` |
//! | 4 | `CastError` | 400 | `Invalid {path}: {value}` |
//! | 5 | token kinds | 401 | fixed per kind |
//! | 6 | OS codes | fixed per code | fixed text plus ` (CODE)` |
//! | 7 | runtime kinds | 500 | `Unexpected {kind}: {message}` |
//! | 8 | outbound call / `fetch\|network` | 502 | `External API/network request failed: {message}` |
//! | 9 | fallback | valid `status_code` or 500 | message or generic text |
//!
//! Rule order is part of the contract: a taxonomy error is never
//! re-classified by a later rule, and a duplicate-key error never reaches the
//! fallback.

use crate::failure::conventions;
use crate::{ErrorShape, Failure, FailureCode, HttpStatus};
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

/// Message used by the fallback rule when the failure has none.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Which rule produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Already a [`TaxonomyError`](crate::TaxonomyError).
    Taxonomy,
    /// Unique-index violation.
    DuplicateKey,
    /// Schema validation with per-field messages.
    Validation,
    /// Malformed identifier or value cast.
    Cast,
    /// Expired or invalid bearer token.
    Token,
    /// Operating-system network or file error.
    Os,
    /// Built-in runtime kind such as `TypeError`.
    Runtime,
    /// Failed outbound HTTP call.
    Outbound,
    /// Nothing else matched.
    Fallback,
}

impl RuleKind {
    /// Snake-case label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Taxonomy => "taxonomy",
            Self::DuplicateKey => "duplicate_key",
            Self::Validation => "validation",
            Self::Cast => "cast",
            Self::Token => "token",
            Self::Os => "os",
            Self::Runtime => "runtime",
            Self::Outbound => "outbound",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved `{status, message, stable code?}` for one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationOutcome {
    /// HTTP status sent to the client.
    pub status: HttpStatus,
    /// Client-facing message.
    pub message: Cow<'static, str>,
    /// Stable code, only for taxonomy errors built from a definition.
    pub stable_code: Option<&'static str>,
    /// The rule that matched.
    pub rule: RuleKind,
}

impl ClassificationOutcome {
    fn new(status: u16, message: impl Into<Cow<'static, str>>, rule: RuleKind) -> Self {
        Self {
            status: HttpStatus::new(status),
            message: message.into(),
            stable_code: None,
            rule,
        }
    }
}

/// One entry of the classification table.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Which rule this is.
    pub kind: RuleKind,
    /// Returns `true` if this rule handles the failure.
    pub matches: fn(&Failure) -> bool,
    /// Produces the outcome. Only called after `matches` returned `true`.
    pub resolve: fn(&Failure) -> ClassificationOutcome,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.kind).finish()
    }
}

/// The classification table, in evaluation order.
pub static RULES: [Rule; 9] = [
    Rule {
        kind: RuleKind::Taxonomy,
        matches: |f| f.as_taxonomy().is_some(),
        resolve: resolve_taxonomy,
    },
    Rule {
        kind: RuleKind::DuplicateKey,
        matches: |f| shape(f).is_some_and(is_duplicate_key),
        resolve: resolve_duplicate_key,
    },
    Rule {
        kind: RuleKind::Validation,
        matches: |f| shape(f).is_some_and(|s| s.name() == conventions::VALIDATION_KIND),
        resolve: resolve_validation,
    },
    Rule {
        kind: RuleKind::Cast,
        matches: |f| shape(f).is_some_and(|s| s.name() == conventions::CAST_KIND),
        resolve: resolve_cast,
    },
    Rule {
        kind: RuleKind::Token,
        matches: |f| shape(f).is_some_and(|s| token_message(s.name()).is_some()),
        resolve: resolve_token,
    },
    Rule {
        kind: RuleKind::Os,
        matches: |f| shape(f).and_then(os_code).is_some(),
        resolve: resolve_os,
    },
    Rule {
        kind: RuleKind::Runtime,
        matches: |f| shape(f).is_some_and(is_runtime_kind),
        resolve: resolve_runtime,
    },
    Rule {
        kind: RuleKind::Outbound,
        matches: |f| shape(f).is_some_and(is_outbound),
        resolve: resolve_outbound,
    },
    Rule {
        kind: RuleKind::Fallback,
        matches: |_| true,
        resolve: resolve_fallback,
    },
];

/// Classify `failure` by the first matching rule in [`RULES`].
///
/// Pure: classifying the same failure twice yields equal outcomes.
///
/// ```rust
/// use taxon_errors::{classify, ErrorShape, Failure};
///
/// let failure = Failure::from(ErrorShape::duplicate_key([("email", "a@b.com")]));
/// let outcome = classify(&failure);
/// assert_eq!(outcome.status.value(), 409);
/// assert_eq!(outcome.message, "Duplicate entry: email: a@b.com already exists.");
/// ```
pub fn classify(failure: &Failure) -> ClassificationOutcome {
    RULES
        .iter()
        .find(|rule| (rule.matches)(failure))
        .map_or_else(|| resolve_fallback(failure), |rule| (rule.resolve)(failure))
}

// ============================================================================
// Recognizers
// ============================================================================

static OUTBOUND_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)fetch|network").ok());

#[inline]
fn shape(failure: &Failure) -> Option<&ErrorShape> {
    failure.as_shape()
}

#[inline]
fn message_of(shape: &ErrorShape) -> &str {
    shape.message().unwrap_or_default()
}

fn is_duplicate_key(shape: &ErrorShape) -> bool {
    matches!(shape.code(), Some(FailureCode::Numeric(conventions::DUPLICATE_KEY_CODE)))
}

fn is_runtime_kind(shape: &ErrorShape) -> bool {
    conventions::RUNTIME_KINDS.iter().any(|kind| *kind == shape.name())
}

fn token_message(kind: &str) -> Option<&'static str> {
    match kind {
        conventions::TOKEN_EXPIRED_KIND => Some("Access token has expired"),
        conventions::TOKEN_MALFORMED_KIND => Some("Invalid access token"),
        conventions::TOKEN_NOT_ACTIVE_KIND => Some("Access token not active yet"),
        _ => None,
    }
}

/// Recognized OS codes with their fixed status and message.
const OS_CODES: [(&str, u16, &str); 5] = [
    ("ENOENT", 404, "File or resource not found."),
    ("EACCES", 403, "Permission denied."),
    ("ECONNREFUSED", 503, "Connection refused."),
    ("ETIMEDOUT", 504, "Request timed out."),
    ("ECONNRESET", 502, "Connection was reset."),
];

fn os_code(shape: &ErrorShape) -> Option<(&'static str, u16, &'static str)> {
    let symbol = shape.code()?.as_symbol()?;
    OS_CODES.iter().copied().find(|(code, _, _)| *code == symbol)
}

fn is_outbound(shape: &ErrorShape) -> bool {
    shape.is_outbound()
        || OUTBOUND_PATTERN
            .as_ref()
            .is_some_and(|re| re.is_match(message_of(shape)))
}

// ============================================================================
// Resolvers
// ============================================================================

fn resolve_taxonomy(failure: &Failure) -> ClassificationOutcome {
    match failure.as_taxonomy() {
        Some(err) => ClassificationOutcome {
            status: err.status(),
            message: Cow::Owned(err.message().to_owned()),
            stable_code: err.stable_code(),
            rule: RuleKind::Taxonomy,
        },
        None => resolve_fallback(failure),
    }
}

fn resolve_duplicate_key(failure: &Failure) -> ClassificationOutcome {
    let fields = shape(failure)
        .and_then(ErrorShape::key_value)
        .unwrap_or_default()
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ");
    ClassificationOutcome::new(
        409,
        format!("Duplicate entry: {fields} already exists."),
        RuleKind::DuplicateKey,
    )
}

fn resolve_validation(failure: &Failure) -> ClassificationOutcome {
    let joined = shape(failure)
        .map(|s| s.field_messages().join(", "))
        .unwrap_or_default();
    ClassificationOutcome::new(400, joined, RuleKind::Validation)
}

fn resolve_cast(failure: &Failure) -> ClassificationOutcome {
    let (path, value) = shape(failure)
        .map(|s| (s.path().unwrap_or_default(), s.value().unwrap_or_default()))
        .unwrap_or_default();
    ClassificationOutcome::new(400, format!("Invalid {path}: {value}"), RuleKind::Cast)
}

fn resolve_token(failure: &Failure) -> ClassificationOutcome {
    let message = token_message(failure.kind()).unwrap_or("Invalid access token");
    ClassificationOutcome::new(401, message, RuleKind::Token)
}

fn resolve_os(failure: &Failure) -> ClassificationOutcome {
    match shape(failure).and_then(os_code) {
        Some((code, status, text)) => {
            ClassificationOutcome::new(status, format!("{text} ({code})"), RuleKind::Os)
        }
        None => resolve_fallback(failure),
    }
}

/// The failure's message, or [`GENERIC_MESSAGE`] when absent or empty.
fn message_or_generic(failure: &Failure) -> &str {
    match failure.message() {
        Some(m) if !m.is_empty() => m,
        _ => GENERIC_MESSAGE,
    }
}

fn resolve_runtime(failure: &Failure) -> ClassificationOutcome {
    let message = message_or_generic(failure);
    ClassificationOutcome::new(
        500,
        format!("Unexpected {}: {message}", failure.kind()),
        RuleKind::Runtime,
    )
}

fn resolve_outbound(failure: &Failure) -> ClassificationOutcome {
    let message = message_or_generic(failure);
    ClassificationOutcome::new(
        502,
        format!("External API/network request failed: {message}"),
        RuleKind::Outbound,
    )
}

fn resolve_fallback(failure: &Failure) -> ClassificationOutcome {
    let status = HttpStatus::or_internal(shape(failure).and_then(ErrorShape::status_code));
    ClassificationOutcome {
        status,
        message: Cow::Owned(message_or_generic(failure).to_owned()),
        stable_code: None,
        rule: RuleKind::Fallback,
    }
}
