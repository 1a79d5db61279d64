//! # Taxon Errors
//!
//! Error taxonomy and response normalization for HTTP backends.
//!
//! ## Design Philosophy
//!
//! 1. **One canonical shape** for every failure that reaches a client: status
//!    code, success flag, message, optional stable code, optional diagnostics
//! 2. **The taxonomy is data**: a registry of definitions, not a class hierarchy
//! 3. **Stable codes are contracts**: clients branch on `errorCode`, never on text
//! 4. **Classification is an ordered table**: the first matching rule wins, and
//!    the order is visible in one place
//! 5. **Diagnostics are gated**: `name` and `stack` leave the process only
//!    outside production
//!
//! ## Components
//!
//! - [`definitions`]: the registry (`key -> {status, message, code}`)
//! - [`Variant`]: the constructor derived from a registry entry
//! - [`Resolver`]: stable code back to its [`Variant`]
//! - [`classify()`]: arbitrary [`Failure`] to a [`ClassificationOutcome`]
//! - [`Responder`]: classify, log one line, write the [`ErrorEnvelope`]
//! - [`wrap()`]: funnels handler failures (errors and panics) to the responder
//!
//! ## Quick Start
//!
//! ```rust
//! use taxon_errors::{definitions, taxonomy_err, Result};
//!
//! fn find_user(id: u64) -> Result<String> {
//!     if id == 0 {
//!         return Err(taxonomy_err!(definitions::RECORD_NOT_FOUND, "User {} not found", id));
//!     }
//!     Ok(format!("user-{id}"))
//! }
//!
//! let err = find_user(0).unwrap_err();
//! assert_eq!(err.status().value(), 404);
//! assert_eq!(err.stable_code(), Some("RECORD_NOT_FOUND"));
//! assert_eq!(err.to_string(), "User 0 not found");
//! ```
//!
//! ## Responding
//!
//! ```rust
//! use taxon_errors::{
//!     Environment, Failure, RecentFailures, RequestInfo, Responder, ResponderConfig,
//! };
//!
//! let config = ResponderConfig::new(Environment::Production).with_host("api-1");
//! let responder = Responder::new(config, RecentFailures::new(16, 1024));
//!
//! let failure = Failure::from(std::io::Error::from(std::io::ErrorKind::ConnectionRefused));
//! let envelope = responder.handle(&failure, &RequestInfo::new("GET", "/orders"));
//!
//! assert_eq!(envelope.status_code, 503);
//! assert_eq!(envelope.message, "Connection refused. (ECONNREFUSED)");
//! assert!(envelope.stack.is_none());
//! ```
//!
//! ## Features
//!
//! - `axum`: `IntoResponse` for the envelopes
//! - `jwt`: conversions from `jsonwebtoken` errors
//! - `http-client`: conversions from `reqwest` errors

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::result;
use zeroize::Zeroize;

pub mod adapter;
pub mod classify;
pub mod codes;
pub mod config;
pub mod convenience;
pub mod definitions;
pub mod envelope;
pub mod failure;
pub mod logging;
pub mod resolver;
pub mod responder;
pub mod ring_buffer;
pub mod variant;

#[cfg(any(feature = "axum", feature = "jwt", feature = "http-client"))]
pub mod integrations;

pub use adapter::*;
pub use classify::*;
pub use codes::*;
pub use config::*;
pub use envelope::*;
pub use failure::*;
pub use logging::*;
pub use resolver::*;
pub use responder::*;
pub use ring_buffer::*;
pub use variant::*;

/// Type alias for Results using our error type.
pub type Result<T> = result::Result<T, TaxonomyError>;

/// Kind name reported for errors built without a registry definition.
pub const GENERIC_KIND: &str = "HttpError";

/// Capture a backtrace if the runtime supports and enables it.
///
/// Never fails: a disabled or unsupported backtrace is simply absent.
#[inline]
pub(crate) fn capture_trace() -> Option<String> {
    let trace = Backtrace::capture();
    match trace.status() {
        BacktraceStatus::Captured => Some(trace.to_string()),
        _ => None,
    }
}

/// The runtime error value of the taxonomy.
///
/// Carries the HTTP status and stable code of exactly one
/// [`ErrorDefinition`] (or, for the generic HTTP variant, a caller-supplied
/// status and no stable code), plus the client-facing message.
///
/// # Key Properties
///
/// - `succeeded()` is always `false`
/// - Two errors are the same kind iff their stable codes are equal; compare
///   codes, never constructors
/// - A backtrace is captured on a best-effort basis (honours `RUST_BACKTRACE`)
/// - Owned message and trace buffers are zeroized on drop
///
/// Created with [`Variant`], [`taxonomy_err!`], [`TaxonomyError::http`], or
/// [`TaxonomyError::from_code`].
#[must_use = "errors should be handled or returned"]
pub struct TaxonomyError {
    status: HttpStatus,
    message: Cow<'static, str>,
    definition: Option<&'static ErrorDefinition>,
    trace: Option<String>,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl TaxonomyError {
    #[inline]
    pub(crate) fn from_definition(
        definition: &'static ErrorDefinition,
        message: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            status: definition.status(),
            message: message.unwrap_or(Cow::Borrowed(definition.default_message())),
            definition: Some(definition),
            trace: capture_trace(),
            source: None,
        }
    }

    /// Generic HTTP error: caller-supplied status, no stable code.
    ///
    /// ```rust
    /// use taxon_errors::{HttpStatus, TaxonomyError};
    ///
    /// let err = TaxonomyError::http(HttpStatus::new(418), "Short and stout");
    /// assert_eq!(err.status().value(), 418);
    /// assert_eq!(err.stable_code(), None);
    /// assert_eq!(err.kind(), "HttpError");
    /// ```
    #[inline]
    pub fn http(status: HttpStatus, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status,
            message: message.into(),
            definition: None,
            trace: capture_trace(),
            source: None,
        }
    }

    /// Attach the underlying cause. Reported through `Error::source`, never
    /// through the envelope.
    #[inline]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status to respond with.
    #[inline]
    pub const fn status(&self) -> HttpStatus {
        self.status
    }

    /// Client-facing message (override or the definition's default).
    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// Stable code of the originating definition, if any.
    #[inline]
    pub fn stable_code(&self) -> Option<&'static str> {
        self.definition.map(ErrorDefinition::code)
    }

    /// The registry entry this error was built from, if any.
    #[inline]
    pub const fn definition(&self) -> Option<&'static ErrorDefinition> {
        self.definition
    }

    /// Kind name (e.g. `NotFoundError`, or `HttpError` for the generic variant).
    #[inline]
    pub fn kind(&self) -> &'static str {
        self.definition.map_or(GENERIC_KIND, ErrorDefinition::kind)
    }

    /// Always `false`.
    #[inline]
    pub const fn succeeded(&self) -> bool {
        false
    }

    /// Captured backtrace, when the runtime provided one.
    #[inline]
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

impl Drop for TaxonomyError {
    fn drop(&mut self) {
        self.source = None;
        if let Cow::Owned(ref mut s) = self.message {
            s.zeroize();
        }
        if let Some(ref mut trace) = self.trace {
            trace.zeroize();
        }
    }
}

impl fmt::Debug for TaxonomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaxonomyError")
            .field("status", &self.status)
            .field("code", &self.stable_code())
            .field("kind", &self.kind())
            .field("message", &self.message)
            .field("trace", &self.trace.as_ref().map(|_| "<PRESENT>"))
            .field("source", &self.source.as_ref().map(|_| "<PRESENT>"))
            .finish()
    }
}

impl fmt::Display for TaxonomyError {
    /// The client-facing message, nothing else.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TaxonomyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
