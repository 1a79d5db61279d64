//! The untyped failure value handed to the classifier.
//!
//! A request can fail with anything: one of our own [`TaxonomyError`]s, a
//! storage driver error, a token-verification error, an OS error, a runtime
//! fault, an outbound HTTP failure, or a panic. [`Failure`] is the one type
//! the classifier accepts. It is either a typed [`TaxonomyError`] or an
//! [`ErrorShape`]: a structural description of a foreign error (kind name,
//! message, code, and the handful of convention-specific fields the
//! recognizers look at).
//!
//! Recognition is purely structural. Nothing here inspects control flow or
//! performs I/O.
//!
//! ```rust
//! use taxon_errors::{ErrorShape, Failure};
//!
//! let failure = Failure::from(
//!     ErrorShape::duplicate_key([("email", "a@b.com")]).with_message("E11000 duplicate key"),
//! );
//! assert_eq!(failure.kind(), "MongoServerError");
//! ```

use crate::{TaxonomyError, capture_trace};
use smallvec::SmallVec;
use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::io;
use zeroize::Zeroize;

/// Kind names and codes the recognizers match on.
///
/// These are the de-facto conventions of the ecosystems the failures come
/// from; they are matched exactly (case-sensitive).
pub mod conventions {
    /// Numeric code a document store reports for a unique-index violation.
    pub const DUPLICATE_KEY_CODE: i64 = 11000;
    /// Kind name of a document store's duplicate-key error.
    pub const DUPLICATE_KEY_KIND: &str = "MongoServerError";
    /// Kind name of a storage-layer schema validation error.
    pub const VALIDATION_KIND: &str = "ValidationError";
    /// Kind name of a storage-layer cast (bad identifier/value) error.
    pub const CAST_KIND: &str = "CastError";
    /// Token past its expiry.
    pub const TOKEN_EXPIRED_KIND: &str = "TokenExpiredError";
    /// Token that failed to decode or verify.
    pub const TOKEN_MALFORMED_KIND: &str = "JsonWebTokenError";
    /// Token used before its not-before time.
    pub const TOKEN_NOT_ACTIVE_KIND: &str = "NotBeforeError";
    /// The seven built-in runtime fault kinds.
    pub const RUNTIME_KINDS: [&str; 7] = [
        "SyntaxError",
        "ReferenceError",
        "TypeError",
        "RangeError",
        "URIError",
        "EvalError",
        "AggregateError",
    ];
    /// Kind name for OS-level failures converted from `std::io::Error`.
    pub const SYSTEM_KIND: &str = "SystemError";
    /// Kind name for a captured panic.
    pub const PANIC_KIND: &str = "Panic";
    /// Kind name used when nothing better is known.
    pub const DEFAULT_KIND: &str = "Error";
}

// ============================================================================
// Failure Code
// ============================================================================

/// The `code` attached to a foreign error: numeric (driver codes) or
/// symbolic (OS codes such as `ENOENT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCode {
    /// Numeric code, e.g. a driver error number.
    Numeric(i64),
    /// Symbolic code, e.g. `ECONNREFUSED`.
    Symbolic(Cow<'static, str>),
}

impl FailureCode {
    /// The symbolic form, if this is a symbolic code.
    #[inline]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbolic(s) => Some(s.as_ref()),
            Self::Numeric(_) => None,
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Symbolic(s) => f.write_str(s),
        }
    }
}

/// Map an I/O error kind to its conventional OS error symbol.
#[inline]
const fn os_error_symbol(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::NotFound => Some("ENOENT"),
        io::ErrorKind::PermissionDenied => Some("EACCES"),
        io::ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
        io::ErrorKind::ConnectionReset => Some("ECONNRESET"),
        io::ErrorKind::TimedOut => Some("ETIMEDOUT"),
        io::ErrorKind::HostUnreachable => Some("EHOSTUNREACH"),
        io::ErrorKind::NetworkUnreachable => Some("ENETUNREACH"),
        io::ErrorKind::ConnectionAborted => Some("ECONNABORTED"),
        io::ErrorKind::NotConnected => Some("ENOTCONN"),
        io::ErrorKind::AddrInUse => Some("EADDRINUSE"),
        io::ErrorKind::AddrNotAvailable => Some("EADDRNOTAVAIL"),
        io::ErrorKind::BrokenPipe => Some("EPIPE"),
        io::ErrorKind::AlreadyExists => Some("EEXIST"),
        io::ErrorKind::WouldBlock => Some("EAGAIN"),
        io::ErrorKind::InvalidInput => Some("EINVAL"),
        io::ErrorKind::Interrupted => Some("EINTR"),
        io::ErrorKind::OutOfMemory => Some("ENOMEM"),
        _ => None,
    }
}

// ============================================================================
// Error Shape
// ============================================================================

/// Structural description of a foreign error.
///
/// Every field is optional; recognizers only look at the fields their
/// convention defines. Owned message and trace buffers are zeroized on drop.
#[derive(Debug, Clone)]
pub struct ErrorShape {
    name: Cow<'static, str>,
    message: Option<String>,
    code: Option<FailureCode>,
    status_code: Option<i64>,
    key_value: Option<SmallVec<[(String, String); 2]>>,
    field_messages: SmallVec<[String; 4]>,
    path: Option<String>,
    value: Option<String>,
    outbound: bool,
    trace: Option<String>,
}

impl ErrorShape {
    /// A shape with the given kind name and nothing else.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            message: None,
            code: None,
            status_code: None,
            key_value: None,
            field_messages: SmallVec::new(),
            path: None,
            value: None,
            outbound: false,
            trace: None,
        }
    }

    /// Duplicate-key failure with the offending field/value pairs.
    ///
    /// An empty iterator still records the duplicate-key signal; the
    /// classifier then renders an empty field list.
    pub fn duplicate_key<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut shape = Self::named(conventions::DUPLICATE_KEY_KIND)
            .with_code(FailureCode::Numeric(conventions::DUPLICATE_KEY_CODE));
        shape.key_value = Some(pairs);
        shape
    }

    /// Storage-layer validation failure with one message per field.
    pub fn validation<M: Into<String>>(messages: impl IntoIterator<Item = M>) -> Self {
        let mut shape = Self::named(conventions::VALIDATION_KIND);
        shape.field_messages = messages.into_iter().map(Into::into).collect();
        shape
    }

    /// Storage-layer cast failure for `path` holding `value`.
    pub fn cast(path: impl Into<String>, value: impl Into<String>) -> Self {
        let mut shape = Self::named(conventions::CAST_KIND);
        shape.path = Some(path.into());
        shape.value = Some(value.into());
        shape
    }

    /// OS-level failure identified by its symbol (e.g. `ECONNREFUSED`).
    pub fn os(symbol: impl Into<Cow<'static, str>>) -> Self {
        Self::named(conventions::SYSTEM_KIND).with_code(FailureCode::Symbolic(symbol.into()))
    }

    /// Set the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the driver or OS code.
    #[must_use]
    pub fn with_code(mut self, code: FailureCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Status code carried by the foreign error, validated only at
    /// classification time.
    #[must_use]
    pub fn with_status_code(mut self, status_code: i64) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Append one field/value pair to the duplicate-key payload.
    #[must_use]
    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_value
            .get_or_insert_with(SmallVec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Append one field validation message.
    #[must_use]
    pub fn with_field_message(mut self, message: impl Into<String>) -> Self {
        self.field_messages.push(message.into());
        self
    }

    /// Flag this as a failure of an outbound HTTP call.
    #[must_use]
    pub fn outbound(mut self) -> Self {
        self.outbound = true;
        self
    }

    /// Attach a trace rendered as `stack` in development.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Attach a backtrace of the current location, when available.
    #[must_use]
    pub fn with_captured_trace(mut self) -> Self {
        if self.trace.is_none() {
            self.trace = capture_trace();
        }
        self
    }

    /// Kind name, e.g. `TypeError`.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Raw message, possibly empty.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Driver or OS code.
    #[inline]
    pub fn code(&self) -> Option<&FailureCode> {
        self.code.as_ref()
    }

    /// Unvalidated status carried by the foreign error.
    #[inline]
    pub fn status_code(&self) -> Option<i64> {
        self.status_code
    }

    /// Duplicate-key pairs; `None` when the failure carried no payload.
    #[inline]
    pub fn key_value(&self) -> Option<&[(String, String)]> {
        self.key_value.as_deref()
    }

    /// Per-field validation messages.
    #[inline]
    pub fn field_messages(&self) -> &[String] {
        &self.field_messages
    }

    /// Field that failed to cast.
    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Value that failed to cast.
    #[inline]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Set by [`ErrorShape::outbound`].
    #[inline]
    pub const fn is_outbound(&self) -> bool {
        self.outbound
    }

    /// Captured trace, if any.
    #[inline]
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

impl Drop for ErrorShape {
    fn drop(&mut self) {
        if let Some(ref mut message) = self.message {
            message.zeroize();
        }
        if let Some(ref mut trace) = self.trace {
            trace.zeroize();
        }
    }
}

impl From<&io::Error> for ErrorShape {
    fn from(err: &io::Error) -> Self {
        let shape = match os_error_symbol(err.kind()) {
            Some(symbol) => Self::os(symbol),
            None => Self::named(conventions::SYSTEM_KIND),
        };
        shape.with_message(err.to_string()).with_captured_trace()
    }
}

impl From<&serde_json::Error> for ErrorShape {
    fn from(err: &serde_json::Error) -> Self {
        use serde_json::error::Category;

        let shape = match err.classify() {
            Category::Syntax | Category::Eof => Self::named("SyntaxError"),
            Category::Data => Self::named("TypeError"),
            Category::Io => Self::named(conventions::SYSTEM_KIND),
        };
        shape.with_message(err.to_string()).with_captured_trace()
    }
}

// ============================================================================
// Failure
// ============================================================================

/// Any value a request can fail with.
#[derive(Debug)]
pub enum Failure {
    /// One of our own typed errors. Authoritative: used verbatim.
    Taxonomy(TaxonomyError),
    /// A structurally described foreign error.
    Shaped(ErrorShape),
}

impl Failure {
    /// Normalize a boxed error, recovering typed errors where possible.
    ///
    /// `TaxonomyError`, `std::io::Error` and `serde_json::Error` are
    /// recognized by downcasting; anything else becomes a shape carrying only
    /// its display text.
    pub fn from_boxed(err: Box<dyn Error + Send + Sync + 'static>) -> Self {
        let err = match err.downcast::<TaxonomyError>() {
            Ok(typed) => return Self::Taxonomy(*typed),
            Err(other) => other,
        };
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Self::Shaped(ErrorShape::from(io_err));
        }
        if let Some(json_err) = err.downcast_ref::<serde_json::Error>() {
            return Self::Shaped(ErrorShape::from(json_err));
        }
        Self::Shaped(
            ErrorShape::named(conventions::DEFAULT_KIND)
                .with_message(err.to_string())
                .with_captured_trace(),
        )
    }

    /// Describe a panic payload as a failure of kind `Panic`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("handler panicked")
        };
        Self::Shaped(ErrorShape::named(conventions::PANIC_KIND).with_message(message))
    }

    /// Kind name, as reported in diagnostics and the log line.
    pub fn kind(&self) -> &str {
        match self {
            Self::Taxonomy(err) => err.kind(),
            Self::Shaped(shape) => shape.name(),
        }
    }

    /// Message, if the failure carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Taxonomy(err) => Some(err.message()),
            Self::Shaped(shape) => shape.message(),
        }
    }

    /// Captured diagnostic trace, if any.
    pub fn trace(&self) -> Option<&str> {
        match self {
            Self::Taxonomy(err) => err.trace(),
            Self::Shaped(shape) => shape.trace(),
        }
    }

    /// The typed error, when this is one of ours.
    pub fn as_taxonomy(&self) -> Option<&TaxonomyError> {
        match self {
            Self::Taxonomy(err) => Some(err),
            Self::Shaped(_) => None,
        }
    }

    /// The structural description, when this is a foreign error.
    pub fn as_shape(&self) -> Option<&ErrorShape> {
        match self {
            Self::Shaped(shape) => Some(shape),
            Self::Taxonomy(_) => None,
        }
    }
}

impl From<TaxonomyError> for Failure {
    fn from(err: TaxonomyError) -> Self {
        Self::Taxonomy(err)
    }
}

impl From<ErrorShape> for Failure {
    fn from(shape: ErrorShape) -> Self {
        Self::Shaped(shape)
    }
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        Self::Shaped(ErrorShape::from(&err))
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Self::Shaped(ErrorShape::from(&err))
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for Failure {
    fn from(err: Box<dyn Error + Send + Sync + 'static>) -> Self {
        Self::from_boxed(err)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {}", self.kind(), message),
            None => f.write_str(self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HttpStatus, definitions, taxonomy_err};

    #[test]
    fn io_errors_map_to_os_symbols() {
        let cases = [
            (io::ErrorKind::NotFound, "ENOENT"),
            (io::ErrorKind::PermissionDenied, "EACCES"),
            (io::ErrorKind::ConnectionRefused, "ECONNREFUSED"),
            (io::ErrorKind::TimedOut, "ETIMEDOUT"),
            (io::ErrorKind::ConnectionReset, "ECONNRESET"),
        ];
        for (kind, symbol) in cases {
            let shape = ErrorShape::from(&io::Error::from(kind));
            assert_eq!(shape.name(), conventions::SYSTEM_KIND);
            assert_eq!(shape.code().and_then(FailureCode::as_symbol), Some(symbol));
        }
    }

    #[test]
    fn unmapped_io_kind_has_no_code() {
        let shape = ErrorShape::from(&io::Error::other("disk on fire"));
        assert!(shape.code().is_none());
        assert_eq!(shape.message(), Some("disk on fire"));
    }

    #[test]
    fn json_errors_map_to_runtime_kinds() {
        let syntax = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ErrorShape::from(&syntax).name(), "SyntaxError");

        let data = serde_json::from_str::<u8>("\"text\"").unwrap_err();
        assert_eq!(ErrorShape::from(&data).name(), "TypeError");
    }

    #[test]
    fn boxed_taxonomy_error_is_recovered() {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(taxonomy_err!(definitions::GONE));
        let failure = Failure::from_boxed(boxed);
        assert_eq!(
            failure.as_taxonomy().and_then(TaxonomyError::stable_code),
            Some("GONE")
        );
    }

    #[test]
    fn boxed_io_error_is_recovered() {
        let boxed: Box<dyn Error + Send + Sync> =
            Box::new(io::Error::from(io::ErrorKind::PermissionDenied));
        let failure = Failure::from(boxed);
        assert_eq!(failure.kind(), conventions::SYSTEM_KIND);
    }

    #[test]
    fn boxed_unknown_error_keeps_display_text() {
        let boxed: Box<dyn Error + Send + Sync> = "plain failure".into();
        let failure = Failure::from_boxed(boxed);
        assert_eq!(failure.kind(), conventions::DEFAULT_KIND);
        assert_eq!(failure.message(), Some("plain failure"));
    }

    #[test]
    fn panic_payloads_are_described() {
        let failure = Failure::from_panic(Box::new("static str panic"));
        assert_eq!(failure.kind(), conventions::PANIC_KIND);
        assert_eq!(failure.message(), Some("static str panic"));

        let failure = Failure::from_panic(Box::new(String::from("owned panic")));
        assert_eq!(failure.message(), Some("owned panic"));

        let failure = Failure::from_panic(Box::new(7_u32));
        assert_eq!(failure.message(), Some("handler panicked"));
    }

    #[test]
    fn duplicate_key_builder_sets_signal() {
        let shape = ErrorShape::duplicate_key([("email", "a@b.com")]);
        assert_eq!(
            shape.code(),
            Some(&FailureCode::Numeric(conventions::DUPLICATE_KEY_CODE))
        );
        assert_eq!(shape.key_value().map(<[_]>::len), Some(1));

        let empty = ErrorShape::duplicate_key(Vec::<(String, String)>::new());
        assert_eq!(empty.key_value().map(<[_]>::len), Some(0));
    }

    #[test]
    fn display_joins_kind_and_message() {
        let failure = Failure::from(TaxonomyError::http(HttpStatus::new(400), "nope"));
        assert_eq!(failure.to_string(), "HttpError: nope");
        let failure = Failure::from(ErrorShape::named("Weird"));
        assert_eq!(failure.to_string(), "Weird");
    }
}
