//! The one log line emitted per handled failure.
//!
//! [`LogLine`] borrows everything from the failure and request being handled,
//! so it cannot outlive them and costs nothing to build. Loggers receive it
//! through the injected [`ErrorLogger`] capability; the responder never
//! reaches for a global logger.
//!
//! Rendered form:
//!
//! ```text
//! [{host}] [{status}] | {METHOD} {path} - {kind} | {message}
//! ```
//!
//! followed by ` | {stack}` when diagnostics are enabled and a trace exists.
//! Every field is capped at 1024 bytes on a UTF-8 boundary.

use crate::HttpStatus;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Maximum length for any individual field in formatted output.
pub(crate) const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Appended to truncated fields.
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Structured record of one handled failure.
///
/// # Example
///
/// ```rust
/// use taxon_errors::{HttpStatus, LogLine};
///
/// let line = LogLine {
///     host: "api-1",
///     status: HttpStatus::new(404),
///     method: "GET",
///     path: "/users/7",
///     kind: "NotFoundError",
///     message: "Not found",
///     stack: None,
/// };
/// assert_eq!(line.to_string(), "[api-1] [404] | GET /users/7 - NotFoundError | Not found");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LogLine<'a> {
    /// Host identity from config.
    pub host: &'a str,
    /// Resolved status.
    pub status: HttpStatus,
    /// Request method.
    pub method: &'a str,
    /// Request path.
    pub path: &'a str,
    /// Failure kind name.
    pub kind: &'a str,
    /// Client-facing message.
    pub message: &'a str,
    /// Present only when diagnostics are enabled and a trace was captured.
    pub stack: Option<&'a str>,
}

impl LogLine<'_> {
    /// Write the line to a formatter without allocating for short fields.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] | {} {} - {} | {}",
            truncate_with_indicator(self.host),
            self.status,
            truncate_with_indicator(self.method),
            truncate_with_indicator(self.path),
            truncate_with_indicator(self.kind),
            truncate_with_indicator(self.message),
        )?;

        if let Some(stack) = self.stack {
            write!(f, " | {}", truncate_with_indicator(stack))?;
        }

        Ok(())
    }
}

impl fmt::Display for LogLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Truncate a field for display.
#[inline]
pub(crate) fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    truncate_to(s, MAX_FIELD_OUTPUT_LEN, TRUNCATION_INDICATOR)
}

/// Cap `s` at `max_bytes`, ending a cut string with `indicator`.
///
/// Returns the input borrowed when it fits; otherwise cuts at the last char
/// boundary that leaves room for the indicator. The result never exceeds
/// `max_bytes`, so a budget smaller than the indicator yields a prefix of it.
pub(crate) fn truncate_to<'a>(
    s: &'a str,
    max_bytes: usize,
    indicator: &'static str,
) -> Cow<'a, str> {
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }
    if max_bytes <= indicator.len() {
        // indicators are ASCII, so any prefix is valid UTF-8
        return Cow::Borrowed(&indicator[..max_bytes]);
    }

    let mut idx = max_bytes - indicator.len();
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(indicator);
    }

    let mut result = String::with_capacity(idx + indicator.len());
    result.push_str(&s[..idx]);
    result.push_str(indicator);
    Cow::Owned(result)
}

// ============================================================================
// Logger capability
// ============================================================================

/// Sink for the per-failure log line.
///
/// Called exactly once per handled failure, from whatever task handled it.
pub trait ErrorLogger: Send + Sync {
    /// Record one handled failure.
    fn log_failure(&self, line: &LogLine<'_>);
}

impl<L: ErrorLogger + ?Sized> ErrorLogger for Arc<L> {
    fn log_failure(&self, line: &LogLine<'_>) {
        (**self).log_failure(line);
    }
}

impl<L: ErrorLogger + ?Sized> ErrorLogger for &L {
    fn log_failure(&self, line: &LogLine<'_>) {
        (**self).log_failure(line);
    }
}

/// Emits one `tracing` error event per failure.
///
/// Structured fields carry host, status, method, path and kind; the event
/// message is the rendered line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn log_failure(&self, line: &LogLine<'_>) {
        tracing::error!(
            host = line.host,
            status = line.status.value(),
            method = line.method,
            path = line.path,
            kind = line.kind,
            "{}",
            line
        );
    }
}
