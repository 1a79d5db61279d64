//! Wire envelopes.
//!
//! Failure:
//!
//! ```json
//! {"status":false,"statusCode":404,"message":"Not found","errorCode":"NOT_FOUND"}
//! ```
//!
//! `errorCode` appears only when a stable code was resolved; `name` and
//! `stack` only with diagnostics enabled; `timestamp` only when configured.
//! Success is the same shape minus the error fields plus optional `data`.
//! A failure always has `status: false`; a success has `statusCode < 400`.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Default success message.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Current UTC time as RFC 3339 with millisecond precision and `Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[inline]
const fn is_success(status_code: u16) -> bool {
    status_code < 400
}

/// Body written for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub status: bool,
    /// HTTP status sent with the body.
    pub status_code: u16,
    /// Client-facing message.
    pub message: String,
    /// Stable registry code, when one was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    /// Kind name; diagnostics only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Captured trace; diagnostics only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// RFC 3339 time of the response, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorEnvelope {
    /// Envelope with only the mandatory fields.
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status: false,
            status_code,
            message: message.into(),
            error_code: None,
            name: None,
            stack: None,
            timestamp: None,
        }
    }

    /// Set or clear `errorCode`.
    #[must_use]
    pub fn with_error_code(mut self, code: Option<&'static str>) -> Self {
        self.error_code = code;
        self
    }

    /// Attach `name` and `stack` (the latter only if present).
    #[must_use]
    pub fn with_diagnostics(mut self, name: impl Into<String>, stack: Option<&str>) -> Self {
        self.name = Some(name.into());
        self.stack = stack.map(str::to_owned);
        self
    }

    /// Stamp with the current time.
    #[must_use]
    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = Some(timestamp_now());
        self
    }

    /// Serialize to a JSON value; the envelope has no non-string keys, so
    /// this only falls back to `Null` if serialization itself is broken.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Body written for a successful request.
///
/// ```rust
/// use taxon_errors::SuccessEnvelope;
///
/// let body = SuccessEnvelope::ok(vec![1, 2, 3]).to_json();
/// assert_eq!(body["statusCode"], 200);
/// assert_eq!(body["status"], true);
/// assert_eq!(body["message"], "Success");
/// assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEnvelope<T> {
    /// HTTP status sent with the body.
    pub status_code: u16,
    /// `status_code < 400`.
    pub status: bool,
    /// Client-facing message.
    pub message: String,
    /// Payload; omitted when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// RFC 3339 time of the response, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl<T> SuccessEnvelope<T> {
    /// Envelope with an explicit status, message and optional data.
    pub fn new(status_code: u16, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status_code,
            status: is_success(status_code),
            message: message.into(),
            data,
            timestamp: None,
        }
    }

    /// `200 Success` with `data`.
    pub fn ok(data: T) -> Self {
        Self::new(200, SUCCESS_MESSAGE, Some(data))
    }

    /// Stamp with the current time.
    #[must_use]
    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = Some(timestamp_now());
        self
    }
}

impl SuccessEnvelope<()> {
    /// Envelope without `data`.
    pub fn empty(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, message, None)
    }
}

impl<T: Serialize> SuccessEnvelope<T> {
    /// Serialize to a JSON value, `Null` if `T` fails to serialize.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
