//! Terminal error-handling stage.
//!
//! [`Responder::respond`] is what a hosting runtime binds as its error
//! dispatch path: classify the failure, log exactly one line, write exactly
//! one JSON envelope. It holds no mutable state of its own; concurrent
//! requests share it freely.

use crate::{
    ClassificationOutcome, ErrorEnvelope, ErrorLogger, Failure, LogLine, ResponderConfig,
    classify,
};
use serde_json::Value;

/// Request metadata the log line needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
}

impl RequestInfo {
    /// Request metadata from its method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

/// Response-writing capability supplied by the hosting runtime.
pub trait ResponseWriter {
    /// Set the status and write `body` as JSON. Called once per failure.
    fn send_json(&mut self, status: u16, body: Value);
}

/// Classifies failures and writes envelopes.
#[derive(Debug, Clone)]
pub struct Responder<L> {
    config: ResponderConfig,
    logger: L,
}

impl<L: ErrorLogger> Responder<L> {
    /// Responder writing one line per failure to `logger`.
    pub fn new(config: ResponderConfig, logger: L) -> Self {
        Self { config, logger }
    }

    /// Active settings.
    #[inline]
    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Injected logger.
    #[inline]
    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Classification only; no logging, no envelope.
    #[inline]
    pub fn classify(&self, failure: &Failure) -> ClassificationOutcome {
        classify(failure)
    }

    /// Classify, log one line, and build the envelope.
    pub fn handle(&self, failure: &Failure, request: &RequestInfo) -> ErrorEnvelope {
        let outcome = classify(failure);
        let diagnostics = self.config.diagnostics_enabled();
        let stack = if diagnostics { failure.trace() } else { None };

        self.logger.log_failure(&LogLine {
            host: &self.config.host,
            status: outcome.status,
            method: &request.method,
            path: &request.path,
            kind: failure.kind(),
            message: &outcome.message,
            stack,
        });

        let mut envelope = ErrorEnvelope::new(outcome.status.value(), outcome.message)
            .with_error_code(outcome.stable_code);
        if diagnostics {
            envelope = envelope.with_diagnostics(failure.kind(), stack);
        }
        if self.config.include_timestamp {
            envelope = envelope.with_timestamp();
        }
        envelope
    }

    /// [`handle`](Self::handle), then write the envelope through `writer`.
    pub fn respond<W>(&self, failure: &Failure, request: &RequestInfo, writer: &mut W)
    where
        W: ResponseWriter + ?Sized,
    {
        let envelope = self.handle(failure, request);
        writer.send_json(envelope.status_code, envelope.to_json());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Environment, ErrorShape, RecentFailures, definitions, taxonomy_err};

    #[derive(Default)]
    struct Recorded(Vec<(u16, Value)>);

    impl ResponseWriter for Recorded {
        fn send_json(&mut self, status: u16, body: Value) {
            self.0.push((status, body));
        }
    }

    fn responder(env: Environment) -> Responder<RecentFailures> {
        Responder::new(
            ResponderConfig::new(env).with_host("api-1"),
            RecentFailures::new(8, 1024),
        )
    }

    #[test]
    fn production_hides_diagnostics() {
        let responder = responder(Environment::Production);
        let failure = Failure::from(ErrorShape::named("TypeError").with_trace("at f()"));
        let envelope = responder.handle(&failure, &RequestInfo::new("GET", "/"));
        assert!(envelope.name.is_none());
        assert!(envelope.stack.is_none());
    }

    #[test]
    fn development_exposes_name_and_stack() {
        let responder = responder(Environment::Development);
        let failure = Failure::from(ErrorShape::named("TypeError").with_trace("at f()"));
        let envelope = responder.handle(&failure, &RequestInfo::new("GET", "/"));
        assert_eq!(envelope.name.as_deref(), Some("TypeError"));
        assert_eq!(envelope.stack.as_deref(), Some("at f()"));
    }

    #[test]
    fn logs_exactly_one_line() {
        let responder = responder(Environment::Production);
        let failure = Failure::from(taxonomy_err!(definitions::NOT_FOUND));
        responder.handle(&failure, &RequestInfo::new("DELETE", "/items/3"));

        let entries = responder.logger().get_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, 404);
        assert_eq!(entries[0].method.as_ref(), "DELETE");
        assert_eq!(entries[0].kind.as_ref(), "NotFoundError");
    }

    #[test]
    fn error_code_only_for_stable_codes() {
        let responder = responder(Environment::Production);
        let request = RequestInfo::new("GET", "/");

        let typed = Failure::from(taxonomy_err!(definitions::GONE));
        assert_eq!(responder.handle(&typed, &request).error_code, Some("GONE"));

        let foreign = Failure::from(ErrorShape::named("Error"));
        assert_eq!(responder.handle(&foreign, &request).error_code, None);
    }

    #[test]
    fn respond_writes_once() {
        let responder = responder(Environment::Production);
        let mut writer = Recorded::default();
        let failure = Failure::from(ErrorShape::cast("_id", "zz"));
        responder.respond(&failure, &RequestInfo::new("GET", "/u/zz"), &mut writer);

        assert_eq!(writer.0.len(), 1);
        let (status, body) = &writer.0[0];
        assert_eq!(*status, 400);
        assert_eq!(body["message"], "Invalid _id: zz");
        assert_eq!(body["status"], false);
    }

    #[test]
    fn timestamp_follows_config() {
        let responder = Responder::new(
            ResponderConfig::new(Environment::Production).with_timestamps(true),
            RecentFailures::new(1, 64),
        );
        let envelope =
            responder.handle(&Failure::from(ErrorShape::named("Error")), &RequestInfo::new("GET", "/"));
        assert!(envelope.timestamp.is_some());
    }
}
