//! End-to-end tests through the public API: handler, adapter, responder,
//! writer.

use serde_json::{Value, json};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taxon_errors::{
    Environment, ErrorShape, Failure, RecentFailures, RequestInfo, Responder, ResponderConfig,
    ResponseWriter, TaxonomyError, definitions, taxonomy_err, wrap,
};

/// Writer that records what the runtime would have sent.
#[derive(Default)]
struct RecordingWriter {
    sent: Vec<(u16, Value)>,
}

impl ResponseWriter for RecordingWriter {
    fn send_json(&mut self, status: u16, body: Value) {
        self.sent.push((status, body));
    }
}

fn production() -> Responder<RecentFailures> {
    Responder::new(
        ResponderConfig::new(Environment::Production).with_host("api-1"),
        RecentFailures::new(32, 1024),
    )
}

fn development() -> Responder<RecentFailures> {
    Responder::new(
        ResponderConfig::new(Environment::Development).with_host("dev-box"),
        RecentFailures::new(32, 1024),
    )
}

fn respond(responder: &Responder<RecentFailures>, failure: Failure) -> (u16, Value) {
    let mut writer = RecordingWriter::default();
    responder.respond(&failure, &RequestInfo::new("POST", "/api/orders"), &mut writer);
    assert_eq!(writer.sent.len(), 1, "exactly one response per failure");
    writer.sent.remove(0)
}

// ============================================================================
// ENVELOPES
// ============================================================================

#[test]
fn taxonomy_error_envelope_in_production() {
    let (status, body) = respond(
        &production(),
        Failure::from(taxonomy_err!(definitions::RECORD_NOT_FOUND, "Order {} not found", 17)),
    );
    assert_eq!(status, 404);
    assert_eq!(
        body,
        json!({
            "status": false,
            "statusCode": 404,
            "message": "Order 17 not found",
            "errorCode": "RECORD_NOT_FOUND",
        })
    );
}

#[test]
fn duplicate_key_envelope() {
    let (status, body) = respond(
        &production(),
        Failure::from(ErrorShape::duplicate_key([("email", "a@b.com")])),
    );
    assert_eq!(status, 409);
    assert_eq!(body["message"], "Duplicate entry: email: a@b.com already exists.");
    assert!(body.get("errorCode").is_none());
}

#[test]
fn connection_refused_contains_code() {
    let (status, body) = respond(
        &production(),
        Failure::from(io::Error::from(io::ErrorKind::ConnectionRefused)),
    );
    assert_eq!(status, 503);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("ECONNREFUSED")));
}

#[test]
fn opaque_failure_gets_generic_500() {
    let (status, body) = respond(&production(), Failure::from(ErrorShape::named("Error")));
    assert_eq!(status, 500);
    assert_eq!(body["message"], "Something went wrong. Please try again later.");
}

#[test]
fn fallback_below_400_still_reports_failure() {
    let (status, body) = respond(
        &production(),
        Failure::from(ErrorShape::named("Error").with_status_code(302).with_message("moved")),
    );
    assert_eq!(status, 302);
    assert_eq!(body["status"], false);
    assert_eq!(body["message"], "moved");
}

#[test]
fn runtime_kind_without_message_gets_generic_text() {
    let (status, body) = respond(&production(), Failure::from(ErrorShape::named("TypeError")));
    assert_eq!(status, 500);
    assert_eq!(
        body["message"],
        "Unexpected TypeError: Something went wrong. Please try again later."
    );
}

#[test]
fn development_discloses_name_and_stack() {
    let failure = Failure::from(
        ErrorShape::named("ReferenceError")
            .with_message("user is not defined")
            .with_trace("at handler (orders.rs:10)"),
    );
    let (status, body) = respond(&development(), failure);
    assert_eq!(status, 500);
    assert_eq!(body["message"], "Unexpected ReferenceError: user is not defined");
    assert_eq!(body["name"], "ReferenceError");
    assert_eq!(body["stack"], "at handler (orders.rs:10)");
}

#[test]
fn development_without_trace_omits_stack() {
    let (_, body) = respond(
        &development(),
        Failure::from(ErrorShape::named("Error").with_message("plain")),
    );
    assert_eq!(body["name"], "Error");
    assert!(body.get("stack").is_none());
}

#[test]
fn rehydrated_error_keeps_stable_code() {
    let typed = TaxonomyError::from_code(400, "SKU is required", Some("FIELD_REQUIRED"));
    let (status, body) = respond(&production(), Failure::from(typed));
    assert_eq!(status, 400);
    assert_eq!(body["errorCode"], "FIELD_REQUIRED");
    assert_eq!(body["message"], "SKU is required");
}

// ============================================================================
// LOGGING
// ============================================================================

#[test]
fn one_log_line_per_failure() {
    let responder = production();
    for _ in 0..3 {
        respond(&responder, Failure::from(ErrorShape::cast("id", "abc")));
    }
    let lines = responder.logger().get_all();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.status == 400 && l.path.as_ref() == "/api/orders"));
}

#[test]
fn shared_logger_across_responders() {
    let recent = RecentFailures::new(8, 256);
    let a = Responder::new(ResponderConfig::default(), recent.clone());
    let b = Responder::new(ResponderConfig::default(), recent.clone());

    respond(&a, Failure::from(ErrorShape::named("Error")));
    respond(&b, Failure::from(ErrorShape::named("Error")));
    assert_eq!(recent.len(), 2);
}

// ============================================================================
// ADAPTER
// ============================================================================

async fn create_order(payload: Value) -> Result<Value, TaxonomyError> {
    match payload.get("sku") {
        Some(_) => Ok(json!({"id": 1})),
        None => Err(taxonomy_err!(definitions::FIELD_REQUIRED, "sku is required")),
    }
}

async fn flaky_upstream(_: ()) -> Result<(), ErrorShape> {
    tokio::time::sleep(Duration::from_millis(5)).await;
    Err(ErrorShape::named("Error").outbound().with_message("upstream 503"))
}

async fn panics_after_await(_: ()) -> Result<(), ErrorShape> {
    tokio::time::sleep(Duration::from_millis(1)).await;
    panic!("worker exploded");
}

fn panics_immediately(_: ()) -> std::future::Ready<Result<(), ErrorShape>> {
    panic!("before future");
}

#[tokio::test]
async fn adapter_passes_success_through() {
    let guarded = wrap(create_order);
    let mut forwarded = 0;
    let out = guarded.call(json!({"sku": "A1"}), |_| forwarded += 1).await;
    assert_eq!(out, Some(json!({"id": 1})));
    assert_eq!(forwarded, 0);
}

#[tokio::test]
async fn adapter_forwards_err_to_responder() {
    let responder = production();
    let mut writer = RecordingWriter::default();
    let request = RequestInfo::new("POST", "/orders");

    let out = wrap(create_order)
        .call(json!({}), |failure| {
            responder.respond(&failure, &request, &mut writer);
        })
        .await;

    assert!(out.is_none());
    assert_eq!(writer.sent.len(), 1);
    assert_eq!(writer.sent[0].0, 400);
    assert_eq!(writer.sent[0].1["errorCode"], "FIELD_REQUIRED");
}

#[tokio::test]
async fn adapter_forwards_async_rejection_once() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let out = wrap(flaky_upstream)
        .call((), move |f| sink.lock().unwrap().push(f))
        .await;

    assert!(out.is_none());
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        taxon_errors::classify(&calls[0]).message,
        "External API/network request failed: upstream 503"
    );
}

#[tokio::test]
async fn adapter_forwards_panic_after_await_once() {
    let mut forwarded = Vec::new();
    let out = wrap(panics_after_await)
        .call((), |f| forwarded.push(f))
        .await;

    assert!(out.is_none());
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].kind(), "Panic");
    assert_eq!(forwarded[0].message(), Some("worker exploded"));
}

#[tokio::test]
async fn adapter_forwards_synchronous_panic_once() {
    let responder = production();
    let mut writer = RecordingWriter::default();
    let request = RequestInfo::new("GET", "/boom");

    let out = wrap(panics_immediately)
        .call((), |failure| responder.respond(&failure, &request, &mut writer))
        .await;

    assert!(out.is_none());
    assert_eq!(writer.sent.len(), 1);
    assert_eq!(writer.sent[0].0, 500);
    assert_eq!(writer.sent[0].1["message"], "before future");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_independent() {
    let responder = Arc::new(production());
    let mut handles = Vec::new();

    for i in 0..16u16 {
        let responder = Arc::clone(&responder);
        handles.push(tokio::spawn(async move {
            let failure = Failure::from(ErrorShape::named("Error").with_status_code(400 + i64::from(i % 4)));
            let envelope = responder.handle(&failure, &RequestInfo::new("GET", format!("/r/{i}")));
            (i, envelope.status_code)
        }));
    }

    for handle in handles {
        let (i, status) = handle.await.unwrap();
        assert_eq!(status, 400 + i % 4);
    }
    assert_eq!(responder.logger().len(), 16);
}
