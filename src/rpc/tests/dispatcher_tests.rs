//! Tests for method dispatch.

use crate::rpc::{
    codec,
    dispatcher::{Dispatcher, HandlerError, MethodHandler, NoParams, typed},
    domain::{ErrorCode, RequestId, RpcRequest},
};
use async_trait::async_trait;
use rstest::{fixture, rstest};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Handler counting its invocations and echoing params back.
#[derive(Default)]
struct CountingEcho {
    calls: AtomicUsize,
}

#[async_trait]
impl MethodHandler for CountingEcho {
    async fn call(&self, params: Value) -> Result<Value, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(params)
    }
}

#[derive(Debug, Deserialize)]
struct DivideParams {
    numerator: i64,
    denominator: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("secret internal detail")]
struct LeakyFailure;

struct Harness {
    dispatcher: Dispatcher,
    echo: Arc<CountingEcho>,
}

#[fixture]
fn harness() -> Harness {
    let echo = Arc::new(CountingEcho::default());
    let dispatcher = Dispatcher::builder("test_agent")
        .bind("echo", echo.clone())
        .bind(
            "divide",
            typed(|params: DivideParams| async move {
                if params.denominator == 0 {
                    return Err(HandlerError::InvalidParams(
                        "denominator must not be zero".to_owned(),
                    ));
                }
                Ok(json!({ "quotient": params.numerator / params.denominator }))
            }),
        )
        .bind(
            "explode",
            typed(|_: NoParams| async move {
                Err::<Value, _>(HandlerError::internal(LeakyFailure))
            }),
        )
        .bind(
            "lookup",
            typed(|_: NoParams| async move {
                Err::<Value, _>(HandlerError::application(
                    ErrorCode::NotFound,
                    "thing not found",
                ))
            }),
        )
        .build();
    Harness { dispatcher, echo }
}

fn request(raw: &str) -> RpcRequest {
    codec::decode(raw.as_bytes()).expect("valid envelope")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn echo_round_trips_params(harness: Harness) {
    let response = harness
        .dispatcher
        .dispatch(request(
            r#"{"jsonrpc":"2.0","method":"echo","params":{"x":1},"id":7}"#,
        ))
        .await
        .expect("response for request with id");

    let encoded: Value = serde_json::from_slice(&codec::encode(&response)).expect("json");
    assert_eq!(encoded, json!({"jsonrpc": "2.0", "result": {"x": 1}, "id": 7}));
}

#[rstest]
#[case("missing")]
#[case("ECHO")]
#[case("echo ")]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_method_returns_method_not_found_without_invoking_handlers(
    harness: Harness,
    #[case] method: &str,
) {
    let response = harness
        .dispatcher
        .dispatch(RpcRequest::new(method, json!({}), RequestId::from(1_i64)))
        .await
        .expect("response");

    let error = response.error().expect("error response");
    assert_eq!(error.code, -32601);
    assert!(error.message.contains(method));
    assert_eq!(harness.echo.calls.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn typed_params_mismatch_is_invalid_params(harness: Harness) {
    let response = harness
        .dispatcher
        .dispatch(request(
            r#"{"jsonrpc":"2.0","method":"divide","params":{"numerator":"ten"},"id":2}"#,
        ))
        .await
        .expect("response");

    assert!(response.error().expect("error").is(ErrorCode::InvalidParams));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handler_validation_failure_is_invalid_params(harness: Harness) {
    let response = harness
        .dispatcher
        .dispatch(request(
            r#"{"jsonrpc":"2.0","method":"divide","params":{"numerator":1,"denominator":0},"id":3}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.error().expect("error").code, -32602);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn typed_handler_returns_serialised_output(harness: Harness) {
    let response = harness
        .dispatcher
        .dispatch(request(
            r#"{"jsonrpc":"2.0","method":"divide","params":{"numerator":9,"denominator":3},"id":"d"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.id, Some(RequestId::from("d")));
    assert_eq!(response.into_result().expect("success"), json!({"quotient": 3}));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn internal_failure_hides_cause(harness: Harness) {
    let response = harness
        .dispatcher
        .dispatch(RpcRequest::new("explode", json!({}), RequestId::from(4_i64)))
        .await
        .expect("response");

    let error = response.error().expect("error");
    assert_eq!(error.code, -32603);
    assert_eq!(error.message, "Internal error");
    assert!(error.data.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn application_failure_keeps_its_code(harness: Harness) {
    let response = harness
        .dispatcher
        .dispatch(RpcRequest::new("lookup", json!({}), RequestId::from(5_i64)))
        .await
        .expect("response");

    let error = response.error().expect("error");
    assert!(error.is(ErrorCode::NotFound));
    assert_eq!(error.message, "thing not found");
}

#[rstest]
#[case("echo")]
#[case("explode")]
#[case("missing")]
#[tokio::test(flavor = "multi_thread")]
async fn notifications_never_produce_a_response(harness: Harness, #[case] method: &str) {
    let response = harness
        .dispatcher
        .dispatch(RpcRequest::notification(method, json!({})))
        .await;

    assert!(response.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notification_still_invokes_handler(harness: Harness) {
    harness
        .dispatcher
        .dispatch(RpcRequest::notification("echo", json!({"x": 1})))
        .await;

    assert_eq!(harness.echo.calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn methods_are_listed_in_sorted_order(harness: Harness) {
    let methods: Vec<&str> = harness.dispatcher.methods().collect();
    assert_eq!(methods, vec!["divide", "echo", "explode", "lookup"]);
    assert!(harness.dispatcher.handles("echo"));
    assert!(!harness.dispatcher.handles("missing"));
}
