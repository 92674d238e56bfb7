use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Extension, Router};
use tower::ServiceExt;
use tracing_test::traced_test;

use crate::observability::correlation::{
    request_id_middleware, validate_correlation_id, RequestContext, CORRELATION_ID_HEADER,
    MAX_CORRELATION_ID_LENGTH, REQUEST_ID_HEADER,
};

async fn echo_context(Extension(context): Extension<RequestContext>) -> String {
    context.correlation_id
}

fn app() -> Router {
    Router::new()
        .route("/test", get(echo_context))
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn test_client_correlation_id_is_propagated() {
    let request = Request::builder()
        .uri("/test")
        .header(CORRELATION_ID_HEADER, "test-correlation-123")
        .body(Body::empty())
        .expect("Failed to build test request");

    let response = app().oneshot(request).await.expect("request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CORRELATION_ID_HEADER).expect("header"),
        "test-correlation-123"
    );
    assert!(response.headers().get(REQUEST_ID_HEADER).is_some());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&body[..], b"test-correlation-123");
}

#[tokio::test]
async fn test_ids_are_generated_when_missing() {
    let request = Request::builder()
        .uri("/test")
        .body(Body::empty())
        .expect("Failed to build test request");

    let response = app().oneshot(request).await.expect("request failed");

    let correlation = response
        .headers()
        .get(CORRELATION_ID_HEADER)
        .expect("Correlation ID should be generated");
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("Request ID should be generated");
    assert_ne!(correlation, request_id);
}

#[tokio::test]
#[traced_test]
async fn test_invalid_correlation_id_is_rejected() {
    let request = Request::builder()
        .uri("/test")
        .header(CORRELATION_ID_HEADER, "bad id;drop")
        .body(Body::empty())
        .expect("Failed to build test request");

    let response = app().oneshot(request).await.expect("request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(logs_contain("Invalid correlation ID rejected"));
}

#[test]
fn test_validate_correlation_id() {
    assert!(validate_correlation_id("abc-123_DEF").is_ok());
    assert!(validate_correlation_id("").is_err());
    assert!(validate_correlation_id(&"a".repeat(MAX_CORRELATION_ID_LENGTH + 1)).is_err());
    assert!(validate_correlation_id("has space").is_err());
}
