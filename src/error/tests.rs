#![allow(clippy::unwrap_used)]

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

use super::*;

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_client_error_mapping() {
    let cases = [
        (ClientError::authentication(), ErrorCategory::DaemonAuthenticationFailed),
        (ClientError::not_found(), ErrorCategory::DaemonEndpointNotFound),
        (ClientError::invalid_response(), ErrorCategory::InvalidDaemonResponse),
        (ClientError::timeout(3), ErrorCategory::DaemonTimeout),
        (
            ClientError::configuration("invalid daemon URL"),
            ErrorCategory::InvalidDaemonConfig,
        ),
        (
            ClientError::http(418, "teapot"),
            ErrorCategory::DaemonError,
        ),
    ];

    for (client_error, category) in cases {
        let app_error = AppError::from(client_error.clone());
        assert_eq!(app_error.category, category);
        assert_eq!(app_error.message, client_error.message);
        assert_eq!(app_error.details.unwrap()["daemon_status"], client_error.status);
    }
}

#[test]
fn test_app_error_display() {
    let error = AppError::not_found("Team ops not found");
    assert_eq!(format!("{}", error), "NOT_FOUND: Team ops not found");
}

#[test]
fn test_app_error_from_anyhow() {
    let error = AppError::from(anyhow::anyhow!("disk full"));
    assert_eq!(error.category, ErrorCategory::InternalError);
}

#[tokio::test]
async fn test_into_response_body() {
    let context = RequestContext::new(Some("corr-1".to_string()));
    let response = AppError::not_configured("ops")
        .with_context(context.clone())
        .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "DAEMON_NOT_CONFIGURED");
    assert_eq!(body["error"]["correlation_id"], "corr-1");
    assert_eq!(body["error"]["request_id"], context.request_id);
}
