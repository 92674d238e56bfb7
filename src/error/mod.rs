use std::fmt;

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

pub mod categories;

pub use categories::ErrorCategory;

use crate::client::{ClientError, ClientErrorKind};
use crate::observability::correlation::RequestContext;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub request_context: Option<RequestContext>,
}

impl AppError {
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.request_context = Some(context);
        self
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::ValidationError, message)
    }

    pub fn authentication_error(message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::AuthenticationError, message)
    }

    pub fn authorization_error(message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::AuthorizationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::NotFound, message)
    }

    pub fn not_configured(team_id: &str) -> Self {
        Self::with_category(
            ErrorCategory::DaemonNotConfigured,
            format!("No active daemon connection configured for team {}", team_id),
        )
    }

    pub fn store_error(message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::StoreError, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::InternalError, message)
    }

    pub fn with_category(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            details: None,
            source: None,
            request_context: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.category.status_code();

        if status.is_server_error() {
            error!(
                category = ?self.category,
                code = self.category.error_code(),
                message = %self.message,
                details = ?self.details,
                source = ?self.source,
                correlation_id = self.request_context.as_ref().map(|c| &c.correlation_id),
                request_id = self.request_context.as_ref().map(|c| &c.request_id),
                "Server error"
            );
        } else if status.is_client_error() {
            warn!(
                category = ?self.category,
                code = self.category.error_code(),
                message = %self.message,
                details = ?self.details,
                correlation_id = self.request_context.as_ref().map(|c| &c.correlation_id),
                request_id = self.request_context.as_ref().map(|c| &c.request_id),
                "Client error"
            );
        }

        let body = json!({
            "error": {
                "code": self.category.error_code(),
                "message": self.message,
                "details": self.details,
                "correlation_id": self.request_context.as_ref().map(|c| &c.correlation_id),
                "request_id": self.request_context.as_ref().map(|c| &c.request_id),
            }
        });

        (status, Json(body)).into_response()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let category = match err.kind {
            ClientErrorKind::Configuration => ErrorCategory::InvalidDaemonConfig,
            ClientErrorKind::Authentication => ErrorCategory::DaemonAuthenticationFailed,
            ClientErrorKind::NotFound => ErrorCategory::DaemonEndpointNotFound,
            ClientErrorKind::Server | ClientErrorKind::Network => ErrorCategory::DaemonUnavailable,
            ClientErrorKind::Timeout => ErrorCategory::DaemonTimeout,
            ClientErrorKind::InvalidResponse => ErrorCategory::InvalidDaemonResponse,
            ClientErrorKind::Http => ErrorCategory::DaemonError,
        };

        Self::with_category(category, err.message.clone())
            .with_details(json!({ "daemon_status": err.status, "kind": err.kind }))
            .with_source(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_error(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation_error(format!("JSON parsing error: {}", err)).with_source(err)
    }
}
