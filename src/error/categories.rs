use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    // Client errors
    ValidationError,
    AuthenticationError,
    AuthorizationError,
    NotFound,

    // Team configuration errors
    DaemonNotConfigured,
    InvalidDaemonConfig,

    // Daemon errors
    DaemonAuthenticationFailed,
    DaemonEndpointNotFound,
    DaemonUnavailable,
    DaemonTimeout,
    InvalidDaemonResponse,
    DaemonError,

    // System errors
    StoreError,
    InternalError,
}

impl ErrorCategory {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError | Self::DaemonNotConfigured | Self::InvalidDaemonConfig => {
                StatusCode::BAD_REQUEST
            }
            Self::AuthenticationError => StatusCode::UNAUTHORIZED,
            Self::AuthorizationError => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::DaemonAuthenticationFailed
            | Self::DaemonEndpointNotFound
            | Self::InvalidDaemonResponse
            | Self::DaemonError => StatusCode::BAD_GATEWAY,
            Self::DaemonUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::DaemonTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::StoreError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::AuthenticationError => "AUTH_FAILED",
            Self::AuthorizationError => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::DaemonNotConfigured => "DAEMON_NOT_CONFIGURED",
            Self::InvalidDaemonConfig => "INVALID_DAEMON_CONFIG",
            Self::DaemonAuthenticationFailed => "DAEMON_AUTH_FAILED",
            Self::DaemonEndpointNotFound => "DAEMON_ENDPOINT_NOT_FOUND",
            Self::DaemonUnavailable => "DAEMON_UNAVAILABLE",
            Self::DaemonTimeout => "DAEMON_TIMEOUT",
            Self::InvalidDaemonResponse => "INVALID_DAEMON_RESPONSE",
            Self::DaemonError => "DAEMON_ERROR",
            Self::StoreError => "STORE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError
                | Self::AuthenticationError
                | Self::AuthorizationError
                | Self::NotFound
                | Self::DaemonNotConfigured
                | Self::InvalidDaemonConfig
        )
    }

    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error_code())
    }
}
