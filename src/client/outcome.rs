use std::fmt;

use serde::Serialize;

/// Broad class of a failed daemon call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientErrorKind {
    /// Malformed base URL or missing credentials, nothing was sent
    Configuration,
    /// The daemon answered 401
    Authentication,
    /// The daemon answered 404
    NotFound,
    /// 5xx after the last attempt
    Server,
    /// Every attempt timed out
    Timeout,
    /// Every attempt failed below HTTP
    Network,
    /// 2xx with a body that is not JSON of the expected shape
    InvalidResponse,
    /// Any other non-2xx status
    Http,
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::NotFound => "not_found",
            Self::Server => "server",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::InvalidResponse => "invalid_response",
            Self::Http => "http",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientError {
    pub status: u16,
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            kind: ClientErrorKind::Configuration,
            message: message.into(),
        }
    }

    pub fn authentication() -> Self {
        Self {
            status: 401,
            kind: ClientErrorKind::Authentication,
            message: "authentication failed: check your daemon password".to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            kind: ClientErrorKind::NotFound,
            message: "endpoint not found: check your daemon version".to_string(),
        }
    }

    pub fn server(status: u16, body: &str) -> Self {
        Self {
            status,
            kind: ClientErrorKind::Server,
            message: format!("daemon server error ({}): {}", status, body),
        }
    }

    pub fn http(status: u16, body: &str) -> Self {
        Self {
            status,
            kind: ClientErrorKind::Http,
            message: format!("daemon request failed ({}): {}", status, body),
        }
    }

    pub fn timeout(attempts: u32) -> Self {
        Self {
            status: 503,
            kind: ClientErrorKind::Timeout,
            message: format!(
                "daemon did not respond in time after {} attempt(s)",
                attempts
            ),
        }
    }

    pub fn network(reason: &str, attempts: u32) -> Self {
        Self {
            status: 503,
            kind: ClientErrorKind::Network,
            message: format!(
                "unable to reach daemon after {} attempt(s): {}",
                attempts, reason
            ),
        }
    }

    pub fn invalid_response() -> Self {
        Self {
            status: 502,
            kind: ClientErrorKind::InvalidResponse,
            message: "invalid response format".to_string(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for ClientError {}

/// Uniform result of every outbound daemon call
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome<T> {
    Success { data: T, status: u16 },
    Failure(ClientError),
}

impl<T> RequestOutcome<T> {
    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } => *status,
            Self::Failure(err) => err.status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(err) => Some(err),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error().map(|err| err.message.as_str())
    }

    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure(err) => Err(err),
        }
    }

    pub fn ok(self) -> Option<T> {
        self.into_result().ok()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestOutcome<U> {
        match self {
            Self::Success { data, status } => RequestOutcome::Success {
                data: f(data),
                status,
            },
            Self::Failure(err) => RequestOutcome::Failure(err),
        }
    }
}
