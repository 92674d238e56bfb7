//! Retrying HTTP client for the fedimint client daemon (fmcd).
//!
//! Every call goes through [`FmcdClient::request_with_policy`], which never
//! fails across its boundary: transport problems, HTTP errors and malformed
//! bodies all come back as a [`RequestOutcome`].

pub mod api;
#[cfg(test)]
pub(crate) mod mock;
mod outcome;
pub mod retry;
pub mod transport;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use base64::Engine;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

pub use outcome::{ClientError, ClientErrorKind, RequestOutcome};
pub use retry::{RetryPolicy, RetryState};
pub use transport::{
    HttpRequest, HttpResponse, ReqwestTransport, Sleeper, TokioSleeper, Transport, TransportError,
};

use crate::metrics;


/// Fixed Basic auth username expected by fmcd
pub const DAEMON_USERNAME: &str = "fmcd";

/// Connection settings for one team's daemon
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DaemonConfig {
    pub base_url: String,
    pub password: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

impl fmt::Debug for DaemonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonConfig")
            .field("base_url", &self.base_url)
            .field("password", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .finish()
    }
}

impl DaemonConfig {
    pub fn new(base_url: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            password: password.into(),
            is_active: true,
        }
    }

    /// Copy of this config with its base URL normalized; fails on a
    /// malformed URL or an empty password
    pub fn normalized(&self) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: validate_config(self)?,
            password: self.password.clone(),
            is_active: self.is_active,
        })
    }
}

fn default_is_active() -> bool {
    true
}

/// Validate a daemon base URL and strip trailing slashes.
///
/// The URL must use the `http` or `https` scheme and carry a host. The
/// result never ends with `/`, so normalizing twice yields the same string.
pub fn normalize_base_url(base_url: &str) -> Result<String, ClientError> {
    let trimmed = base_url.trim();

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ClientError::configuration(format!(
            "invalid daemon URL '{}': must start with http:// or https://",
            trimmed
        )));
    }

    let normalized = trimmed.trim_end_matches('/');

    let parsed = url::Url::parse(normalized).map_err(|e| {
        ClientError::configuration(format!("invalid daemon URL '{}': {}", trimmed, e))
    })?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ClientError::configuration(format!(
            "invalid daemon URL '{}': missing host",
            trimmed
        )));
    }

    Ok(normalized.to_string())
}

/// Normalized base URL of a config that can be sent, nothing is sent otherwise
fn validate_config(auth: &DaemonConfig) -> Result<String, ClientError> {
    let base_url = normalize_base_url(&auth.base_url)?;
    if auth.password.is_empty() {
        return Err(ClientError::configuration("missing daemon password"));
    }
    Ok(base_url)
}

/// `Authorization` header value for the daemon's Basic auth
pub fn basic_auth_header(password: &str) -> String {
    let credentials = format!("{}:{}", DAEMON_USERNAME, password);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}

/// Join a normalized base URL and an endpoint path
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        format!("{}{}", base_url, endpoint)
    } else {
        format!("{}/{}", base_url, endpoint)
    }
}

#[derive(Clone)]
pub struct FmcdClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl fmt::Debug for FmcdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FmcdClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl FmcdClient {
    /// Client backed by reqwest and tokio timers
    pub fn new(policy: RetryPolicy) -> anyhow::Result<Self> {
        Ok(Self::with_transport(
            Arc::new(ReqwestTransport::new()?),
            Arc::new(TokioSleeper),
            policy,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Perform a request with the client's default retry policy
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
        auth: &DaemonConfig,
    ) -> RequestOutcome<T> {
        let policy = self.policy.clone();
        self.request_with_policy(endpoint, method, body, auth, &policy)
            .await
    }

    /// Perform one logical request, retrying transient failures per `policy`
    pub async fn request_with_policy<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
        auth: &DaemonConfig,
        policy: &RetryPolicy,
    ) -> RequestOutcome<T> {
        let started = Instant::now();

        let base_url = match validate_config(auth) {
            Ok(base_url) => base_url,
            Err(err) => {
                warn!(
                    endpoint = %endpoint,
                    error = %err,
                    "Rejected daemon request with invalid configuration"
                );
                metrics::record_client_request(endpoint, &err.kind.to_string(), started.elapsed());
                return RequestOutcome::Failure(err);
            }
        };

        let request = HttpRequest {
            method,
            url: endpoint_url(&base_url, endpoint),
            authorization: basic_auth_header(&auth.password),
            body,
        };

        let mut state = RetryState::Attempting { attempt: 0 };
        let outcome = loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    let timeout = policy.attempt_timeout(attempt);
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts(),
                        timeout_ms = timeout.as_millis() as u64,
                        "Sending daemon request"
                    );
                    let result = self.transport.send(&request, timeout).await;
                    policy.next_state(attempt, result)
                }
                RetryState::Backoff {
                    attempt,
                    delay,
                    reason,
                } => {
                    warn!(
                        url = %request.url,
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "Daemon request failed, backing off before retry"
                    );
                    metrics::record_client_retry(endpoint);
                    self.sleeper.sleep(delay).await;
                    RetryState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                RetryState::Success(response) => break parse_response(response),
                RetryState::TerminalFailure(err) => break RequestOutcome::Failure(err),
            };
        };

        match &outcome {
            RequestOutcome::Success { status, .. } => {
                debug!(url = %request.url, status = status, "Daemon request succeeded");
                metrics::record_client_request(endpoint, "success", started.elapsed());
            }
            RequestOutcome::Failure(err) => {
                warn!(
                    url = %request.url,
                    status = err.status,
                    kind = %err.kind,
                    error = %err.message,
                    "Daemon request failed"
                );
                metrics::record_client_request(endpoint, &err.kind.to_string(), started.elapsed());
            }
        }

        outcome
    }
}

fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> RequestOutcome<T> {
    match serde_json::from_str::<T>(&response.body) {
        Ok(data) => RequestOutcome::Success {
            data,
            status: response.status,
        },
        Err(e) => {
            debug!(error = %e, "Daemon response body is not valid JSON");
            RequestOutcome::Failure(ClientError::invalid_response())
        }
    }
}
