use std::time::Duration;

use super::outcome::ClientError;
use super::transport::{HttpResponse, TransportError};

/// Retry behaviour for a single logical daemon request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Deadline of the first attempt
    pub base_timeout: Duration,
    /// Added to the deadline on every further attempt
    pub timeout_step: Duration,
    /// Backoff before the second attempt, doubled after each failure
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_timeout: Duration::from_millis(10_000),
            timeout_step: Duration::from_millis(5_000),
            base_delay: Duration::from_millis(1_000),
        }
    }
}

/// Where a request stands between attempts
#[derive(Debug, Clone, PartialEq)]
pub enum RetryState {
    Attempting {
        attempt: u32,
    },
    Backoff {
        attempt: u32,
        delay: Duration,
        reason: String,
    },
    Success(HttpResponse),
    TerminalFailure(ClientError),
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_timeout: Duration) -> Self {
        Self {
            max_attempts,
            base_timeout,
            ..Default::default()
        }
    }

    /// Same timeouts, exactly one attempt. Used for calls that move funds.
    pub fn single_attempt(&self) -> Self {
        Self {
            max_attempts: 1,
            ..self.clone()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Deadline of the zero-based `attempt`
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        self.base_timeout
            .saturating_add(self.timeout_step.saturating_mul(attempt))
    }

    /// Delay after the zero-based `attempt` failed
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Classify the result of the zero-based `attempt` into the next state
    pub fn next_state(
        &self,
        attempt: u32,
        result: Result<HttpResponse, TransportError>,
    ) -> RetryState {
        let attempts_made = attempt + 1;
        let is_last = attempts_made >= self.max_attempts();

        match result {
            Ok(response) => match response.status {
                200..=299 => RetryState::Success(response),
                401 => RetryState::TerminalFailure(ClientError::authentication()),
                404 => RetryState::TerminalFailure(ClientError::not_found()),
                500..=599 if !is_last => RetryState::Backoff {
                    attempt,
                    delay: self.backoff_delay(attempt),
                    reason: format!("server error {}", response.status),
                },
                500..=599 => RetryState::TerminalFailure(ClientError::server(
                    response.status,
                    &response.body,
                )),
                status => RetryState::TerminalFailure(ClientError::http(status, &response.body)),
            },
            Err(err) if !is_last => RetryState::Backoff {
                attempt,
                delay: self.backoff_delay(attempt),
                reason: err.to_string(),
            },
            Err(TransportError::Timeout) => {
                RetryState::TerminalFailure(ClientError::timeout(attempts_made))
            }
            Err(TransportError::Network(reason)) => {
                RetryState::TerminalFailure(ClientError::network(&reason, attempts_made))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientErrorKind;

    fn response(status: u16) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status,
            body: "body".to_string(),
        })
    }

    #[test]
    fn test_retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_timeout, Duration::from_millis(10_000));
        assert_eq!(policy.timeout_step, Duration::from_millis(5_000));
        assert_eq!(policy.base_delay, Duration::from_millis(1_000));
    }

    #[test]
    fn test_timeout_escalates_per_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(2_000));
        assert_eq!(policy.attempt_timeout(0), Duration::from_millis(2_000));
        assert_eq!(policy.attempt_timeout(1), Duration::from_millis(7_000));
        assert_eq!(policy.attempt_timeout(2), Duration::from_millis(12_000));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(1_000));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(2_000));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(4_000));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(64), Duration::from_millis(1_000) * u32::MAX);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 1);
        match policy.next_state(0, response(503)) {
            RetryState::TerminalFailure(err) => assert_eq!(err.status, 503),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_success_statuses() {
        let policy = RetryPolicy::default();
        assert!(matches!(
            policy.next_state(0, response(200)),
            RetryState::Success(_)
        ));
        assert!(matches!(
            policy.next_state(2, response(204)),
            RetryState::Success(_)
        ));
    }

    #[test]
    fn test_auth_and_not_found_are_terminal() {
        let policy = RetryPolicy::default();
        match policy.next_state(0, response(401)) {
            RetryState::TerminalFailure(err) => {
                assert_eq!(err.kind, ClientErrorKind::Authentication);
                assert_eq!(err.status, 401);
            }
            other => panic!("unexpected state {:?}", other),
        }
        match policy.next_state(0, response(404)) {
            RetryState::TerminalFailure(err) => {
                assert_eq!(err.kind, ClientErrorKind::NotFound);
                assert_eq!(err.status, 404);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_server_error_backs_off_until_last_attempt() {
        let policy = RetryPolicy::default();
        match policy.next_state(1, response(502)) {
            RetryState::Backoff { attempt, delay, .. } => {
                assert_eq!(attempt, 1);
                assert_eq!(delay, Duration::from_millis(2_000));
            }
            other => panic!("unexpected state {:?}", other),
        }
        match policy.next_state(2, response(502)) {
            RetryState::TerminalFailure(err) => {
                assert_eq!(err.kind, ClientErrorKind::Server);
                assert_eq!(err.status, 502);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_other_client_errors_are_terminal_with_body() {
        let policy = RetryPolicy::default();
        match policy.next_state(0, response(422)) {
            RetryState::TerminalFailure(err) => {
                assert_eq!(err.kind, ClientErrorKind::Http);
                assert_eq!(err.status, 422);
                assert!(err.message.contains("body"));
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_transport_errors_exhaust_to_503() {
        let policy = RetryPolicy::default();
        assert!(matches!(
            policy.next_state(0, Err(TransportError::Timeout)),
            RetryState::Backoff { .. }
        ));

        match policy.next_state(2, Err(TransportError::Timeout)) {
            RetryState::TerminalFailure(err) => {
                assert_eq!(err.status, 503);
                assert_eq!(err.kind, ClientErrorKind::Timeout);
            }
            other => panic!("unexpected state {:?}", other),
        }

        match policy.next_state(2, Err(TransportError::Network("refused".to_string()))) {
            RetryState::TerminalFailure(err) => {
                assert_eq!(err.status, 503);
                assert_eq!(err.kind, ClientErrorKind::Network);
                assert!(err.message.contains("refused"));
            }
            other => panic!("unexpected state {:?}", other),
        }
    }
}
