//! Mock transport for testing dispatch flows.
//!
//! Allows scripting per-endpoint behaviors (responses, failures, delays),
//! enabling end-to-end testing of routing and fallback without a network.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};
use tokio::time::sleep;

use courier_core::{Error, IgnoreLock as _, Result, Transport, TransportRequest, TransportResponse};

/// Scripted behavior for endpoints matching a pattern.
#[derive(Clone)]
enum Behavior {
    /// Answer with the given status and body.
    Respond {
        /// HTTP status to return.
        status: u16,
        /// Body to return.
        body: JsonValue,
    },
    /// Fail at the transport layer.
    Fail {
        /// Failure message.
        message: String,
    },
    /// Sleep before answering; lets callers exercise attempt deadlines.
    Delay {
        /// How long to sleep.
        delay_ms: u64,
        /// Body returned after the delay.
        body: JsonValue,
    },
}

/// One pattern/behavior pair; first matching pattern wins.
#[derive(Clone)]
struct Script {
    /// Substring matched against the request endpoint.
    pattern: String,
    /// Behavior for matching requests.
    behavior: Behavior,
}

/// Mock transport that replays scripted behaviors and records every call.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Ordered behavior scripts.
    scripts: Arc<Mutex<Vec<Script>>>,
    /// Endpoints of every request seen, in call order.
    history: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    /// Creates a mock transport with no scripts; every call echoes its body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a 200 response for endpoints containing `pattern`.
    #[must_use]
    pub fn with_response(self, pattern: impl Into<String>, body: JsonValue) -> Self {
        self.push_script(pattern.into(), Behavior::Respond { status: 200, body });
        self
    }

    /// Scripts an arbitrary status for endpoints containing `pattern`.
    #[must_use]
    pub fn with_status(self, pattern: impl Into<String>, status: u16, body: JsonValue) -> Self {
        self.push_script(pattern.into(), Behavior::Respond { status, body });
        self
    }

    /// Scripts a transport-layer failure for endpoints containing `pattern`.
    #[must_use]
    pub fn with_failure(self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.push_script(
            pattern.into(),
            Behavior::Fail {
                message: message.into(),
            },
        );
        self
    }

    /// Scripts a delayed 200 response for endpoints containing `pattern`.
    #[must_use]
    pub fn with_delay(self, pattern: impl Into<String>, delay_ms: u64, body: JsonValue) -> Self {
        self.push_script(pattern.into(), Behavior::Delay { delay_ms, body });
        self
    }

    /// Returns the endpoints of all calls made, in order.
    #[must_use]
    pub fn call_history(&self) -> Vec<String> {
        self.history.lock_ignore_poison().clone()
    }

    /// Returns the total number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.history.lock_ignore_poison().len()
    }

    /// Returns the number of calls whose endpoint contains `pattern`.
    #[must_use]
    pub fn calls_to(&self, pattern: &str) -> usize {
        self.history
            .lock_ignore_poison()
            .iter()
            .filter(|endpoint| endpoint.contains(pattern))
            .count()
    }

    /// Clears the call history.
    pub fn clear_history(&self) {
        self.history.lock_ignore_poison().clear();
    }

    fn push_script(&self, pattern: String, behavior: Behavior) {
        self.scripts
            .lock_ignore_poison()
            .push(Script { pattern, behavior });
    }

    fn find_behavior(&self, endpoint: &str) -> Option<Behavior> {
        let scripts = self.scripts.lock_ignore_poison();
        scripts
            .iter()
            .find(|script| endpoint.contains(&script.pattern))
            .map(|script| script.behavior.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse> {
        self.history
            .lock_ignore_poison()
            .push(request.endpoint.clone());

        match self.find_behavior(&request.endpoint) {
            Some(Behavior::Respond { status, body }) => Ok(TransportResponse { status, body }),
            Some(Behavior::Fail { message }) => Err(Error::Transport(message)),
            Some(Behavior::Delay { delay_ms, body }) => {
                sleep(Duration::from_millis(delay_ms)).await;
                Ok(TransportResponse { status: 200, body })
            }
            None => Ok(TransportResponse {
                status: 200,
                body: json!({ "echo": request.body }),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_response_wins_over_echo() {
        let transport = MockTransport::new().with_response("svc-a", json!({"answer": 42}));

        let request = TransportRequest::post("https://svc-a.test/v1", json!({}), 100);
        let response = match transport.send(&request).await {
            Ok(response) => response,
            Err(error) => panic!("send failed: {error}"),
        };

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({"answer": 42}));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let transport = MockTransport::new().with_failure("svc-b", "connection reset");

        let request = TransportRequest::post("https://svc-b.test/v1", json!({}), 100);
        let error = match transport.send(&request).await {
            Ok(response) => panic!("expected failure, got status {}", response.status),
            Err(error) => error,
        };

        assert!(error.is_retryable());
        assert_eq!(transport.calls_to("svc-b"), 1);
    }

    #[tokio::test]
    async fn test_first_matching_script_wins() {
        let transport = MockTransport::new()
            .with_failure("svc", "broad pattern")
            .with_response("svc-c", json!({"never": true}));

        let request = TransportRequest::post("https://svc-c.test/v1", json!({}), 100);
        transport.send(&request).await.unwrap_err();
    }

    #[tokio::test]
    async fn test_history_records_order() {
        let transport = MockTransport::new();

        let first = TransportRequest::post("https://one.test/v1", json!({}), 100);
        let second = TransportRequest::post("https://two.test/v1", json!({}), 100);
        assert!(transport.send(&first).await.is_ok(), "first send failed");
        assert!(transport.send(&second).await.is_ok(), "second send failed");

        let history = transport.call_history();
        assert_eq!(history.len(), 2);
        assert!(history[0].contains("one.test"));
        assert!(history[1].contains("two.test"));

        transport.clear_history();
        assert_eq!(transport.call_count(), 0);
    }
}
