use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::Result;

/// HTTP-ish method for a transport request.
///
/// Providers are invoked with `Post`; health checks use `Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// Read-only request (health checks).
    Get,
    /// Payload-carrying request (provider invocation).
    #[default]
    Post,
}

/// One outbound provider call as seen by a transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute endpoint URL.
    pub endpoint: String,
    /// Header name/value pairs (already includes auth when resolved).
    pub headers: Vec<(String, String)>,
    /// JSON body; `None` for bodiless requests.
    pub body: Option<JsonValue>,
    /// Per-call deadline in milliseconds.
    pub timeout_ms: u64,
}

impl TransportRequest {
    /// Creates a `Post` request with the given endpoint and body.
    #[must_use]
    pub fn post(endpoint: impl Into<String>, body: JsonValue, timeout_ms: u64) -> Self {
        Self {
            method: HttpMethod::Post,
            endpoint: endpoint.into(),
            headers: Vec::new(),
            body: Some(body),
            timeout_ms,
        }
    }

    /// Creates a bodiless `Get` request.
    #[must_use]
    pub fn get(endpoint: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            method: HttpMethod::Get,
            endpoint: endpoint.into(),
            headers: Vec::new(),
            body: None,
            timeout_ms,
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response returned by a transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, parsed as JSON where possible.
    pub body: JsonValue,
}

impl TransportResponse {
    /// Whether the status code is in the success range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for the wire-level collaborator that carries provider calls.
///
/// Implementations must support bearer-token auth headers and JSON bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the transport's identifier for logs.
    fn name(&self) -> &'static str;

    /// Sends one request and returns the provider's response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be delivered or times out at
    /// the transport layer. Non-success HTTP statuses are *not* errors here;
    /// callers inspect [`TransportResponse::status`].
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse>;
}

/// Kind of dispatch event reported to the observability sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEventKind {
    /// A single attempt failed at the transport layer.
    TransportFailure,
    /// A single attempt exceeded its deadline.
    Timeout,
    /// Both attempts failed; the task settled as a failure.
    FallbackExhausted,
}

/// One failure event on the dispatch path.
#[derive(Debug, Clone)]
pub struct DispatchEvent {
    /// Event kind.
    pub kind: DispatchEventKind,
    /// Provider involved in the failing attempt.
    pub service_id: String,
    /// Human-readable failure description.
    pub message: String,
    /// Attempt number the event belongs to.
    pub attempt: u8,
}

/// Fire-and-forget observability collaborator.
///
/// `record` must never block or fail; the dispatch path calls it inline.
pub trait ObservabilitySink: Send + Sync {
    /// Records one dispatch event.
    fn record(&self, event: DispatchEvent);
}
