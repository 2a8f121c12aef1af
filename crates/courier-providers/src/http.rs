use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;

use courier_core::{Error, HttpMethod, Result, Transport, TransportRequest, TransportResponse};

/// HTTP transport backed by a shared reqwest client.
///
/// Carries JSON bodies and whatever headers the dispatcher resolved
/// (including `Authorization: Bearer ...`); the per-call deadline is applied
/// as a per-request timeout.
#[derive(Clone, Default)]
pub struct HttpTransport {
    /// Shared HTTP client; reqwest clients are cheap to clone.
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::default(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.endpoint),
            HttpMethod::Post => self.client.post(&request.endpoint),
        };

        builder = builder.timeout(Duration::from_millis(request.timeout_ms));

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|error| {
            if error.is_timeout() {
                Error::Timeout(request.timeout_ms)
            } else {
                Error::Transport(format!("request to {} failed: {error}", request.endpoint))
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|error| Error::Transport(format!("failed to read response body: {error}")))?;

        // Health endpoints are allowed to answer with plain text.
        let body = serde_json::from_str(&text).unwrap_or(JsonValue::String(text));

        Ok(TransportResponse { status, body })
    }
}
