//! Two-attempt provider dispatch with timeout and default-service fallback.
//!
//! The retry-exactly-once contract lives in the control flow here: attempt 1
//! targets the requested provider; a transport failure or timeout triggers
//! exactly one fallback attempt against the configured default provider, and
//! a second failure settles the task as `ExhaustedFallback`. Retries are
//! sequential, never speculative.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::time::timeout;

use courier_core::{
    DispatchEvent, DispatchEventKind, DispatchOutcome, Error as CoreError, FailureKind,
    ObservabilitySink, Transport, TransportRequest,
};

use crate::error::{Result, RouteError};
use crate::registry::{RegistryStore, ServiceDescriptor};

/// Lifecycle of a single dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Attempt created, not yet sent.
    Pending,
    /// Request handed to the transport.
    InFlight,
    /// Provider answered with a success status.
    Succeeded,
    /// Transport failure, timeout, or non-success status.
    Failed,
}

/// Terminal result of one attempt.
enum AttemptResult {
    /// The provider answered successfully with this body.
    Delivered(JsonValue),
    /// The attempt failed with this typed description.
    Failed(FailureKind),
}

/// Dispatches payloads to providers through an abstract transport.
pub struct Dispatcher {
    /// Wire-level collaborator.
    transport: Arc<dyn Transport>,
    /// Failure event collaborator; fire-and-forget.
    sink: Arc<dyn ObservabilitySink>,
    /// Shared registry handle.
    store: Arc<RegistryStore>,
    /// Designated fallback provider.
    default_service: String,
    /// Per-attempt deadline when nothing overrides it.
    default_timeout_ms: u64,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn ObservabilitySink>,
        store: Arc<RegistryStore>,
        default_service: impl Into<String>,
        default_timeout_ms: u64,
    ) -> Self {
        Self {
            transport,
            sink,
            store,
            default_service: default_service.into(),
            default_timeout_ms,
        }
    }

    /// Dispatches a payload to the named provider with one-shot fallback.
    ///
    /// Transport-level failures settle inside the returned outcome; they are
    /// not `Err` values, so batch items stay isolated.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownService`] when `service_id` (or, on
    /// fallback, the configured default service) is not in the registry.
    pub async fn dispatch(
        &self,
        service_id: &str,
        payload: &JsonValue,
        timeout_override: Option<u64>,
    ) -> Result<DispatchOutcome> {
        let registry = self.store.current();
        let primary = registry
            .service(service_id)
            .ok_or_else(|| RouteError::UnknownService(service_id.to_owned()))?;

        match self.run_attempt(primary, payload, timeout_override, 1).await {
            AttemptResult::Delivered(body) => Ok(DispatchOutcome::succeeded(&primary.id, body, 1)),
            AttemptResult::Failed(kind) => {
                self.record_failure(&kind, &primary.id, 1);

                if primary.id == self.default_service {
                    // The primary already was the designated fallback;
                    // retrying the same provider is not a fallback.
                    return Ok(self.settle_exhausted(&primary.id, &primary.id, &kind, 1));
                }

                let fallback = registry
                    .service(&self.default_service)
                    .ok_or_else(|| RouteError::UnknownService(self.default_service.clone()))?;

                match self.run_attempt(fallback, payload, timeout_override, 2).await {
                    AttemptResult::Delivered(body) => {
                        tracing::info!(
                            primary = %primary.id,
                            fallback = %fallback.id,
                            "primary attempt failed; fallback succeeded"
                        );
                        Ok(DispatchOutcome::succeeded(&fallback.id, body, 2))
                    }
                    AttemptResult::Failed(fallback_kind) => {
                        self.record_failure(&fallback_kind, &fallback.id, 2);
                        Ok(self.settle_exhausted(&primary.id, &fallback.id, &fallback_kind, 2))
                    }
                }
            }
        }
    }

    /// Runs a single attempt through the transport under a deadline.
    async fn run_attempt(
        &self,
        service: &ServiceDescriptor,
        payload: &JsonValue,
        timeout_override: Option<u64>,
        attempt: u8,
    ) -> AttemptResult {
        let timeout_ms = timeout_override
            .or(service.timeout_ms)
            .unwrap_or(self.default_timeout_ms);

        let mut request =
            TransportRequest::post(service.endpoint.clone(), payload.clone(), timeout_ms);
        if let Some(token) = service.bearer_token() {
            request = request.with_header("Authorization", format!("Bearer {token}"));
        }

        let mut state = AttemptState::Pending;
        tracing::debug!(service_id = %service.id, attempt, ?state, "attempt created");

        state = AttemptState::InFlight;
        tracing::debug!(service_id = %service.id, attempt, ?state, timeout_ms, "attempt sent");

        let result = match timeout(
            Duration::from_millis(timeout_ms),
            self.transport.send(&request),
        )
        .await
        {
            Err(_elapsed) => AttemptResult::Failed(FailureKind::Timeout { timeout_ms }),
            Ok(Err(CoreError::Timeout(elapsed_ms))) => {
                AttemptResult::Failed(FailureKind::Timeout {
                    timeout_ms: elapsed_ms,
                })
            }
            Ok(Err(error)) => AttemptResult::Failed(FailureKind::Transport {
                message: error.to_string(),
            }),
            Ok(Ok(response)) => {
                if response.is_success() {
                    AttemptResult::Delivered(response.body)
                } else {
                    AttemptResult::Failed(FailureKind::Transport {
                        message: format!("provider answered with status {}", response.status),
                    })
                }
            }
        };

        state = match result {
            AttemptResult::Delivered(_) => AttemptState::Succeeded,
            AttemptResult::Failed(_) => AttemptState::Failed,
        };
        tracing::debug!(service_id = %service.id, attempt, ?state, "attempt settled");

        result
    }

    /// Builds the terminal exhausted-fallback outcome and reports it.
    fn settle_exhausted(
        &self,
        primary: &str,
        fallback: &str,
        last_failure: &FailureKind,
        attempt: u8,
    ) -> DispatchOutcome {
        let kind = FailureKind::ExhaustedFallback {
            primary: primary.to_owned(),
            fallback: fallback.to_owned(),
            message: last_failure.to_string(),
        };

        self.sink.record(DispatchEvent {
            kind: DispatchEventKind::FallbackExhausted,
            service_id: fallback.to_owned(),
            message: kind.to_string(),
            attempt,
        });

        DispatchOutcome::failed(fallback, kind, attempt)
    }

    /// Reports one attempt failure to the observability sink.
    fn record_failure(&self, kind: &FailureKind, service_id: &str, attempt: u8) {
        let event_kind = match kind {
            FailureKind::Timeout { .. } => DispatchEventKind::Timeout,
            FailureKind::Transport { .. }
            | FailureKind::UnknownService { .. }
            | FailureKind::ExhaustedFallback { .. } => DispatchEventKind::TransportFailure,
        };

        self.sink.record(DispatchEvent {
            kind: event_kind,
            service_id: service_id.to_owned(),
            message: kind.to_string(),
            attempt,
        });
    }
}
