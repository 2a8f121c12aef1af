use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a task request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Modality of an inbound task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Plain text input.
    #[default]
    Text,
    /// Image input; forces multimodal routing.
    Image,
    /// Structured (JSON-shaped) request.
    Structured,
}

/// Coarse intent of a task, derived lexically by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskIntent {
    /// Question answering / information lookup.
    Information,
    /// Content or code generation.
    Generation,
    /// Fixing errors or diagnosing problems.
    Debugging,
    /// Translation between languages.
    Translation,
    /// Anything the lexicons did not recognize.
    #[default]
    General,
}

/// Structured profile derived from one inbound task.
///
/// Owned by the call that created it; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProfile {
    /// BCP-47-ish language tag, e.g. `en` or `zh`.
    pub language: String,
    /// Complexity score clamped to `0..=10`.
    pub complexity: u8,
    /// Coarse task intent.
    pub intent: TaskIntent,
    /// Whether the input requires a vision-capable provider.
    pub requires_vision: bool,
    /// Whether the input looks like a coding task.
    pub requires_code: bool,
    /// Whether the input calls for multi-step reasoning.
    pub requires_reasoning: bool,
    /// Rough token estimate for the input.
    pub estimated_tokens: usize,
}

/// Caller-supplied context accompanying a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Explicit language override; wins over detection.
    #[serde(default)]
    pub language: Option<String>,
    /// Opaque extra context forwarded to the provider.
    #[serde(default)]
    pub extra: JsonMap<String, JsonValue>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the language override.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Adds an extra context entry forwarded to the provider.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// One inbound task: the unit both `process` and `batch_process` accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Unique id for correlation in logs and batch results.
    #[serde(default)]
    pub id: RequestId,
    /// Raw task input.
    pub input: String,
    /// Input modality.
    #[serde(default)]
    pub input_type: InputKind,
    /// Caller-supplied context.
    #[serde(default)]
    pub context: RequestContext,
    /// Explicit provider requirement; overrides scoring when set.
    #[serde(default)]
    pub requirement: Option<String>,
}

impl TaskRequest {
    /// Creates a text request with empty context.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            input: input.into(),
            input_type: InputKind::Text,
            context: RequestContext::default(),
            requirement: None,
        }
    }

    /// Sets the input modality.
    #[must_use]
    pub fn with_input_type(mut self, input_type: InputKind) -> Self {
        self.input_type = input_type;
        self
    }

    /// Sets the caller context.
    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Pins the request to an explicit provider.
    #[must_use]
    pub fn with_requirement(mut self, service_id: impl Into<String>) -> Self {
        self.requirement = Some(service_id.into());
        self
    }
}

/// Typed description of why a dispatch failed.
///
/// Carried inside [`DispatchOutcome`]; this is data describing a settled
/// task, not a control-flow error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider call failed at the transport layer.
    #[error("transport failure: {message}")]
    Transport {
        /// Underlying transport error text.
        message: String,
    },

    /// The provider call exceeded its per-attempt deadline.
    #[error("timed out after {timeout_ms}ms")]
    Timeout {
        /// Deadline that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// The named provider is not present in the registry.
    #[error("unknown service: {service_id}")]
    UnknownService {
        /// The id that failed to resolve.
        service_id: String,
    },

    /// Both the primary attempt and the fallback attempt failed.
    #[error("exhausted fallback (primary {primary}, fallback {fallback}): {message}")]
    ExhaustedFallback {
        /// Provider tried on attempt 1.
        primary: String,
        /// Provider tried on attempt 2 (equals `primary` when the primary
        /// already was the designated default).
        fallback: String,
        /// Last underlying failure text.
        message: String,
    },
}

/// Settled result of dispatching one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Whether the task settled successfully.
    pub success: bool,
    /// Provider that produced the terminal result. Empty when no provider
    /// was ever reached (e.g. a batch deadline expired first).
    pub provider_id: String,
    /// Provider response body on success.
    pub payload: Option<JsonValue>,
    /// Failure description when `success` is false.
    pub error: Option<FailureKind>,
    /// Which attempt settled the task: 1 (primary) or 2 (fallback).
    pub attempt: u8,
}

impl DispatchOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub fn succeeded(provider_id: impl Into<String>, payload: JsonValue, attempt: u8) -> Self {
        Self {
            success: true,
            provider_id: provider_id.into(),
            payload: Some(payload),
            error: None,
            attempt,
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failed(provider_id: impl Into<String>, error: FailureKind, attempt: u8) -> Self {
        Self {
            success: false,
            provider_id: provider_id.into(),
            payload: None,
            error: Some(error),
            attempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = TaskRequest::new("translate this")
            .with_input_type(InputKind::Structured)
            .with_context(RequestContext::new().with_language("fr"))
            .with_requirement("svc-translate");

        assert_eq!(request.input, "translate this");
        assert_eq!(request.input_type, InputKind::Structured);
        assert_eq!(request.context.language.as_deref(), Some("fr"));
        assert_eq!(request.requirement.as_deref(), Some("svc-translate"));
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: TaskRequest = match serde_json::from_str(r#"{"input": "hi"}"#) {
            Ok(parsed) => parsed,
            Err(error) => panic!("deserialize failed: {error}"),
        };
        assert_eq!(request.input_type, InputKind::Text);
        assert!(request.requirement.is_none());
    }

    #[test]
    fn test_outcome_constructors() {
        let success = DispatchOutcome::succeeded("svc-a", json!({"ok": true}), 1);
        assert!(success.success);
        assert_eq!(success.attempt, 1);
        assert!(success.error.is_none());

        let failure = DispatchOutcome::failed(
            "svc-a",
            FailureKind::Timeout { timeout_ms: 250 },
            2,
        );
        assert!(!failure.success);
        assert_eq!(failure.attempt, 2);
        assert!(failure.payload.is_none());
    }

    #[test]
    fn test_failure_kind_display() {
        let kind = FailureKind::ExhaustedFallback {
            primary: "svc-a".to_owned(),
            fallback: "svc-b".to_owned(),
            message: "boom".to_owned(),
        };
        assert_eq!(
            kind.to_string(),
            "exhausted fallback (primary svc-a, fallback svc-b): boom"
        );
    }
}
