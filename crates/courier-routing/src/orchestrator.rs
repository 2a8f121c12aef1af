//! High-level facade wiring the registry, analyzer, scorer, dispatcher, and
//! batch coordinator. Owned by the application's composition root; the
//! registry is an explicit value here, never hidden global state.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use courier_core::{
    DispatchOutcome, ObservabilitySink, RouterConfig, TaskProfile, TaskRequest, Transport,
    TransportRequest,
};

use crate::analyzer::TaskAnalyzer;
use crate::batch::BatchCoordinator;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, RouteError};
use crate::registry::{Registry, RegistryStore, ReloadStatus};
use crate::scorer::{CandidateScorer, SelectionDecision};

/// Result of processing a single task end to end.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedTask {
    /// Profile the analyzer derived.
    pub profile: TaskProfile,
    /// Selection the scorer made.
    pub decision: SelectionDecision,
    /// Settled dispatch result.
    pub outcome: DispatchOutcome,
}

/// One category in the service listing.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    /// Category name.
    pub name: String,
    /// Human-readable description; empty for unknown categories.
    pub description: String,
    /// Member service ids in declaration order.
    pub service_ids: Vec<String>,
}

/// Registry introspection result.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceListing {
    /// All service ids in declaration order.
    pub ids: Vec<String>,
    /// All categories with their members.
    pub categories: Vec<CategoryListing>,
}

/// Health-check result for one provider.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    /// Whether the provider answered with a success status.
    pub success: bool,
    /// HTTP status code; 0 when the provider was unreachable.
    pub status: u16,
}

/// Coordinates all routing components behind the public entry points.
pub struct Orchestrator {
    /// Task analyzer.
    analyzer: Arc<TaskAnalyzer>,
    /// Candidate scorer.
    scorer: Arc<CandidateScorer>,
    /// Provider dispatcher.
    dispatcher: Arc<Dispatcher>,
    /// Shared registry handle.
    store: Arc<RegistryStore>,
    /// Transport used directly for health checks.
    transport: Arc<dyn Transport>,
    /// Router configuration.
    config: RouterConfig,
}

impl Orchestrator {
    /// Creates an orchestrator from configuration and collaborators.
    #[must_use]
    pub fn new(
        config: RouterConfig,
        store: Arc<RegistryStore>,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Self {
        let analyzer = Arc::new(TaskAnalyzer::new(&config.routing.default_language));
        let scorer = Arc::new(CandidateScorer::new(
            &config.routing.default_service,
            &config.routing.default_language,
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&transport),
            sink,
            Arc::clone(&store),
            &config.routing.default_service,
            config.dispatch.timeout_ms,
        ));

        Self {
            analyzer,
            scorer,
            dispatcher,
            store,
            transport,
            config,
        }
    }

    /// Processes a single task: analyze → select → dispatch.
    ///
    /// Transport-level failures settle inside the returned outcome; the
    /// caller formats the result for presentation.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownService`] when an explicit requirement
    /// (or the configured default service) is not registered.
    pub async fn process(&self, request: &TaskRequest) -> Result<ProcessedTask> {
        run_pipeline(
            &self.analyzer,
            &self.scorer,
            &self.dispatcher,
            &self.store,
            request,
        )
        .await
    }

    /// Processes a batch of tasks concurrently with settle semantics.
    ///
    /// The result has the same length and order as the input; no error
    /// escapes the batch itself.
    pub async fn batch_process(&self, requests: Vec<TaskRequest>) -> Vec<DispatchOutcome> {
        let coordinator = BatchCoordinator::new(
            Arc::clone(&self.analyzer),
            Arc::clone(&self.scorer),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.store),
            self.config.batch.max_concurrent,
        );

        let deadline = self.config.batch.deadline_ms.map(Duration::from_millis);
        coordinator.dispatch_all(requests, deadline).await
    }

    /// Lists registered services and categories.
    #[must_use]
    pub fn list_services(&self) -> ServiceListing {
        let registry = self.store.current();

        let ids = registry
            .all_services()
            .iter()
            .map(|service| service.id.clone())
            .collect();

        let categories = registry
            .categories()
            .iter()
            .map(|name| CategoryListing {
                name: (*name).to_owned(),
                description: category_description(name).to_owned(),
                service_ids: registry
                    .by_category(name)
                    .iter()
                    .map(|service| service.id.clone())
                    .collect(),
            })
            .collect();

        ServiceListing { ids, categories }
    }

    /// Health-checks one provider via `GET <endpoint>/health`.
    ///
    /// An unreachable provider is reported as `success: false` with status
    /// 0, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownService`] when the id is not registered.
    pub async fn test_connection(&self, service_id: &str) -> Result<ConnectionStatus> {
        let registry = self.store.current();
        let service = registry
            .service(service_id)
            .ok_or_else(|| RouteError::UnknownService(service_id.to_owned()))?;

        let timeout_ms = service.timeout_ms.unwrap_or(self.config.dispatch.timeout_ms);
        let endpoint = format!("{}/health", service.endpoint.trim_end_matches('/'));

        let mut request = TransportRequest::get(endpoint, timeout_ms);
        if let Some(token) = service.bearer_token() {
            request = request.with_header("Authorization", format!("Bearer {token}"));
        }

        match self.transport.send(&request).await {
            Ok(response) => Ok(ConnectionStatus {
                success: response.is_success(),
                status: response.status,
            }),
            Err(error) => {
                tracing::warn!(service_id = %service.id, "health check failed: {error}");
                Ok(ConnectionStatus {
                    success: false,
                    status: 0,
                })
            }
        }
    }

    /// Reloads the catalog from raw bytes, keyed by content checksum.
    ///
    /// # Errors
    ///
    /// Returns a schema error when the new catalog is invalid; the previous
    /// registry stays in service.
    pub fn reload_catalog(&self, bytes: &[u8]) -> Result<ReloadStatus> {
        self.store.load(bytes)
    }

    /// Returns the current registry snapshot.
    #[must_use]
    pub fn registry(&self) -> Arc<Registry> {
        self.store.current()
    }

    /// Returns the router configuration.
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Runs one request through analyze → select → dispatch.
///
/// Shared between [`Orchestrator::process`] and the batch coordinator so
/// both paths stay identical.
pub(crate) async fn run_pipeline(
    analyzer: &TaskAnalyzer,
    scorer: &CandidateScorer,
    dispatcher: &Dispatcher,
    store: &RegistryStore,
    request: &TaskRequest,
) -> Result<ProcessedTask> {
    let profile = analyzer.analyze(&request.input, request.input_type, &request.context);

    let registry = store.current();
    let decision = scorer.select(&profile, &registry, request.requirement.as_deref())?;

    tracing::info!(
        request_id = ?request.id,
        service_id = %decision.service_id,
        "🎯 routing decision: {}",
        decision.reasoning
    );

    let payload = build_payload(request, &profile);
    let outcome = dispatcher
        .dispatch(&decision.service_id, &payload, None)
        .await?;

    Ok(ProcessedTask {
        profile,
        decision,
        outcome,
    })
}

/// Builds the provider payload from the request and its profile.
fn build_payload(request: &TaskRequest, profile: &TaskProfile) -> JsonValue {
    json!({
        "input": request.input,
        "input_type": request.input_type,
        "context": request.context.extra,
        "analysis": {
            "language": profile.language,
            "complexity": profile.complexity,
            "intent": profile.intent,
            "estimated_tokens": profile.estimated_tokens,
        },
        "max_tokens": profile.estimated_tokens * 2,
    })
}

/// Description for a known category; empty for unknown names.
fn category_description(name: &str) -> &'static str {
    match name {
        "reasoning" => "Complex reasoning, problem solving, and planning",
        "coding" => "Code generation, completion, and debugging",
        "multimodal" => "Image, video, and multimodal understanding",
        "multilingual" => "Multilingual text processing and translation",
        "creative" => "Creative writing and content generation",
        "specialized" => "Specialized domain-specific tasks",
        _ => "",
    }
}
