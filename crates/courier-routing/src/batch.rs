//! Concurrent batch coordination with settle semantics.
//!
//! Every batch item runs the full analyzer → scorer → dispatcher pipeline as
//! an independent task. One item's failure never aborts or delays siblings,
//! and the result list always matches the input in length and order, keyed
//! by index rather than completion order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{Id as TaskId, JoinSet};
use tokio::time::timeout;

use courier_core::{DispatchOutcome, FailureKind, TaskRequest};

use crate::analyzer::TaskAnalyzer;
use crate::dispatcher::Dispatcher;
use crate::error::RouteError;
use crate::orchestrator::run_pipeline;
use crate::registry::RegistryStore;
use crate::scorer::CandidateScorer;

/// Fans task requests out to the dispatch pipeline concurrently.
pub struct BatchCoordinator {
    /// Task analyzer shared across items.
    analyzer: Arc<TaskAnalyzer>,
    /// Candidate scorer shared across items.
    scorer: Arc<CandidateScorer>,
    /// Dispatcher shared across items.
    dispatcher: Arc<Dispatcher>,
    /// Registry handle shared across items.
    store: Arc<RegistryStore>,
    /// Concurrency limit for in-flight provider calls.
    max_concurrent: usize,
}

impl BatchCoordinator {
    /// Creates a coordinator over shared pipeline components.
    #[must_use]
    pub fn new(
        analyzer: Arc<TaskAnalyzer>,
        scorer: Arc<CandidateScorer>,
        dispatcher: Arc<Dispatcher>,
        store: Arc<RegistryStore>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            analyzer,
            scorer,
            dispatcher,
            store,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Dispatches every request concurrently and settles all of them.
    ///
    /// The returned list has the same length and order as the input. With a
    /// deadline, items still unfinished at expiry settle as `Timeout`
    /// failures; the list is always fully populated, never truncated.
    pub async fn dispatch_all(
        &self,
        requests: Vec<TaskRequest>,
        deadline: Option<Duration>,
    ) -> Vec<DispatchOutcome> {
        let total = requests.len();
        let mut slots: Vec<Option<DispatchOutcome>> = vec![None; total];
        let mut join_set = JoinSet::new();
        let mut index_by_task: HashMap<TaskId, usize> = HashMap::new();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        for (index, request) in requests.into_iter().enumerate() {
            let analyzer = Arc::clone(&self.analyzer);
            let scorer = Arc::clone(&self.scorer);
            let dispatcher = Arc::clone(&self.dispatcher);
            let store = Arc::clone(&self.store);
            let permits = Arc::clone(&semaphore);

            let handle = join_set.spawn(async move {
                let permit = permits.acquire_owned().await.ok();
                let outcome =
                    Self::run_item(&analyzer, &scorer, &dispatcher, &store, &request).await;
                drop(permit);
                (index, outcome)
            });
            index_by_task.insert(handle.id(), index);
        }

        let collect = async {
            while let Some(joined) = join_set.join_next_with_id().await {
                match joined {
                    Ok((_task_id, (index, outcome))) => {
                        if let Some(slot) = slots.get_mut(index) {
                            *slot = Some(outcome);
                        }
                    }
                    Err(join_error) => {
                        // A panicked worker settles as its own item's
                        // failure; siblings keep running.
                        if let Some(&index) = index_by_task.get(&join_error.id())
                            && let Some(slot) = slots.get_mut(index)
                        {
                            *slot = Some(DispatchOutcome::failed(
                                String::new(),
                                FailureKind::Transport {
                                    message: format!("batch worker terminated: {join_error}"),
                                },
                                1,
                            ));
                        }
                    }
                }
            }
        };

        let deadline_ms = deadline.map_or(0, |limit| limit.as_millis() as u64);
        let expired = match deadline {
            Some(limit) => timeout(limit, collect).await.is_err(),
            None => {
                collect.await;
                false
            }
        };

        if expired {
            join_set.abort_all();
            tracing::warn!(
                deadline_ms,
                "batch deadline expired; settling unfinished items as timeouts"
            );
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    DispatchOutcome::failed(
                        String::new(),
                        FailureKind::Timeout {
                            timeout_ms: deadline_ms,
                        },
                        1,
                    )
                })
            })
            .collect()
    }

    /// Runs one item through the pipeline, converting every routing error
    /// into that item's own settled failure.
    async fn run_item(
        analyzer: &TaskAnalyzer,
        scorer: &CandidateScorer,
        dispatcher: &Dispatcher,
        store: &RegistryStore,
        request: &TaskRequest,
    ) -> DispatchOutcome {
        match run_pipeline(analyzer, scorer, dispatcher, store, request).await {
            Ok(processed) => processed.outcome,
            Err(RouteError::UnknownService(service_id)) => DispatchOutcome::failed(
                service_id.clone(),
                FailureKind::UnknownService { service_id },
                1,
            ),
            Err(error) => DispatchOutcome::failed(
                String::new(),
                FailureKind::Transport {
                    message: error.to_string(),
                },
                1,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_providers::{LogSink, MockTransport};
    use serde_json::json;

    fn store() -> Arc<RegistryStore> {
        let bytes = json!({
            "version": "1.0.0",
            "services": [
                {
                    "id": "svc-code",
                    "name": "Coder",
                    "endpoint": "https://code.test/v1",
                    "categories": ["coding"],
                    "capabilities": ["code_generation"],
                },
                {
                    "id": "svc-default",
                    "name": "Default",
                    "endpoint": "https://default.test/v1",
                    "categories": ["reasoning"],
                    "capabilities": ["reasoning"],
                },
            ]
        })
        .to_string()
        .into_bytes();

        match RegistryStore::from_bytes(&bytes) {
            Ok(built) => Arc::new(built),
            Err(error) => panic!("store build failed: {error}"),
        }
    }

    fn coordinator(transport: &MockTransport) -> BatchCoordinator {
        let shared_store = store();
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(transport.clone()),
            Arc::new(LogSink),
            Arc::clone(&shared_store),
            "svc-default",
            1_000,
        ));

        BatchCoordinator::new(
            Arc::new(TaskAnalyzer::new("en")),
            Arc::new(CandidateScorer::new("svc-default", "en")),
            dispatcher,
            shared_store,
            4,
        )
    }

    fn coding_request(index: usize) -> TaskRequest {
        TaskRequest::new(format!("Write a function number {index}"))
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_isolation() {
        // Item 2 is pinned to a provider that always fails, and the default
        // fails too, so only that item settles as a failure.
        let transport = MockTransport::new()
            .with_failure("broken.test", "boom")
            .with_failure("default.test", "boom")
            .with_response("code.test", json!({"generated": true}));

        let shared_store = store();
        let status = shared_store.load(
            json!({
                "version": "1.1.0",
                "services": [
                    {
                        "id": "svc-code",
                        "name": "Coder",
                        "endpoint": "https://code.test/v1",
                        "categories": ["coding"],
                        "capabilities": ["code_generation"],
                    },
                    {
                        "id": "svc-broken",
                        "name": "Broken",
                        "endpoint": "https://broken.test/v1",
                        "categories": ["coding"],
                        "capabilities": ["code_generation"],
                    },
                    {
                        "id": "svc-default",
                        "name": "Default",
                        "endpoint": "https://default.test/v1",
                        "categories": ["reasoning"],
                        "capabilities": ["reasoning"],
                    },
                ]
            })
            .to_string()
            .as_bytes(),
        );
        assert!(status.is_ok(), "reload failed");

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(transport.clone()),
            Arc::new(LogSink),
            Arc::clone(&shared_store),
            "svc-default",
            1_000,
        ));
        let coordinator = BatchCoordinator::new(
            Arc::new(TaskAnalyzer::new("en")),
            Arc::new(CandidateScorer::new("svc-default", "en")),
            dispatcher,
            shared_store,
            4,
        );

        let mut requests: Vec<TaskRequest> = (0..5).map(coding_request).collect();
        requests[2] = requests[2].clone().with_requirement("svc-broken");

        let outcomes = coordinator.dispatch_all(requests, None).await;

        assert_eq!(outcomes.len(), 5);
        for (index, outcome) in outcomes.iter().enumerate() {
            if index == 2 {
                assert!(!outcome.success, "item 2 should fail");
                assert!(matches!(
                    outcome.error,
                    Some(FailureKind::ExhaustedFallback { .. })
                ));
            } else {
                assert!(outcome.success, "item {index} should succeed");
                assert_eq!(outcome.provider_id, "svc-code");
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_requirement_settles_per_item() {
        let transport = MockTransport::new().with_response("code.test", json!({"ok": true}));
        let coordinator = coordinator(&transport);

        let requests = vec![
            coding_request(0),
            coding_request(1).with_requirement("svc-ghost"),
        ];

        let outcomes = coordinator.dispatch_all(requests, None).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(matches!(
            outcomes[1].error,
            Some(FailureKind::UnknownService { .. })
        ));
    }

    #[tokio::test]
    async fn test_deadline_settles_stragglers_as_timeouts() {
        // Every provider call sleeps far past the batch deadline.
        let transport = MockTransport::new().with_delay("code.test", 5_000, json!({"late": true}));
        let coordinator = coordinator(&transport);

        let requests: Vec<TaskRequest> = (0..3).map(coding_request).collect();
        let outcomes = coordinator
            .dispatch_all(requests, Some(Duration::from_millis(50)))
            .await;

        assert_eq!(outcomes.len(), 3);
        for outcome in &outcomes {
            assert!(!outcome.success);
            assert!(matches!(
                outcome.error,
                Some(FailureKind::Timeout { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_list() {
        let transport = MockTransport::new();
        let coordinator = coordinator(&transport);

        let outcomes = coordinator.dispatch_all(Vec::new(), None).await;
        assert!(outcomes.is_empty());
    }
}
