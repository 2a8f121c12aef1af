//! Observability sink implementations.

use std::sync::{Arc, Mutex};

use courier_core::{DispatchEvent, DispatchEventKind, IgnoreLock as _, ObservabilitySink};

/// Sink that forwards dispatch events to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ObservabilitySink for LogSink {
    fn record(&self, event: DispatchEvent) {
        match event.kind {
            DispatchEventKind::TransportFailure => tracing::warn!(
                service_id = %event.service_id,
                attempt = event.attempt,
                "provider call failed: {}",
                event.message
            ),
            DispatchEventKind::Timeout => tracing::warn!(
                service_id = %event.service_id,
                attempt = event.attempt,
                "provider call timed out: {}",
                event.message
            ),
            DispatchEventKind::FallbackExhausted => tracing::error!(
                service_id = %event.service_id,
                attempt = event.attempt,
                "fallback exhausted: {}",
                event.message
            ),
        }
    }
}

/// Sink that captures events in memory for test assertions.
#[derive(Clone, Default)]
pub struct MemorySink {
    /// Recorded events in arrival order.
    events: Arc<Mutex<Vec<DispatchEvent>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<DispatchEvent> {
        self.events.lock_ignore_poison().clone()
    }

    /// Returns how many events of the given kind were recorded.
    #[must_use]
    pub fn count_of(&self, kind: DispatchEventKind) -> usize {
        self.events
            .lock_ignore_poison()
            .iter()
            .filter(|event| event.kind == kind)
            .count()
    }
}

impl ObservabilitySink for MemorySink {
    fn record(&self, event: DispatchEvent) {
        self.events.lock_ignore_poison().push(event);
    }
}
