//! Task routing core: registry, analyzer, scorer, dispatcher, and batch
//! coordination.
//!
//! An inbound task flows analyzer → scorer → dispatcher; the batch
//! coordinator fans that pipeline out concurrently with per-item isolation.
//! The [`Orchestrator`] owns the wired components and exposes the public
//! entry points.

/// Task analysis and profile derivation.
pub mod analyzer;
/// Concurrent batch coordination with settle semantics.
pub mod batch;
/// Two-attempt provider dispatch with fallback.
pub mod dispatcher;
/// Error types and result definitions.
pub mod error;
/// High-level facade wiring all routing components.
pub mod orchestrator;
/// Capability registry: catalog, indexes, and the shared store.
pub mod registry;
/// Candidate scoring and deterministic selection.
pub mod scorer;

pub use analyzer::TaskAnalyzer;
pub use batch::BatchCoordinator;
pub use dispatcher::{AttemptState, Dispatcher};
pub use error::{Result, RouteError};
pub use orchestrator::{
    CategoryListing, ConnectionStatus, Orchestrator, ProcessedTask, ServiceListing,
};
pub use registry::{
    AuthConfig, CatalogDocument, Registry, RegistryStore, ReloadStatus, ServiceDescriptor,
};
pub use scorer::{CandidateScorer, ScoredCandidate, SelectionDecision, TaskCategory};
