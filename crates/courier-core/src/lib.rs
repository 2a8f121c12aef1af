//! Core types and traits for the courier task router.
//!
//! This crate provides the shared data model, error taxonomy, configuration
//! loading, and the collaborator traits (transport, observability) used
//! across the courier workspace.

/// Configuration types and loading.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Synchronization utilities for handling poisoned locks.
pub mod sync;
/// Trait definitions for transports and observability sinks.
pub mod traits;
/// Core data types for task requests, profiles, and dispatch outcomes.
pub mod types;

pub use config::{BatchConfig, CatalogConfig, DispatchConfig, RouterConfig, RoutingOptions};
pub use error::{Error, Result};
pub use sync::{IgnoreLock, IgnoreRwLock};
pub use traits::{
    DispatchEvent, DispatchEventKind, HttpMethod, ObservabilitySink, Transport, TransportRequest,
    TransportResponse,
};
pub use types::{
    DispatchOutcome, FailureKind, InputKind, RequestContext, RequestId, TaskIntent, TaskProfile,
    TaskRequest,
};
