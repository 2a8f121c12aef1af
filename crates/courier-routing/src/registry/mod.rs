//! Capability registry: declarative catalog, validation, lookup indexes,
//! and the checksum-keyed shared store.
//!
//! The registry is built once from the catalog document and is read-only
//! afterwards; a reload builds a complete new index and swaps it atomically,
//! so concurrent dispatches always observe either the old or the new index.

/// Catalog document model and schema validation.
pub mod catalog;
/// Immutable registry with multi-key lookup indexes.
pub mod index;
/// Shared handle with checksum-keyed reload.
pub mod store;

pub use catalog::{AuthConfig, CatalogDocument, ServiceDescriptor};
pub use index::Registry;
pub use store::{RegistryStore, ReloadStatus};
