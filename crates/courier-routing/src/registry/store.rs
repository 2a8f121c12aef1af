use std::sync::{Arc, RwLock};

use sha2::{Digest as _, Sha256};

use courier_core::IgnoreRwLock as _;

use super::catalog::CatalogDocument;
use super::index::Registry;
use crate::error::Result;

/// What a reload did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStatus {
    /// The checksum matched; the cached index was reused.
    Unchanged,
    /// A new index was built and swapped in.
    Reloaded,
}

/// Shared registry handle with checksum-keyed reload.
///
/// Single writer, many readers: readers clone the current `Arc` snapshot and
/// never block each other; a reload builds the complete replacement index
/// before swapping the `Arc`, so no reader can observe a partial index. A
/// failed reload keeps the previous snapshot in service.
#[derive(Debug)]
pub struct RegistryStore {
    /// Current registry snapshot.
    current: RwLock<Arc<Registry>>,
}

impl RegistryStore {
    /// Builds a store from raw catalog bytes.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the catalog fails validation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let registry = Self::build_registry(bytes)?;
        Ok(Self {
            current: RwLock::new(Arc::new(registry)),
        })
    }

    /// Returns the current registry snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<Registry> {
        Arc::clone(&self.current.read_ignore_poison())
    }

    /// Reloads from catalog bytes, keyed by content checksum.
    ///
    /// An unchanged checksum reuses the cached index without a rebuild. A
    /// changed checksum triggers a full atomic replacement, never an
    /// incremental patch.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the new catalog fails validation; the
    /// previous registry stays in service.
    pub fn load(&self, bytes: &[u8]) -> Result<ReloadStatus> {
        let checksum = checksum_hex(bytes);

        if self.current().checksum() == checksum {
            tracing::debug!(%checksum, "catalog unchanged; reusing cached index");
            return Ok(ReloadStatus::Unchanged);
        }

        let registry = Self::build_registry(bytes)?;
        let services = registry.len();

        *self.current.write_ignore_poison() = Arc::new(registry);
        tracing::info!(%checksum, services, "catalog reloaded");

        Ok(ReloadStatus::Reloaded)
    }

    fn build_registry(bytes: &[u8]) -> Result<Registry> {
        let checksum = checksum_hex(bytes);
        let document = CatalogDocument::parse(bytes)?;
        Ok(Registry::build(document, checksum))
    }
}

/// Hex-encoded SHA-256 of the given bytes.
fn checksum_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
