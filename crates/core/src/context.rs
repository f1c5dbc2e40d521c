//! Shared blob environment.

use std::sync::Arc;

use crate::config::BlobConfig;
use crate::storage::{ProviderRegistry, StorageProvider};

/// Shared environment blob handles are constructed with.
///
/// Bundles provider routing and configuration. Applications build one
/// at startup and hand an `Arc` of it to every handle they create.
pub struct BlobContext {
    providers: ProviderRegistry,
    config: BlobConfig,
}

impl BlobContext {
    /// Create a context from provider routing and configuration.
    #[must_use]
    pub fn new(providers: ProviderRegistry, config: BlobConfig) -> Self {
        Self { providers, config }
    }

    /// Resolve the provider serving a folder.
    #[must_use]
    pub fn provider(&self, folder: &str) -> Arc<dyn StorageProvider> {
        self.providers.resolve(folder)
    }

    /// The configured base URL for generated links.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Whether lifecycle-driven persistence is suppressed.
    #[must_use]
    pub fn persistence_suppressed(&self) -> bool {
        self.config.suppress_persistence
    }
}
