//! Folder-to-provider resolution.

use std::collections::HashMap;
use std::sync::Arc;

use super::provider::StorageProvider;

/// Resolves logical folders to concrete storage providers.
///
/// A single default provider serves every folder unless an override is
/// registered for that folder. Resolution never fails.
#[derive(Clone)]
pub struct ProviderRegistry {
    default: Arc<dyn StorageProvider>,
    overrides: HashMap<String, Arc<dyn StorageProvider>>,
}

impl ProviderRegistry {
    /// Create a registry backed by a single default provider.
    #[must_use]
    pub fn new(default: Arc<dyn StorageProvider>) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Route one folder to a dedicated provider.
    #[must_use]
    pub fn with_folder(
        mut self,
        folder: impl Into<String>,
        provider: Arc<dyn StorageProvider>,
    ) -> Self {
        self.overrides.insert(folder.into(), provider);
        self
    }

    /// Resolve the provider serving a folder.
    #[must_use]
    pub fn resolve(&self, folder: &str) -> Arc<dyn StorageProvider> {
        self.overrides
            .get(folder)
            .map_or_else(|| Arc::clone(&self.default), Arc::clone)
    }
}
