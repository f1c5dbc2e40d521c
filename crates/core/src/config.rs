//! Blob subsystem configuration.

use serde::Deserialize;

/// Configuration for URL composition and persistence behavior.
///
/// Threaded explicitly through [`BlobContext`](crate::BlobContext);
/// nothing here is read from process-wide state.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// Base URL prepended to generated blob URLs. Expected to end with `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// When `true`, owner lifecycle events do not touch physical
    /// storage. Intended for test environments; direct save and delete
    /// calls on a handle are unaffected.
    #[serde(default)]
    pub suppress_persistence: bool,
}

impl BlobConfig {
    /// Default base URL for generated links.
    pub const DEFAULT_BASE_URL: &'static str = "/blob/";

    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Disable lifecycle-driven persistence.
    #[must_use]
    pub fn with_suppressed_persistence(mut self) -> Self {
        self.suppress_persistence = true;
        self
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            suppress_persistence: false,
        }
    }
}

fn default_base_url() -> String {
    BlobConfig::DEFAULT_BASE_URL.to_string()
}
