//! Storage backend configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use satchel_core::BlobConfig;

/// Physical backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageBackend {
    /// Create S3-compatible backend (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create Azure Blob Storage backend.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create local filesystem backend (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// The backend name, for logs and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
        }
    }

    /// The bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
        }
    }

    /// Whether the backend sits behind a network round trip.
    ///
    /// Remote backends report existence checks as costly, so emptiness
    /// checks assume presence instead of probing them.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::LocalFs { .. })
    }
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::local_fs("./storage")
    }
}

/// Application settings for the attachment storage path.
///
/// Fully defaulted: with no config file and no environment present,
/// attachments land in `./storage` on the local filesystem.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Physical backend to store attachments on.
    #[serde(default)]
    pub storage: StorageBackend,
    /// Blob subsystem configuration.
    #[serde(default)]
    pub blob: BlobConfig,
}

impl StoreSettings {
    /// Loads settings from config files and the environment.
    ///
    /// Layered: `config/default`, then `config/{RUN_MODE}`, then
    /// `SATCHEL`-prefixed environment variables (`__` separator).
    ///
    /// # Errors
    ///
    /// Returns an error if a present source cannot be read or
    /// deserialized.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SATCHEL").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            blob: BlobConfig::default(),
        }
    }
}
