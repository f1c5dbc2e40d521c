//! Storage provider implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;

use satchel_core::storage::{BlobLocation, StorageError, StorageProvider};

use crate::config::StorageBackend;

/// Storage provider delegating to an OpenDAL operator.
///
/// One provider serves one configured backend; route folders to
/// different backends through the core `ProviderRegistry`. Remote
/// backends report existence checks as costly, so handles assume
/// presence instead of probing them on every emptiness check.
pub struct OpendalProvider {
    operator: Operator,
    backend: &'static str,
    costly_existence: bool,
}

impl OpendalProvider {
    /// Create a provider for a configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub fn from_backend(backend: &StorageBackend) -> Result<Self, StorageError> {
        let operator = create_operator(backend)?;
        Ok(Self {
            operator,
            backend: backend.name(),
            costly_existence: backend.is_remote(),
        })
    }

    /// The backend name this provider writes to.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

/// Create an OpenDAL operator from a backend config.
fn create_operator(backend: &StorageBackend) -> Result<Operator, StorageError> {
    match backend {
        StorageBackend::S3 {
            endpoint,
            bucket,
            access_key_id,
            secret_access_key,
            region,
        } => {
            let builder = services::S3::default()
                .endpoint(endpoint)
                .bucket(bucket)
                .access_key_id(access_key_id)
                .secret_access_key(secret_access_key)
                .region(region);

            Ok(Operator::new(builder)
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish())
        }
        StorageBackend::AzureBlob {
            account,
            access_key,
            container,
        } => {
            let builder = services::Azblob::default()
                .account_name(account)
                .account_key(access_key)
                .container(container);

            Ok(Operator::new(builder)
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish())
        }
        StorageBackend::LocalFs { root } => {
            let builder = services::Fs::default().root(
                root.to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?,
            );

            Ok(Operator::new(builder)
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish())
        }
    }
}

/// Map an OpenDAL failure onto the core storage error taxonomy.
fn map_err(at: &BlobLocation, err: opendal::Error) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::not_found(at.key()),
        _ => StorageError::operation(err.to_string()),
    }
}

#[async_trait::async_trait]
impl StorageProvider for OpendalProvider {
    async fn load(&self, at: &BlobLocation) -> Result<Bytes, StorageError> {
        let buffer = self
            .operator
            .read(&at.key())
            .await
            .map_err(|e| map_err(at, e))?;
        Ok(buffer.to_bytes())
    }

    async fn save(&self, at: &BlobLocation, data: Bytes) -> Result<(), StorageError> {
        let bytes = data.len();
        self.operator
            .write(&at.key(), data)
            .await
            .map_err(|e| map_err(at, e))?;
        debug!(backend = self.backend, key = %at.key(), bytes, "object written");
        Ok(())
    }

    async fn delete(&self, at: &BlobLocation) -> Result<(), StorageError> {
        match self.operator.delete(&at.key()).await {
            Ok(()) => Ok(()),
            // Deleting a missing object is a success by contract.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_err(at, e)),
        }
    }

    async fn exists(&self, at: &BlobLocation) -> Result<bool, StorageError> {
        match self.operator.stat(&at.key()).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_err(at, e)),
        }
    }

    fn costs_to_check_existence(&self) -> bool {
        self.costly_existence
    }
}
