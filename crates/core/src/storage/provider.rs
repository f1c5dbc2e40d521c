//! Storage provider contract.

use bytes::Bytes;

use super::error::StorageError;

/// Physical address of a stored blob.
///
/// The folder is the logical grouping (`{OwnerType}.{property}` for an
/// attached blob) and the object name is the owner identifier. The
/// file extension stays out of the key so that clearing or renaming an
/// attachment keeps addressing the object it replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    /// Logical folder the object lives under.
    pub folder: String,
    /// Object name within the folder.
    pub object: String,
}

impl BlobLocation {
    /// Create a new location.
    #[must_use]
    pub fn new(folder: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            object: object.into(),
        }
    }

    /// Render the storage key as `{folder}/{object}`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.folder, self.object)
    }
}

/// Pluggable physical storage backend.
///
/// Implementations must be shareable across tasks. `delete` must treat
/// a missing object as success; callers rely on it to reconcile
/// attachments that were cleared before ever being written.
#[async_trait::async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read the full content of an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or the backend
    /// fails.
    async fn load(&self, at: &BlobLocation) -> Result<Bytes, StorageError>;

    /// Write the full content of an object, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    async fn save(&self, at: &BlobLocation, data: Bytes) -> Result<(), StorageError>;

    /// Remove an object. Missing objects are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for backend failures, never for absence.
    async fn delete(&self, at: &BlobLocation) -> Result<(), StorageError>;

    /// Whether an object currently exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot answer.
    async fn exists(&self, at: &BlobLocation) -> Result<bool, StorageError>;

    /// Whether `exists` involves a costly remote round trip.
    ///
    /// When `true`, emptiness checks assume presence instead of probing.
    fn costs_to_check_existence(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_key_format() {
        let at = BlobLocation::new("Invoice.Photo", "42");
        assert_eq!(at.key(), "Invoice.Photo/42");
    }
}
