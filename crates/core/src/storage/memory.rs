//! In-memory storage provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use bytes::Bytes;

use super::error::StorageError;
use super::provider::{BlobLocation, StorageProvider};

/// In-memory provider for tests and persistence-suppressed environments.
///
/// Objects live in a process-local map. Operation counters record how
/// often each provider call was made so tests can assert on
/// persistence traffic.
#[derive(Default)]
pub struct MemoryProvider {
    objects: RwLock<HashMap<String, Bytes>>,
    costly_existence: bool,
    loads: AtomicUsize,
    saves: AtomicUsize,
    deletes: AtomicUsize,
    probes: AtomicUsize,
}

impl MemoryProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report existence checks as costly remote round trips.
    #[must_use]
    pub fn with_costly_existence(mut self) -> Self {
        self.costly_existence = true;
        self
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the provider holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a key currently holds an object.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// How many `load` calls were made.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// How many `save` calls were made.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// How many `delete` calls were made.
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::Relaxed)
    }

    /// How many `exists` calls were made.
    #[must_use]
    pub fn exists_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl StorageProvider for MemoryProvider {
    async fn load(&self, at: &BlobLocation) -> Result<Bytes, StorageError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&at.key())
            .cloned()
            .ok_or_else(|| StorageError::not_found(at.key()))
    }

    async fn save(&self, at: &BlobLocation, data: Bytes) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::Relaxed);
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(at.key(), data);
        Ok(())
    }

    async fn delete(&self, at: &BlobLocation) -> Result<(), StorageError> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&at.key());
        Ok(())
    }

    async fn exists(&self, at: &BlobLocation) -> Result<bool, StorageError> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&at.key()))
    }

    fn costs_to_check_existence(&self) -> bool {
        self.costly_existence
    }
}
