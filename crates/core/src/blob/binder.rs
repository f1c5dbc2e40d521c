//! Attachment lifecycle binding.
//!
//! Wires a blob handle to the save and delete signals of its owning
//! record, so content persists alongside the row that references it.

use std::sync::Arc;

use tracing::debug;

use crate::owner::{KeyAssignment, LifecycleObserver, OwnerRecord, SignalKind};

use super::error::BlobError;
use super::handle::Blob;

/// Binds blob handles to owner record lifecycles.
///
/// Stateless service; all methods are associated functions.
pub struct AttachmentBinder;

impl AttachmentBinder {
    /// Attach a handle to an owner property.
    ///
    /// Persistence subscribes to the save signal matching the owner's
    /// key assignment: externally assigned identifiers exist before the
    /// row is written, so content saves on pre-save and a storage
    /// failure aborts the owner save; database-assigned identifiers are
    /// only known after the insert, so content saves on post-save.
    /// Content addressed by an identifier that does not exist yet
    /// cannot be written any earlier. Purging always subscribes to
    /// pre-delete.
    ///
    /// Re-attaching detaches first, so subscriptions never stack.
    pub fn attach(blob: &Blob, owner: &Arc<dyn OwnerRecord>, property: &str) {
        Self::detach(blob);

        let save_on = match owner.descriptor().key_assignment() {
            KeyAssignment::External => SignalKind::PreSave,
            KeyAssignment::Database => SignalKind::PostSave,
        };

        let signals = owner.signals();
        let persist = signals.signal(save_on).subscribe(Arc::new(Persist {
            blob: blob.clone(),
        }));
        let purge = signals
            .pre_delete
            .subscribe(Arc::new(Purge { blob: blob.clone() }));

        blob.bind(
            owner,
            property,
            vec![(save_on, persist), (SignalKind::PreDelete, purge)],
        );
        debug!(
            owner = owner.descriptor().type_name(),
            property,
            save_on = ?save_on,
            "attachment bound"
        );
    }

    /// Remove a handle's lifecycle subscriptions.
    ///
    /// The owner and property stay recorded, so URLs and folder names
    /// remain derivable; the handle just stops reacting to owner
    /// events. No-op for an unowned handle, and for one whose owner is
    /// already gone (its signals died with it).
    pub fn detach(blob: &Blob) {
        let subscriptions = blob.take_subscriptions();
        if subscriptions.is_empty() {
            return;
        }
        let Some(owner) = blob.owner() else {
            return;
        };
        let signals = owner.signals();
        for (kind, id) in subscriptions {
            signals.signal(kind).unsubscribe(id);
        }
        debug!(owner = owner.descriptor().type_name(), "attachment unbound");
    }
}

/// Writes the blob out when its owner is saved.
struct Persist {
    blob: Blob,
}

#[async_trait::async_trait]
impl LifecycleObserver for Persist {
    async fn notify(&self) -> Result<(), BlobError> {
        if self.blob.context().persistence_suppressed() {
            return Ok(());
        }
        self.blob.save().await
    }
}

/// Purges stored content when the owner is deleted.
///
/// Soft-deleting owner types are skipped: their rows stay conceptually
/// alive, and so do their blobs.
struct Purge {
    blob: Blob,
}

#[async_trait::async_trait]
impl LifecycleObserver for Purge {
    async fn notify(&self) -> Result<(), BlobError> {
        if self.blob.context().persistence_suppressed() {
            return Ok(());
        }
        if let Some(owner) = self.blob.owner() {
            if owner.descriptor().is_soft_delete() {
                debug!(
                    owner = owner.descriptor().type_name(),
                    "soft-deleting owner keeps its blob"
                );
                return Ok(());
            }
        }
        self.blob.delete().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;

    use crate::config::BlobConfig;
    use crate::context::BlobContext;
    use crate::owner::{LifecycleSignals, OwnerDescriptor};
    use crate::storage::{
        BlobLocation, MemoryProvider, ProviderRegistry, StorageError, StorageProvider,
    };

    use super::*;

    struct TestOwner {
        descriptor: OwnerDescriptor,
        id: Mutex<Option<String>>,
        signals: LifecycleSignals,
    }

    impl TestOwner {
        fn new(descriptor: OwnerDescriptor, id: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                descriptor,
                id: Mutex::new(id.map(String::from)),
                signals: LifecycleSignals::new(),
            })
        }

        fn assign_id(&self, id: &str) {
            *self.id.lock().expect("id lock") = Some(id.to_string());
        }
    }

    impl OwnerRecord for TestOwner {
        fn descriptor(&self) -> &OwnerDescriptor {
            &self.descriptor
        }

        fn record_id(&self) -> Option<String> {
            self.id.lock().expect("id lock").clone()
        }

        fn signals(&self) -> &LifecycleSignals {
            &self.signals
        }

        fn blob_property(&self, _name: &str) -> Option<Blob> {
            None
        }
    }

    /// Provider whose backend is permanently unavailable.
    struct OfflineProvider;

    #[async_trait::async_trait]
    impl StorageProvider for OfflineProvider {
        async fn load(&self, _at: &BlobLocation) -> Result<Bytes, StorageError> {
            Err(StorageError::operation("backend offline"))
        }

        async fn save(&self, _at: &BlobLocation, _data: Bytes) -> Result<(), StorageError> {
            Err(StorageError::operation("backend offline"))
        }

        async fn delete(&self, _at: &BlobLocation) -> Result<(), StorageError> {
            Err(StorageError::operation("backend offline"))
        }

        async fn exists(&self, _at: &BlobLocation) -> Result<bool, StorageError> {
            Err(StorageError::operation("backend offline"))
        }

        fn costs_to_check_existence(&self) -> bool {
            true
        }
    }

    fn env_with(config: BlobConfig) -> (Arc<BlobContext>, Arc<MemoryProvider>) {
        let provider = Arc::new(MemoryProvider::new());
        let registry = ProviderRegistry::new(Arc::clone(&provider) as Arc<dyn StorageProvider>);
        (Arc::new(BlobContext::new(registry, config)), provider)
    }

    fn test_env() -> (Arc<BlobContext>, Arc<MemoryProvider>) {
        env_with(BlobConfig::new())
    }

    #[test]
    fn test_external_keys_bind_to_pre_save() {
        let (ctx, _) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::with_name(&ctx, "scan.pdf");

        AttachmentBinder::attach(&blob, &owner, "Scan");

        assert_eq!(owner.signals().pre_save.observer_count(), 1);
        assert_eq!(owner.signals().post_save.observer_count(), 0);
        assert_eq!(owner.signals().pre_delete.observer_count(), 1);
    }

    #[test]
    fn test_database_keys_bind_to_post_save() {
        let (ctx, _) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Receipt", KeyAssignment::Database),
            None,
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::with_name(&ctx, "scan.pdf");

        AttachmentBinder::attach(&blob, &owner, "Scan");

        assert_eq!(owner.signals().pre_save.observer_count(), 0);
        assert_eq!(owner.signals().post_save.observer_count(), 1);
        assert_eq!(owner.signals().pre_delete.observer_count(), 1);
    }

    #[test]
    fn test_re_attach_never_stacks_subscriptions() {
        let (ctx, _) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::with_name(&ctx, "scan.pdf");

        AttachmentBinder::attach(&blob, &owner, "Scan");
        AttachmentBinder::attach(&blob, &owner, "Scan");
        AttachmentBinder::attach(&blob, &owner, "Scan");

        assert_eq!(owner.signals().pre_save.observer_count(), 1);
        assert_eq!(owner.signals().pre_delete.observer_count(), 1);
    }

    #[test]
    fn test_detach_removes_subscriptions_and_keeps_owner() {
        let (ctx, _) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::with_name(&ctx, "scan.pdf");

        AttachmentBinder::attach(&blob, &owner, "Scan");
        AttachmentBinder::detach(&blob);

        assert_eq!(owner.signals().pre_save.observer_count(), 0);
        assert_eq!(owner.signals().pre_delete.observer_count(), 0);
        assert_eq!(blob.owner_property().as_deref(), Some("Scan"));
        assert!(blob.owner().is_some());

        // Detaching again is a no-op.
        AttachmentBinder::detach(&blob);
    }

    #[tokio::test]
    async fn test_owner_save_persists_buffered_content() {
        let (ctx, provider) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::from_data(&ctx, &b"scanned"[..], "scan.pdf");
        AttachmentBinder::attach(&blob, &owner, "Scan");

        owner.signals().pre_save.emit().await.expect("owner save");

        assert_eq!(provider.save_count(), 1);
        assert!(provider.contains("Invoice.Scan/42"));
    }

    #[tokio::test]
    async fn test_database_key_content_waits_for_the_assigned_id() {
        let (ctx, provider) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Receipt", KeyAssignment::Database),
            None,
        );
        let owner: Arc<dyn OwnerRecord> = Arc::clone(&record) as Arc<dyn OwnerRecord>;
        let blob = Blob::from_data(&ctx, &b"scanned"[..], "scan.pdf");
        AttachmentBinder::attach(&blob, &owner, "Scan");

        // The insert hands out the identifier, then post-save fires.
        record.assign_id("1001");
        owner.signals().post_save.emit().await.expect("owner save");

        assert!(provider.contains("Receipt.Scan/1001"));
    }

    #[tokio::test]
    async fn test_owner_delete_purges_stored_content() {
        let (ctx, provider) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::from_data(&ctx, &b"scanned"[..], "scan.pdf");
        AttachmentBinder::attach(&blob, &owner, "Scan");

        owner.signals().pre_save.emit().await.expect("owner save");
        owner.signals().pre_delete.emit().await.expect("owner delete");

        assert_eq!(provider.delete_count(), 1);
        assert!(!provider.contains("Invoice.Scan/42"));
    }

    #[tokio::test]
    async fn test_soft_deleting_owner_keeps_its_blob() {
        let (ctx, provider) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External).with_soft_delete(),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::from_data(&ctx, &b"scanned"[..], "scan.pdf");
        AttachmentBinder::attach(&blob, &owner, "Scan");

        owner.signals().pre_save.emit().await.expect("owner save");
        owner.signals().pre_delete.emit().await.expect("owner delete");

        assert_eq!(provider.delete_count(), 0);
        assert!(provider.contains("Invoice.Scan/42"));
    }

    #[tokio::test]
    async fn test_suppressed_persistence_skips_lifecycle_io() {
        let (ctx, provider) = env_with(BlobConfig::new().with_suppressed_persistence());
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::from_data(&ctx, &b"scanned"[..], "scan.pdf");
        AttachmentBinder::attach(&blob, &owner, "Scan");

        owner.signals().pre_save.emit().await.expect("owner save");
        owner.signals().pre_delete.emit().await.expect("owner delete");

        assert_eq!(provider.save_count(), 0);
        assert_eq!(provider.delete_count(), 0);

        // Suppression only gates the lifecycle path.
        blob.save().await.expect("direct save");
        assert_eq!(provider.save_count(), 1);
    }

    #[tokio::test]
    async fn test_detached_handle_ignores_owner_events() {
        let (ctx, provider) = test_env();
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::from_data(&ctx, &b"scanned"[..], "scan.pdf");
        AttachmentBinder::attach(&blob, &owner, "Scan");
        AttachmentBinder::detach(&blob);

        owner.signals().pre_save.emit().await.expect("owner save");
        assert_eq!(provider.save_count(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_the_owner_save() {
        let registry =
            ProviderRegistry::new(Arc::new(OfflineProvider) as Arc<dyn StorageProvider>);
        let ctx = Arc::new(BlobContext::new(registry, BlobConfig::new()));
        let record = TestOwner::new(
            OwnerDescriptor::new("Invoice", KeyAssignment::External),
            Some("42"),
        );
        let owner: Arc<dyn OwnerRecord> = record;
        let blob = Blob::from_data(&ctx, &b"scanned"[..], "scan.pdf");
        AttachmentBinder::attach(&blob, &owner, "Scan");

        let err = owner.signals().pre_save.emit().await.unwrap_err();
        assert!(matches!(err, BlobError::Storage(_)));
    }
}
