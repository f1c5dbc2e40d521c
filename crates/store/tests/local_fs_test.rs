//! Integration tests for the attachment lifecycle on a filesystem backend.
//!
//! The same flows the core crate checks against its in-memory provider,
//! run here against real files under a temporary OpenDAL root.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use satchel_core::owner::{KeyAssignment, LifecycleSignals, OwnerDescriptor, OwnerRecord};
use satchel_core::storage::{ProviderRegistry, StorageProvider};
use satchel_core::{Blob, BlobConfig, BlobContext};
use satchel_store::{OpendalProvider, StorageBackend};

/// Owner record double with externally drivable lifecycle signals.
struct Record {
    descriptor: OwnerDescriptor,
    id: Mutex<Option<String>>,
    signals: LifecycleSignals,
}

impl Record {
    fn saved(type_name: &str, id: &str) -> Arc<dyn OwnerRecord> {
        Arc::new(Self {
            descriptor: OwnerDescriptor::new(type_name, KeyAssignment::External),
            id: Mutex::new(Some(id.to_string())),
            signals: LifecycleSignals::new(),
        })
    }
}

impl OwnerRecord for Record {
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

fn local_ctx(root: &std::path::Path) -> Arc<BlobContext> {
    let provider = OpendalProvider::from_backend(&StorageBackend::local_fs(root))
        .expect("local backend should build");
    let registry = ProviderRegistry::new(Arc::new(provider) as Arc<dyn StorageProvider>);
    Arc::new(BlobContext::new(
        registry,
        BlobConfig::new().with_base_url("https://files.example.com/"),
    ))
}

#[tokio::test]
async fn test_owner_save_writes_the_file_to_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let ctx = local_ctx(dir.path());
    let owner = Record::saved("Invoice", "42");

    let blob = Blob::from_data(&ctx, Bytes::from_static(b"scanned receipt"), "receipt.pdf");
    blob.attach(&owner, "Scan");

    owner.signals().pre_save.emit().await.expect("owner save");

    let on_disk = dir.path().join("Invoice.Scan").join("42");
    let written = std::fs::read(&on_disk).expect("file should exist on disk");
    assert_eq!(written, b"scanned receipt");
    assert_eq!(
        blob.url().as_deref(),
        Some("https://files.example.com/Invoice.Scan/42.pdf")
    );
}

#[tokio::test]
async fn test_rehydrated_handle_reloads_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let ctx = local_ctx(dir.path());
    let owner = Record::saved("Invoice", "7");

    let blob = Blob::from_data(&ctx, Bytes::from_static(b"agreed terms"), "contract.txt");
    blob.attach(&owner, "Contract");
    owner.signals().pre_save.emit().await.expect("owner save");

    // A fresh handle with only the stored file name, as an entity layer
    // would rehydrate it from a row.
    let rehydrated = Blob::with_name(&ctx, "contract.txt");
    rehydrated.attach(&owner, "Contract");

    assert!(!rehydrated.is_empty().await.expect("is_empty"));
    assert_eq!(
        rehydrated.content_text().await.expect("content"),
        "agreed terms"
    );
}

#[tokio::test]
async fn test_owner_delete_removes_the_file_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let ctx = local_ctx(dir.path());
    let owner = Record::saved("Invoice", "9");

    let blob = Blob::from_data(&ctx, Bytes::from_static(b"obsolete"), "draft.pdf");
    blob.attach(&owner, "Draft");
    owner.signals().pre_save.emit().await.expect("owner save");

    let on_disk = dir.path().join("Invoice.Draft").join("9");
    assert!(on_disk.exists());

    owner.signals().pre_delete.emit().await.expect("owner delete");
    assert!(!on_disk.exists());
    assert!(blob.is_empty().await.expect("is_empty after delete"));
}

#[tokio::test]
async fn test_folder_routing_across_two_roots() {
    let primary = tempfile::tempdir().expect("temp dir");
    let archive = tempfile::tempdir().expect("temp dir");

    let primary_provider =
        OpendalProvider::from_backend(&StorageBackend::local_fs(primary.path()))
            .expect("local backend should build");
    let archive_provider =
        OpendalProvider::from_backend(&StorageBackend::local_fs(archive.path()))
            .expect("local backend should build");
    let registry =
        ProviderRegistry::new(Arc::new(primary_provider) as Arc<dyn StorageProvider>)
            .with_folder(
                "Claim.Evidence",
                Arc::new(archive_provider) as Arc<dyn StorageProvider>,
            );
    let ctx = Arc::new(BlobContext::new(registry, BlobConfig::new()));

    let invoice = Record::saved("Invoice", "1");
    let scan = Blob::from_data(&ctx, Bytes::from_static(b"scan"), "scan.pdf");
    scan.attach(&invoice, "Scan");
    invoice.signals().pre_save.emit().await.expect("owner save");

    let claim = Record::saved("Claim", "2");
    let evidence = Blob::from_data(&ctx, Bytes::from_static(b"photo"), "photo.jpg");
    evidence.attach(&claim, "Evidence");
    claim.signals().pre_save.emit().await.expect("owner save");

    assert!(primary.path().join("Invoice.Scan").join("1").exists());
    assert!(archive.path().join("Claim.Evidence").join("2").exists());
    assert!(!primary.path().join("Claim.Evidence").exists());
}
