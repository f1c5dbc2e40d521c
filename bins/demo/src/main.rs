//! Satchel attachment demo.
//!
//! Wires a storage backend from settings, attaches a blob to a record,
//! and drives the record through its save, reload, and delete
//! lifecycle.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use satchel_core::owner::{KeyAssignment, LifecycleSignals, OwnerDescriptor, OwnerRecord};
use satchel_core::storage::{ProviderRegistry, StorageProvider};
use satchel_core::{Blob, BlobContext};
use satchel_store::{OpendalProvider, StoreSettings};

/// Invoice record with a natural identifier, driving its own signals
/// the way an entity layer would.
struct Invoice {
    descriptor: OwnerDescriptor,
    number: String,
    signals: LifecycleSignals,
}

impl Invoice {
    fn new(number: &str) -> Self {
        Self {
            descriptor: OwnerDescriptor::new("Invoice", KeyAssignment::External),
            number: number.to_string(),
            signals: LifecycleSignals::new(),
        }
    }
}

impl OwnerRecord for Invoice {
    fn descriptor(&self) -> &OwnerDescriptor {
        &self.descriptor
    }

    fn record_id(&self) -> Option<String> {
        Some(self.number.clone())
    }

    fn signals(&self) -> &LifecycleSignals {
        &self.signals
    }

    fn blob_property(&self, _name: &str) -> Option<Blob> {
        None
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "satchel=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = StoreSettings::load().expect("Failed to load configuration");

    // Wire the storage provider
    let provider = OpendalProvider::from_backend(&settings.storage)?;
    info!(
        backend = provider.backend(),
        bucket = settings.storage.bucket(),
        "Storage provider ready"
    );
    let registry = ProviderRegistry::new(Arc::new(provider) as Arc<dyn StorageProvider>);
    let ctx = Arc::new(BlobContext::new(registry, settings.blob));

    // Attach a scanned receipt to an invoice
    let invoice: Arc<dyn OwnerRecord> = Arc::new(Invoice::new("INV-1001"));
    let scan = Blob::from_data(&ctx, Bytes::from_static(b"%PDF-1.7 demo receipt"), "receipt.pdf");
    scan.attach(&invoice, "Scan");

    // Saving the invoice persists the attachment first
    invoice.signals().pre_save.emit().await?;
    info!(url = ?scan.url(), "Invoice saved with its scan");

    // A rehydrated handle loads the same bytes back from storage
    let rehydrated = Blob::with_name(&ctx, "receipt.pdf");
    rehydrated.attach(&invoice, "Scan");
    let content = rehydrated.content().await?;
    info!(bytes = content.len(), "Scan reloaded through the provider");

    // Deleting the invoice purges the stored file
    invoice.signals().pre_delete.emit().await?;
    info!(
        empty = rehydrated.is_empty().await?,
        "Invoice deleted, attachment purged"
    );

    Ok(())
}
