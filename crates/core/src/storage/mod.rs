//! Physical blob storage.
//!
//! Vendor-agnostic provider contract plus folder-based routing:
//!
//! ```text
//! Blob ──► ProviderRegistry::resolve(folder) ──► dyn StorageProvider
//!                                                 ├── MemoryProvider (tests, dev)
//!                                                 └── backend crates (S3, Azure, fs)
//! ```
//!
//! Providers address objects by [`BlobLocation`] and never see owner
//! records or handles.

mod error;
mod memory;
mod provider;
mod registry;

pub use error::StorageError;
pub use memory::MemoryProvider;
pub use provider::{BlobLocation, StorageProvider};
pub use registry::ProviderRegistry;
