//! Physical storage backends for Satchel.
//!
//! Implements the `satchel-core` provider contract on top of Apache
//! OpenDAL, so attachments can live on S3-compatible stores (Cloudflare
//! R2, Supabase, AWS S3), Azure Blob Storage, or the local filesystem,
//! and provides the layered settings applications load at startup.

pub mod config;
pub mod provider;

pub use config::{StorageBackend, StoreSettings};
pub use provider::OpendalProvider;
