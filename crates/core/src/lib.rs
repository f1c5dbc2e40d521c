//! Record-attached binary blobs for Satchel.
//!
//! This crate contains the attachment domain with ZERO storage-backend
//! or database dependencies. A blob handle belongs to an owning record
//! property, loads its content lazily, and rides the owner's save and
//! delete lifecycle; physical storage sits behind a provider contract
//! resolved per logical folder.
//!
//! # Modules
//!
//! - `blob` - Blob handles, lifecycle binding, reference resolution
//! - `owner` - Owner descriptors, lifecycle signals, the record seam
//! - `storage` - Provider contract, folder routing, in-memory provider
//! - `safety` - Advisory unsafe-extension classification
//! - `config` - Blob configuration (base URL, persistence suppression)
//! - `context` - The shared environment handles are constructed with

pub mod blob;
pub mod config;
pub mod context;
pub mod owner;
pub mod safety;
pub mod storage;

pub use blob::{AttachmentBinder, Blob, BlobError, BlobReference, EMPTY_FILE_NAME};
pub use config::BlobConfig;
pub use context::BlobContext;
