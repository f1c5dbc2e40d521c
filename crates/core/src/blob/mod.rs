//! Blob attachments.
//!
//! A [`Blob`] is a handle to one binary attachment on an owning
//! record: lazily loaded content, a sanitized file name, and a logical
//! storage folder derived from the owner. The [`AttachmentBinder`]
//! ties a handle to its owner's lifecycle, so content persists when
//! the record saves and purges when it is deleted.

mod binder;
mod error;
mod handle;
mod reference;

pub use binder::AttachmentBinder;
pub use error::BlobError;
pub use handle::{Blob, EMPTY_FILE_NAME};
pub use reference::BlobReference;
