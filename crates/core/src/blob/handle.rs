//! The blob handle.

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bytes::Bytes;
use mime_guess::Mime;
use tracing::debug;
use uuid::Uuid;

use crate::context::BlobContext;
use crate::owner::{OwnerRecord, RecordRegistry, SignalKind, SubscriptionId};
use crate::safety;
use crate::storage::BlobLocation;

use super::error::BlobError;
use super::reference::BlobReference;

/// Sentinel file name reported by handles that carry no real file.
pub const EMPTY_FILE_NAME: &str = "NoFile.Empty";

/// Owner binding recorded on a handle.
///
/// The record reference is weak; owners hold their blobs strongly
/// (through signal subscriptions), never the other way around.
struct Binding {
    record: Weak<dyn OwnerRecord>,
    property: String,
    subscriptions: Vec<(SignalKind, SubscriptionId)>,
}

struct State {
    data: Option<Bytes>,
    file_name: Option<String>,
    folder_override: Option<String>,
    has_confirmed_value: bool,
    binding: Option<Binding>,
}

struct Inner {
    ctx: Arc<BlobContext>,
    is_empty_marker: bool,
    state: Mutex<State>,
}

/// Handle to one binary attachment.
///
/// Cloning the value clones the handle: both clones share state and
/// identity. Content stays in physical storage until first use; the
/// handle caches loaded bytes and a sticky existence confirmation for
/// its lifetime. Equality between handles is identity (or mutual
/// emptiness), never a content comparison.
#[derive(Clone)]
pub struct Blob {
    inner: Arc<Inner>,
}

impl Blob {
    /// A handle with no file name and no data.
    #[must_use]
    pub fn new(ctx: &Arc<BlobContext>) -> Self {
        Self::build(ctx, false, None, None)
    }

    /// The canonical empty marker.
    ///
    /// Assigning it to an owner property and saving the owner deletes
    /// any previously stored content for that property.
    #[must_use]
    pub fn empty(ctx: &Arc<BlobContext>) -> Self {
        Self::build(ctx, true, None, Some(EMPTY_FILE_NAME.to_string()))
    }

    /// A named handle with no loaded data.
    ///
    /// Used when rehydrating a record whose stored column only holds
    /// the file name; content loads lazily from the provider.
    #[must_use]
    pub fn with_name(ctx: &Arc<BlobContext>, file_name: impl Into<String>) -> Self {
        let file_name = sanitize_file_name(&file_name.into());
        Self::build(ctx, false, None, file_name)
    }

    /// A handle holding in-memory content.
    #[must_use]
    pub fn from_data(
        ctx: &Arc<BlobContext>,
        data: impl Into<Bytes>,
        file_name: impl Into<String>,
    ) -> Self {
        let file_name = sanitize_file_name(&file_name.into());
        Self::build(ctx, false, Some(data.into()), file_name)
    }

    fn build(
        ctx: &Arc<BlobContext>,
        is_empty_marker: bool,
        data: Option<Bytes>,
        file_name: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx: Arc::clone(ctx),
                is_empty_marker,
                state: Mutex::new(State {
                    data,
                    file_name,
                    folder_override: None,
                    has_confirmed_value: false,
                    binding: None,
                }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The environment this handle was created with.
    #[must_use]
    pub fn context(&self) -> &Arc<BlobContext> {
        &self.inner.ctx
    }

    /// Whether this handle is the canonical empty marker.
    #[must_use]
    pub fn is_empty_marker(&self) -> bool {
        self.inner.is_empty_marker
    }

    // ---- names and folders ----------------------------------------------

    /// The file name, or [`EMPTY_FILE_NAME`] when none is set.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.state()
            .file_name
            .clone()
            .unwrap_or_else(|| EMPTY_FILE_NAME.to_string())
    }

    /// Rename the file. The name is sanitized like at construction.
    pub fn set_file_name(&self, file_name: impl Into<String>) {
        self.state().file_name = sanitize_file_name(&file_name.into());
    }

    /// The file extension including its leading dot, or an empty
    /// string when the handle is unnamed or the name has no extension.
    #[must_use]
    pub fn file_extension(&self) -> String {
        match self.state().file_name.as_deref() {
            None => String::new(),
            Some(name) => extension_of(name),
        }
    }

    /// The file name with its extension removed.
    #[must_use]
    pub fn file_name_without_extension(&self) -> String {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) => name[..idx].to_string(),
            None => name,
        }
    }

    /// The logical folder the blob belongs to.
    ///
    /// Computed fresh on every call: an explicit override wins, then
    /// `{OwnerType}.{property}` for a bound handle, then the bare
    /// property name when the owner is gone, then the empty string.
    #[must_use]
    pub fn folder_name(&self) -> String {
        let state = self.state();
        if let Some(folder) = &state.folder_override {
            return folder.clone();
        }
        match &state.binding {
            Some(binding) => match binding.record.upgrade() {
                Some(record) => {
                    format!("{}.{}", record.descriptor().type_name(), binding.property)
                }
                None => binding.property.clone(),
            },
            None => String::new(),
        }
    }

    /// Override the logical folder.
    pub fn set_folder_name(&self, folder: impl Into<String>) {
        self.state().folder_override = Some(folder.into());
    }

    // ---- ownership -------------------------------------------------------

    /// The owning record, while it is alive.
    #[must_use]
    pub fn owner(&self) -> Option<Arc<dyn OwnerRecord>> {
        self.state()
            .binding
            .as_ref()
            .and_then(|binding| binding.record.upgrade())
    }

    /// The property name this blob is bound to on its owner.
    #[must_use]
    pub fn owner_property(&self) -> Option<String> {
        self.state()
            .binding
            .as_ref()
            .map(|binding| binding.property.clone())
    }

    /// The owner's record identifier, once assigned.
    #[must_use]
    pub fn owner_id(&self) -> Option<String> {
        self.owner().and_then(|record| record.record_id())
    }

    /// Bind to an owner property, wiring lifecycle persistence.
    ///
    /// Convenience for [`AttachmentBinder::attach`](super::AttachmentBinder::attach).
    pub fn attach(&self, owner: &Arc<dyn OwnerRecord>, property: &str) {
        super::AttachmentBinder::attach(self, owner, property);
    }

    /// Drop lifecycle subscriptions, keeping the owner recorded.
    ///
    /// Convenience for [`AttachmentBinder::detach`](super::AttachmentBinder::detach).
    pub fn detach(&self) {
        super::AttachmentBinder::detach(self);
    }

    pub(crate) fn bind(
        &self,
        record: &Arc<dyn OwnerRecord>,
        property: &str,
        subscriptions: Vec<(SignalKind, SubscriptionId)>,
    ) {
        self.state().binding = Some(Binding {
            record: Arc::downgrade(record),
            property: property.to_string(),
            subscriptions,
        });
    }

    pub(crate) fn take_subscriptions(&self) -> Vec<(SignalKind, SubscriptionId)> {
        self.state()
            .binding
            .as_mut()
            .map(|binding| std::mem::take(&mut binding.subscriptions))
            .unwrap_or_default()
    }

    /// Physical location of the stored content, when addressable.
    ///
    /// The object name is the bare owner id: the folder already pins
    /// down the property, and an extension-free key lets a renamed or
    /// cleared attachment keep addressing the object it replaces.
    fn location(&self) -> Option<BlobLocation> {
        let id = self.owner_id()?;
        Some(BlobLocation::new(self.folder_name(), id))
    }

    // ---- content ---------------------------------------------------------

    /// Whether the handle has no content anywhere.
    ///
    /// Layered check: the sticky confirmation short-circuits, then the
    /// empty marker, then the missing or sentinel file name, then a
    /// provider probe (assumed present when existence checks are
    /// costly), then the in-memory buffer. A successful probe records
    /// the confirmation so later calls stay local.
    pub async fn is_empty(&self) -> Result<bool, BlobError> {
        {
            let state = self.state();
            if state.has_confirmed_value {
                return Ok(false);
            }
            if self.inner.is_empty_marker {
                return Ok(true);
            }
            match state.file_name.as_deref() {
                None => return Ok(true),
                Some(name) if name == EMPTY_FILE_NAME => return Ok(true),
                Some(_) => {}
            }
        }

        if let Some(at) = self.location() {
            let provider = self.inner.ctx.provider(&at.folder);
            if provider.costs_to_check_existence() || provider.exists(&at).await? {
                self.state().has_confirmed_value = true;
                return Ok(false);
            }
        }

        Ok(self.state().data.as_ref().is_none_or(Bytes::is_empty))
    }

    /// Whether the handle has content. The negation of [`is_empty`](Self::is_empty).
    pub async fn has_value(&self) -> Result<bool, BlobError> {
        Ok(!self.is_empty().await?)
    }

    /// The content bytes.
    ///
    /// Empty handles yield empty bytes. Otherwise cached data is
    /// returned, or the provider is consulted once and the result
    /// cached for the handle lifetime. Concurrent first reads may load
    /// redundantly; the cache converges on one buffer.
    pub async fn content(&self) -> Result<Bytes, BlobError> {
        if self.is_empty().await? {
            return Ok(Bytes::new());
        }
        if let Some(data) = self.state().data.clone() {
            if !data.is_empty() {
                return Ok(data);
            }
        }
        let Some(at) = self.location() else {
            return Ok(Bytes::new());
        };
        let provider = self.inner.ctx.provider(&at.folder);
        let data = provider.load(&at).await?;
        self.state().data = Some(data.clone());
        Ok(data)
    }

    /// The content decoded as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Decode failures are reported with the owning record and
    /// property named, never silently replaced.
    pub async fn content_text(&self) -> Result<String, BlobError> {
        let data = self.content().await?;
        match std::str::from_utf8(&data) {
            Ok(text) => Ok(text.to_string()),
            Err(source) => {
                let context = match (self.owner(), self.owner_property()) {
                    (Some(record), Some(property)) => format!(
                        "{}.{} on record {}",
                        record.descriptor().type_name(),
                        property,
                        record.record_id().unwrap_or_else(|| "unsaved".to_string()),
                    ),
                    _ => self.file_name(),
                };
                Err(BlobError::not_text(context, source))
            }
        }
    }

    /// Replace the in-memory content.
    ///
    /// # Errors
    ///
    /// Rejects empty input; clearing stored content goes through the
    /// empty marker or [`delete`](Self::delete) instead.
    pub fn set_content(&self, data: impl Into<Bytes>) -> Result<(), BlobError> {
        let data = data.into();
        if data.is_empty() {
            return Err(BlobError::EmptyContent);
        }
        self.state().data = Some(data);
        Ok(())
    }

    // ---- persistence -----------------------------------------------------

    /// Write in-memory content to the provider.
    ///
    /// Handles with non-empty buffered data are written out. The empty
    /// marker instead deletes previously stored content, reconciling
    /// an explicitly cleared attachment. Anything else is a no-op:
    /// a merely rehydrated handle has nothing new to write.
    pub async fn save(&self) -> Result<(), BlobError> {
        let data = self.state().data.clone();
        match data {
            Some(data) if !data.is_empty() => {
                let Some(at) = self.location() else {
                    return Err(BlobError::NotAttached);
                };
                let provider = self.inner.ctx.provider(&at.folder);
                provider.save(&at, data.clone()).await?;
                debug!(key = %at.key(), bytes = data.len(), "blob saved");
                Ok(())
            }
            _ if self.inner.is_empty_marker => self.delete().await,
            _ => Ok(()),
        }
    }

    /// Remove stored content and forget cached state.
    ///
    /// Idempotent: deleting an already-empty blob still issues the
    /// provider delete, which must tolerate missing objects.
    ///
    /// # Errors
    ///
    /// Fails with [`BlobError::NotAttached`] when there is no owner
    /// with an assigned identifier to address the content by.
    pub async fn delete(&self) -> Result<(), BlobError> {
        let Some(at) = self.location() else {
            return Err(BlobError::NotAttached);
        };
        let provider = self.inner.ctx.provider(&at.folder);
        provider.delete(&at).await?;
        let mut state = self.state();
        state.data = None;
        state.has_confirmed_value = false;
        debug!(key = %at.key(), "blob deleted");
        Ok(())
    }

    // ---- copies ----------------------------------------------------------

    /// Deep-copy the handle.
    ///
    /// With `attach`, the copy takes over the owner binding: the
    /// original is detached first and the copy subscribes in its
    /// place. With `attach` and `readonly`, the copy records the owner
    /// and property without lifecycle subscriptions, so it derives
    /// URLs but never persists. An unowned source is copied as plain
    /// data, and the flags have no effect.
    ///
    /// # Errors
    ///
    /// `readonly` without `attach` is rejected. Loading the source
    /// content may fail.
    pub async fn clone_with(&self, attach: bool, readonly: bool) -> Result<Self, BlobError> {
        if readonly && !attach {
            return Err(BlobError::ReadonlyWithoutAttach);
        }

        let Some(record) = self.owner() else {
            let (data, file_name) = {
                let state = self.state();
                (state.data.clone(), state.file_name.clone())
            };
            return Ok(Self::build(
                &self.inner.ctx,
                self.inner.is_empty_marker,
                data,
                file_name,
            ));
        };

        // Load through the provider so the copy shares nothing with
        // the original afterwards.
        let data = self.content().await?;
        let file_name = self.state().file_name.clone();
        let copy = Self::build(
            &self.inner.ctx,
            self.inner.is_empty_marker,
            Some(data),
            file_name,
        );

        if attach {
            let property = self.owner_property().unwrap_or_default();
            if readonly {
                copy.bind(&record, &property, Vec::new());
            } else {
                super::AttachmentBinder::detach(self);
                super::AttachmentBinder::attach(&copy, &record, &property);
            }
        }
        Ok(copy)
    }

    /// This handle when it has content, otherwise `other`.
    pub async fn or(&self, other: &Self) -> Result<Self, BlobError> {
        if self.is_empty().await? {
            Ok(other.clone())
        } else {
            Ok(self.clone())
        }
    }

    // ---- URLs and references ---------------------------------------------

    /// Public URL of the stored content, `None` without a live owner.
    ///
    /// Composed as `{base_url}{folder}/{owner_id}{extension}`; an
    /// owner without an assigned identifier renders as an empty id.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        self.owner()?;
        let id = self.owner_id().unwrap_or_default();
        Some(format!(
            "{}{}/{}{}",
            self.inner.ctx.base_url(),
            self.folder_name(),
            id,
            self.file_extension(),
        ))
    }

    /// [`url`](Self::url) with a random query parameter appended, so
    /// a fresh value always bypasses HTTP caches.
    #[must_use]
    pub fn cache_safe_url(&self) -> Option<String> {
        let url = self.url()?;
        let separator = if url.contains('?') { '&' } else { '?' };
        Some(format!("{url}{separator}RANDOM={}", Uuid::new_v4()))
    }

    /// The fallback when this handle is empty, otherwise [`url`](Self::url).
    pub async fn url_or(&self, fallback: &str) -> Result<Option<String>, BlobError> {
        if self.is_empty().await? {
            return Ok(Some(fallback.to_string()));
        }
        Ok(self.url())
    }

    /// The `Type/Id/Property` reference of an attached handle, once
    /// the owner has an identifier.
    #[must_use]
    pub fn reference(&self) -> Option<String> {
        let record = self.owner()?;
        let id = record.record_id()?;
        let property = self.owner_property()?;
        Some(
            BlobReference {
                type_name: record.descriptor().type_name().to_string(),
                id,
                property,
            }
            .to_string(),
        )
    }

    /// Resolve a `Type/Id/Property` reference to the live blob
    /// property of a stored record.
    ///
    /// # Errors
    ///
    /// Distinguishes a malformed reference, an unregistered owner
    /// type, a missing record, and an unknown property.
    pub async fn from_reference(
        records: &RecordRegistry,
        reference: &str,
    ) -> Result<Self, BlobError> {
        let parsed = BlobReference::parse(reference)?;
        let loader = records
            .loader(&parsed.type_name)
            .ok_or_else(|| BlobError::unknown_owner_type(&parsed.type_name))?;
        let record = loader
            .load(&parsed.id)
            .await?
            .ok_or_else(|| BlobError::record_not_found(&parsed.type_name, &parsed.id))?;
        record
            .blob_property(&parsed.property)
            .ok_or_else(|| BlobError::unknown_property(&parsed.type_name, &parsed.property))
    }

    // ---- classification --------------------------------------------------

    /// MIME type guessed from the file extension.
    ///
    /// Unknown extensions map to `application/octet-stream`.
    #[must_use]
    pub fn mime_type(&self) -> Mime {
        mime_guess::from_path(self.file_name()).first_or_octet_stream()
    }

    /// Whether the content is audio or video, by extension.
    #[must_use]
    pub fn is_media(&self) -> bool {
        let mime = self.mime_type();
        mime.type_() == mime_guess::mime::AUDIO || mime.type_() == mime_guess::mime::VIDEO
    }

    /// Whether the file name carries a deny-listed extension.
    ///
    /// Advisory only; no operation is blocked by the verdict.
    #[must_use]
    pub fn has_unsafe_extension(&self) -> bool {
        safety::is_unsafe_extension(&self.file_name())
    }

    // ---- comparisons -----------------------------------------------------

    /// Whether two handles are the same attachment.
    ///
    /// True for the same handle instance and for two empty handles;
    /// distinct non-empty handles are never equal, whatever their
    /// content.
    pub async fn equals(&self, other: &Self) -> Result<bool, BlobError> {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return Ok(true);
        }
        Ok(self.is_empty().await? && other.is_empty().await?)
    }

    /// Order two handles.
    ///
    /// Empty handles sort first. Non-empty handles order by in-memory
    /// buffer length only, with unloaded buffers before loaded ones.
    /// The ordering is deliberately weak; it exists for stable sorts
    /// of attachment lists, not content comparison.
    pub async fn compare(&self, other: &Self) -> Result<Ordering, BlobError> {
        let self_empty = self.is_empty().await?;
        let other_empty = other.is_empty().await?;
        match (self_empty, other_empty) {
            (true, true) => Ok(Ordering::Equal),
            (true, false) => Ok(Ordering::Less),
            (false, true) => Ok(Ordering::Greater),
            (false, false) => {
                let lhs = self.state().data.as_ref().map(Bytes::len);
                let rhs = other.state().data.as_ref().map(Bytes::len);
                Ok(lhs.cmp(&rhs))
            }
        }
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Blob")
            .field("file_name", &state.file_name)
            .field("bytes", &state.data.as_ref().map(Bytes::len))
            .field("attached", &state.binding.is_some())
            .field("empty_marker", &self.inner.is_empty_marker)
            .finish()
    }
}

/// Make a file name safe for storage paths.
///
/// ASCII alphanumerics, dots, hyphens, and underscores pass through;
/// every other character becomes an underscore. Empty input yields
/// `None`, which the handle reports as [`EMPTY_FILE_NAME`].
pub(crate) fn sanitize_file_name(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect(),
    )
}

/// The extension of a file name including its leading dot, or an
/// empty string when there is none.
fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => name[idx..].to_string(),
        _ => String::new(),
    }
}
