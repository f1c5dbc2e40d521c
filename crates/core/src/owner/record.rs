//! Owner record seam.
//!
//! The blob subsystem never talks to an ORM. It sees owner records
//! through [`OwnerRecord`], and reaches stored records only through
//! the loaders an application registers in a [`RecordRegistry`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::blob::{Blob, BlobError};

use super::descriptor::OwnerDescriptor;
use super::signals::LifecycleSignals;

/// A persistable record that can own blob attachments.
///
/// Implemented by the entity layer. Attachments only need the type
/// descriptor, the record identifier, the lifecycle signal hub, and
/// named access to the record's blob properties.
pub trait OwnerRecord: Send + Sync {
    /// Static descriptor of the record's type.
    fn descriptor(&self) -> &OwnerDescriptor;

    /// The record's identifier. `None` until one has been assigned.
    fn record_id(&self) -> Option<String>;

    /// The record's lifecycle signal hub.
    fn signals(&self) -> &LifecycleSignals;

    /// Look up a blob property by name.
    fn blob_property(&self, name: &str) -> Option<Blob>;
}

/// Loads records of one registered owner type by identifier.
#[async_trait::async_trait]
pub trait RecordLoader: Send + Sync {
    /// Load the record with the given identifier, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup itself fails.
    async fn load(&self, id: &str) -> Result<Option<Arc<dyn OwnerRecord>>, BlobError>;
}

/// Registry of owner types resolvable from blob references.
#[derive(Default)]
pub struct RecordRegistry {
    loaders: HashMap<String, Arc<dyn RecordLoader>>,
}

impl RecordRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader for an owner type name, replacing any
    /// previous registration.
    #[must_use]
    pub fn with_type(
        mut self,
        type_name: impl Into<String>,
        loader: Arc<dyn RecordLoader>,
    ) -> Self {
        self.loaders.insert(type_name.into(), loader);
        self
    }

    /// The loader registered for a type name.
    #[must_use]
    pub fn loader(&self, type_name: &str) -> Option<Arc<dyn RecordLoader>> {
        self.loaders.get(type_name).map(Arc::clone)
    }
}
