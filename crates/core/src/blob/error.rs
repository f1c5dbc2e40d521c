//! Blob error types.

use std::str::Utf8Error;

use thiserror::Error;

use crate::storage::StorageError;

/// Blob operation errors.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Content was explicitly set to an empty value.
    #[error("blob content cannot be set to an empty value")]
    EmptyContent,

    /// A read-only clone was requested without attaching it.
    #[error("a read-only clone can only be created when attaching")]
    ReadonlyWithoutAttach,

    /// The operation requires an attached owner with an identifier.
    #[error("blob is not attached to a saved owner record")]
    NotAttached,

    /// A reference string did not have the `Type/Id/Property` shape.
    #[error("malformed blob reference '{reference}': expected Type/Id/Property")]
    MalformedReference {
        /// The offending reference string.
        reference: String,
    },

    /// The referenced owner type has no registered loader.
    #[error("owner type '{type_name}' is not registered")]
    UnknownOwnerType {
        /// The unregistered type name.
        type_name: String,
    },

    /// No record with the referenced identifier exists.
    #[error("no '{type_name}' record with id '{id}'")]
    RecordNotFound {
        /// Owner type name.
        type_name: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// The owner type has no blob property with the referenced name.
    #[error("type '{type_name}' has no blob property '{property}'")]
    UnknownProperty {
        /// Owner type name.
        type_name: String,
        /// Property name that was looked up.
        property: String,
    },

    /// Content is not valid UTF-8 text.
    #[error("the content of {context} is not readable text")]
    NotText {
        /// Which blob the content belongs to.
        context: String,
        /// The decode failure.
        #[source]
        source: Utf8Error,
    },

    /// Record lookup failed in the entity layer.
    #[error("repository error: {0}")]
    Repository(String),

    /// Physical storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl BlobError {
    /// Create a malformed reference error.
    #[must_use]
    pub fn malformed_reference(reference: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.into(),
        }
    }

    /// Create an unknown owner type error.
    #[must_use]
    pub fn unknown_owner_type(type_name: impl Into<String>) -> Self {
        Self::UnknownOwnerType {
            type_name: type_name.into(),
        }
    }

    /// Create a record not found error.
    #[must_use]
    pub fn record_not_found(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    /// Create an unknown property error.
    #[must_use]
    pub fn unknown_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    /// Create a text decode error.
    #[must_use]
    pub fn not_text(context: impl Into<String>, source: Utf8Error) -> Self {
        Self::NotText {
            context: context.into(),
            source,
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
