//! Owner type descriptors.

/// How an owner type's primary identifier is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAssignment {
    /// The identifier exists before the first save (UUID or natural keys).
    External,
    /// The identifier is handed out by the database on insert.
    Database,
}

/// Static description of an owner record type.
///
/// Drives how attachments bind to the type's lifecycle: the key
/// assignment decides whether blobs persist before or after the owner
/// row is written, and soft-deleting types keep their stored blobs
/// when a record is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerDescriptor {
    type_name: String,
    key_assignment: KeyAssignment,
    soft_delete: bool,
}

impl OwnerDescriptor {
    /// Describe an owner type.
    #[must_use]
    pub fn new(type_name: impl Into<String>, key_assignment: KeyAssignment) -> Self {
        Self {
            type_name: type_name.into(),
            key_assignment,
            soft_delete: false,
        }
    }

    /// Mark the type as soft-deleting.
    #[must_use]
    pub fn with_soft_delete(mut self) -> Self {
        self.soft_delete = true;
        self
    }

    /// The type name, as used in folder names and references.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// How identifiers of this type are assigned.
    #[must_use]
    pub fn key_assignment(&self) -> KeyAssignment {
        self.key_assignment
    }

    /// Whether deletes of this type are soft.
    #[must_use]
    pub fn is_soft_delete(&self) -> bool {
        self.soft_delete
    }
}
