//! Blob reference strings.

use std::fmt;

use super::error::BlobError;

/// Parsed `Type/Id/Property` reference to an attached blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobReference {
    /// Owner type name.
    pub type_name: String,
    /// Owner record identifier.
    pub id: String,
    /// Blob property name on the owner type.
    pub property: String,
}

impl BlobReference {
    /// Parse a `Type/Id/Property` reference.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::MalformedReference`] when the string does
    /// not contain exactly three `/`-separated segments.
    pub fn parse(reference: &str) -> Result<Self, BlobError> {
        let mut segments = reference.split('/');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(type_name), Some(id), Some(property), None) => Ok(Self {
                type_name: type_name.to_string(),
                id: id.to_string(),
                property: property.to_string(),
            }),
            _ => Err(BlobError::malformed_reference(reference)),
        }
    }
}

impl fmt::Display for BlobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.type_name, self.id, self.property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_segments() {
        let reference = BlobReference::parse("Invoice/42/Photo").expect("should parse");
        assert_eq!(reference.type_name, "Invoice");
        assert_eq!(reference.id, "42");
        assert_eq!(reference.property, "Photo");
    }

    #[test]
    fn test_parse_rejects_wrong_segment_count() {
        for bad in ["", "Invoice", "Invoice/42", "Invoice/42/Photo/extra"] {
            let err = BlobReference::parse(bad).unwrap_err();
            assert!(
                matches!(err, BlobError::MalformedReference { .. }),
                "expected malformed reference for {bad:?}"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        let reference = BlobReference::parse("Claim/a1b2/Scan").expect("should parse");
        assert_eq!(reference.to_string(), "Claim/a1b2/Scan");
    }
}
