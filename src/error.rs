//! Error types for serializable entities.
//!
//! Every failure is reported through [`SerializableError`]. Nothing is retried
//! or recovered internally: an error aborts the construct, access, serialize
//! or deserialize call that raised it.

use thiserror::Error;

/// Errors raised by entity construction, attribute access and (de)serialization.
#[derive(Debug, Error)]
pub enum SerializableError {
    /// The name is not among the type's declared attributes.
    #[error("{attribute} is not a member of {object_type}")]
    UnknownAttribute {
        /// Qualified name of the entity type.
        object_type: String,
        /// The undeclared name.
        attribute: String,
    },

    /// A value does not match the attribute's declared type.
    #[error("{attribute} should be an instance of {expected}, got {actual}")]
    SchemaTypeMismatch {
        /// Attribute being assigned or read.
        attribute: String,
        /// Declared type.
        expected: String,
        /// Type (or value) found instead.
        actual: String,
    },

    /// Input is not a two-field `{object_type, data}` document.
    #[error("Not a valid serialized object: {reason}")]
    InvalidDocumentShape {
        /// What is wrong with the shape.
        reason: String,
    },

    /// The document describes a different type than the target entity.
    #[error("Document describes {actual}, but the target object is {expected}")]
    ObjectTypeMismatch {
        /// Qualified name of the target entity's type.
        expected: String,
        /// `object_type` of the document.
        actual: String,
    },

    /// A qualified name is malformed or not registered.
    #[error("Cannot resolve type '{name}': {reason}")]
    UnresolvableType {
        /// The name as given.
        name: String,
        /// Why resolution failed.
        reason: String,
    },

    /// An operation has no default and was not overridden.
    #[error("{operation} is not implemented for this object")]
    NotImplemented {
        /// Name of the operation.
        operation: &'static str,
    },

    /// JSON text could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SerializableError {
    pub(crate) fn unknown_attribute(object_type: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            object_type: object_type.into(),
            attribute: attribute.into(),
        }
    }

    pub(crate) fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidDocumentShape {
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolvable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvableType {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error comes from the attribute contract
    /// (unknown attribute or schema type mismatch).
    #[must_use]
    pub const fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAttribute { .. } | Self::SchemaTypeMismatch { .. }
        )
    }

    /// Returns true if the error comes from a malformed or foreign document.
    #[must_use]
    pub const fn is_document_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDocumentShape { .. }
                | Self::ObjectTypeMismatch { .. }
                | Self::UnresolvableType { .. }
                | Self::Json(_)
        )
    }
}

/// Result type alias for serializable operations.
pub type Result<T> = std::result::Result<T, SerializableError>;
