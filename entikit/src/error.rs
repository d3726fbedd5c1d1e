//! Error types for schema definition and entity materialization

use thiserror::Error;

/// Result type for entity operations
pub type Result<T> = std::result::Result<T, EntityError>;

/// Errors that can occur while building schemas or working with entities
#[derive(Debug, Error)]
pub enum EntityError {
    /// A required field without a default was absent from the input
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A field name that is not part of the schema
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    /// The same field name declared twice in one schema
    #[error("duplicate field name: {field}")]
    DuplicateField { field: String },

    /// No behavior method with this name is attached to the entity
    #[error("unknown method: {method}")]
    UnknownMethod { method: String },

    /// A stored value could not be converted to the requested Rust type
    #[error("type mismatch on field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Storing the value would make an entity reachable from its own fields
    #[error("cyclic reference: field '{field}' would contain its own entity")]
    CyclicReference { field: String },

    /// Failure raised inside a behavior method body
    #[error(transparent)]
    Behavior(anyhow::Error),

    /// Configuration could not be extracted
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl EntityError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingRequiredField {
            field: field.to_string(),
        }
    }

    pub(crate) fn unknown_field(field: &str) -> Self {
        Self::UnknownField {
            field: field.to_string(),
        }
    }
}

impl From<anyhow::Error> for EntityError {
    fn from(err: anyhow::Error) -> Self {
        // Errors that were already ours travel through behavior methods untouched.
        match err.downcast::<EntityError>() {
            Ok(inner) => inner,
            Err(other) => EntityError::Behavior(other),
        }
    }
}
