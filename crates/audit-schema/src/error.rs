//! Schema error types.

use thiserror::Error;

use crate::validate::ValidationErrors;

/// Errors from schema generation, the registry, and payload validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// JSON value did not pass schema validation.
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// Schema generation or compilation error.
    #[error("Schema generation error: {0}")]
    Generation(String),

    /// The generated schema uses a keyword the converter cannot express.
    #[error("Unsupported schema keyword {keyword:?} at {pointer:?}")]
    Unsupported { keyword: String, pointer: String },

    /// A value passed its schema but could not be read into the typed payload.
    #[error("Failed to deserialize {schema}: {message}")]
    Deserialize { schema: String, message: String },
}

impl SchemaError {
    /// The per-field errors, if this is a validation failure.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}
