//! Cross-cutting error types for audit records.
//!
//! Domain-specific errors (`SchemaError`, `DatabaseError`) are defined in
//! their respective crates. The CLI converges everything into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any audit crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no live result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A string that should hold a canonical UUID does not.
    #[error("Invalid UUID: {0:?}")]
    InvalidId(String),

    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
