//! Database error types for audit-db.
//!
//! Storage constraint failures are translated into [`IntegrityViolation`]
//! before they leave this crate; raw `SQLite` messages never reach callers.

use std::fmt;

use audit_core::enums::EntityKind;
use audit_schema::{SchemaError, ValidationErrors};
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Input failed its contract. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The record (or a referenced parent) does not exist or is soft-deleted.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// A storage constraint or delete rule rejected the write.
    #[error("Integrity violation: {0}")]
    Integrity(IntegrityViolation),

    /// The operation is not allowed in the record's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A SQL query failed or returned unreadable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error that is not a constraint failure.
    #[error("libSQL error: {0}")]
    LibSql(libsql::Error),

    /// Schema registry failure other than a validation error.
    #[error("Schema error: {0}")]
    Schema(SchemaError),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A write rejected by a uniqueness, reference, value, or delete rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// A unique index already holds this key.
    Unique { table: String, columns: Vec<String> },
    /// A referenced row does not exist, or a hard delete would orphan rows.
    ForeignKey,
    /// A CHECK constraint (enum, minimum, length) failed.
    Check(String),
    /// Delete refused because live dependents still reference the record.
    Restricted {
        entity: EntityKind,
        dependents: EntityKind,
    },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unique { table, columns } => {
                write!(f, "duplicate {table} ({})", columns.join(", "))
            }
            Self::ForeignKey => f.write_str("referenced record does not exist or is still in use"),
            Self::Check(detail) => write!(f, "value rejected by constraint {detail}"),
            Self::Restricted { entity, dependents } => {
                write!(f, "{entity} still has {dependents} records")
            }
        }
    }
}

impl IntegrityViolation {
    /// Recognize a `SQLite` constraint message.
    fn parse(message: &str) -> Option<Self> {
        if let Some(rest) = after(message, "UNIQUE constraint failed: ") {
            let mut table = String::new();
            let columns = rest
                .split(',')
                .map(|qualified| {
                    let qualified = qualified.trim();
                    match qualified.split_once('.') {
                        Some((t, column)) => {
                            table = t.to_string();
                            column.to_string()
                        }
                        None => qualified.to_string(),
                    }
                })
                .collect();
            return Some(Self::Unique { table, columns });
        }
        if message.contains("FOREIGN KEY constraint failed") {
            return Some(Self::ForeignKey);
        }
        if let Some(rest) = after(message, "CHECK constraint failed: ") {
            return Some(Self::Check(rest.to_string()));
        }
        None
    }
}

/// Text following `marker`, cut at the closing quote libsql wraps messages in.
fn after<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    let start = message.find(marker)? + marker.len();
    let rest = &message[start..];
    let end = rest.find(['`', '"', '\n']).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

impl From<libsql::Error> for DatabaseError {
    fn from(error: libsql::Error) -> Self {
        match IntegrityViolation::parse(&error.to_string()) {
            Some(violation) => Self::Integrity(violation),
            None => Self::LibSql(error),
        }
    }
}

impl From<SchemaError> for DatabaseError {
    fn from(error: SchemaError) -> Self {
        match error {
            SchemaError::ValidationFailed(errors) => Self::Validation(errors),
            other => Self::Schema(other),
        }
    }
}

impl DatabaseError {
    pub(crate) fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this error is a uniqueness violation.
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Integrity(IntegrityViolation::Unique { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_unique_violation() {
        let parsed = IntegrityViolation::parse(
            "SQLite failure: `UNIQUE constraint failed: existing_attribute_values.existing_id, existing_attribute_values.attribute_id`",
        );
        assert_eq!(
            parsed,
            Some(IntegrityViolation::Unique {
                table: "existing_attribute_values".into(),
                columns: vec!["existing_id".into(), "attribute_id".into()],
            })
        );
    }

    #[test]
    fn parses_foreign_key_violation() {
        assert_eq!(
            IntegrityViolation::parse("SQLite failure: `FOREIGN KEY constraint failed`"),
            Some(IntegrityViolation::ForeignKey)
        );
    }

    #[test]
    fn parses_check_violation() {
        assert_eq!(
            IntegrityViolation::parse("CHECK constraint failed: quantity >= 1"),
            Some(IntegrityViolation::Check("quantity >= 1".into()))
        );
    }

    #[test]
    fn other_messages_are_not_violations() {
        assert_eq!(IntegrityViolation::parse("no such table: widgets"), None);
    }

    #[test]
    fn schema_validation_maps_to_validation() {
        let err: DatabaseError = SchemaError::ValidationFailed(ValidationErrors::new()).into();
        assert!(matches!(err, DatabaseError::Validation(_)));
        let err: DatabaseError = SchemaError::NotFound("x".into()).into();
        assert!(matches!(err, DatabaseError::Schema(_)));
    }
}
