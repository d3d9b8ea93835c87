//! Service layer owning the database handle, the contract registry, and the
//! derived-field strategy.
//!
//! `AuditService` wraps `AuditDb` (raw database access) and `SchemaRegistry`
//! (contract validation). All repo methods are implemented as
//! `impl AuditService` blocks in [`crate::repos`].

use std::sync::Arc;

use audit_config::AuditConfig;
use audit_core::enums::EntityKind;
use audit_schema::SchemaRegistry;
use tracing::info;
use uuid::Uuid;

use crate::AuditDb;
use crate::derived::{DefaultDerivedFields, DerivedFields};
use crate::error::DatabaseError;
use crate::helpers::{entity_table, uuid};

/// Behavior switches read from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Check attribute values against the attribute's declared data type.
    pub enforce_attribute_data_type: bool,
}

/// Validates and persists audit records.
///
/// Every mutation follows the same protocol:
/// 1. Check the payload against its contract (nothing is written on failure)
/// 2. Check that referenced parents exist and are live
/// 3. Execute SQL, inside a savepoint when more than one statement is involved
/// 4. Re-read and return the stored record
pub struct AuditService {
    db: AuditDb,
    schema: SchemaRegistry,
    derived: Arc<dyn DerivedFields>,
    options: ServiceOptions,
}

impl AuditService {
    /// Open a service over a local database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the
    /// contract registry cannot be built.
    pub async fn open_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = AuditDb::open_local(db_path).await?;
        Self::from_db(db)
    }

    /// Open the database named by `config` and apply its validation switches.
    ///
    /// # Errors
    ///
    /// Same as [`open_local`](Self::open_local).
    pub async fn from_config(config: &AuditConfig) -> Result<Self, DatabaseError> {
        let service = Self::open_local(&config.database.path).await?;
        info!(path = %config.database.path, "database opened");
        Ok(service.with_options(ServiceOptions {
            enforce_attribute_data_type: config.validation.enforce_attribute_data_type,
        }))
    }

    /// Wrap an already-open database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Schema` if the contract registry cannot be built.
    pub fn from_db(db: AuditDb) -> Result<Self, DatabaseError> {
        Ok(Self {
            db,
            schema: SchemaRegistry::new()?,
            derived: Arc::new(DefaultDerivedFields),
            options: ServiceOptions::default(),
        })
    }

    /// Replace the derived-field strategy.
    #[must_use]
    pub fn with_derived_fields(mut self, derived: impl DerivedFields + 'static) -> Self {
        self.derived = Arc::new(derived);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &AuditDb {
        &self.db
    }

    /// Access the schema registry.
    #[must_use]
    pub const fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    #[must_use]
    pub const fn options(&self) -> ServiceOptions {
        self.options
    }

    pub(crate) fn derived(&self) -> &dyn DerivedFields {
        self.derived.as_ref()
    }

    /// Fail with `NotFound` unless `id` names a live record of `kind`.
    pub(crate) async fn ensure_live(&self, kind: EntityKind, id: Uuid) -> Result<(), DatabaseError> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE id = ?1 AND deleted_at IS NULL",
            entity_table(kind)
        );
        if self.db.exists(&sql, vec![uuid(id)]).await? {
            Ok(())
        } else {
            Err(DatabaseError::not_found(kind, id))
        }
    }
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
