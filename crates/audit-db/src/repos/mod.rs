//! Repository modules implementing operations for every audit record.
//!
//! Each module adds methods to `AuditService` via `impl AuditService` blocks.
//! Shared plumbing for reads, dynamic updates, and pivot rows lives here.

pub mod assessment;
pub mod attribute;
pub mod attribute_valueset;
pub mod existing;
pub mod existing_attribute_value;
pub mod item_type;
pub mod location;
pub mod site;
pub mod type_attribute;
pub mod valueset;
pub mod valueset_value;

use audit_core::enums::EntityKind;
use chrono::Utc;
use libsql::{Row, Value};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, entity_table, get_bool, get_uuid, text, timestamp, uuid};
use crate::service::AuditService;

/// Converts one result row into a record.
pub(crate) type RowMapper<T> = fn(&Row) -> Result<T, DatabaseError>;

/// A pivot or value row located by its unique pair.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairRow {
    pub id: Uuid,
    pub trashed: bool,
}

impl AuditService {
    pub(crate) async fn fetch_optional<T>(
        &self,
        sql: &str,
        params: Vec<Value>,
        map: RowMapper<T>,
    ) -> Result<Option<T>, DatabaseError> {
        let mut rows = self.db().query(sql, params).await?;
        rows.next().await?.map(|row| map(&row)).transpose()
    }

    pub(crate) async fn fetch_all<T>(
        &self,
        sql: &str,
        params: Vec<Value>,
        map: RowMapper<T>,
    ) -> Result<Vec<T>, DatabaseError> {
        let mut rows = self.db().query(sql, params).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(map(&row)?);
        }
        Ok(records)
    }

    /// Load a live record by id, or fail with `NotFound`.
    pub(crate) async fn fetch_live<T>(
        &self,
        kind: EntityKind,
        columns: &str,
        id: Uuid,
        map: RowMapper<T>,
    ) -> Result<T, DatabaseError> {
        let sql = format!(
            "SELECT {columns} FROM {} WHERE id = ?1 AND deleted_at IS NULL",
            entity_table(kind)
        );
        self.fetch_optional(&sql, vec![uuid(id)], map)
            .await?
            .ok_or_else(|| DatabaseError::not_found(kind, id))
    }

    /// Run a dynamic UPDATE against a live record.
    pub(crate) async fn apply_update(
        &self,
        kind: EntityKind,
        id: Uuid,
        set: SetClause,
    ) -> Result<(), DatabaseError> {
        let (sql, params) = set.finish(entity_table(kind), id, Utc::now());
        if self.db().execute(&sql, params).await? == 0 {
            return Err(DatabaseError::not_found(kind, id));
        }
        Ok(())
    }

    /// Find the row holding a unique `(a, b)` pair, live or trashed.
    pub(crate) async fn find_pair(
        &self,
        kind: EntityKind,
        (column_a, a): (&str, Uuid),
        (column_b, b): (&str, Uuid),
    ) -> Result<Option<PairRow>, DatabaseError> {
        let sql = format!(
            "SELECT id, deleted_at IS NOT NULL FROM {} WHERE {column_a} = ?1 AND {column_b} = ?2",
            entity_table(kind)
        );
        self.fetch_optional(&sql, vec![uuid(a), uuid(b)], |row| {
            Ok(PairRow {
                id: get_uuid(row, 0)?,
                trashed: get_bool(row, 1)?,
            })
        })
        .await
    }

    /// Clear `deleted_at` on a single row and apply `set` alongside.
    pub(crate) async fn revive(
        &self,
        kind: EntityKind,
        id: Uuid,
        mut set: SetClause,
    ) -> Result<(), DatabaseError> {
        set.set("deleted_at", Value::Null);
        set.set("updated_at", text(timestamp(Utc::now())));
        let (sets, mut params) = set.into_parts();
        params.push(uuid(id));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            entity_table(kind),
            sets.join(", "),
            params.len()
        );
        self.db().execute(&sql, params).await?;
        Ok(())
    }
}
