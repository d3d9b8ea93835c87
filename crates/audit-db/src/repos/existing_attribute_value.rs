//! Attribute values recorded on existing items.
//!
//! One value per `(existing_id, attribute_id)` pair. Every write refreshes
//! the owning item's derived fields.

use audit_core::entities::{
    ExistingAttributeValue, ExistingAttributeValueUpdate, NewExistingAttributeValue,
};
use audit_core::enums::{DataType, EntityKind};
use audit_core::ids::new_id;
use audit_schema::{FieldError, ValidationErrors};
use chrono::Utc;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, get_opt_string, get_uuid, parse_datetime, parse_optional_datetime, text, timestamp,
    uuid,
};
use crate::service::AuditService;

const COLUMNS: &str =
    "id, existing_id, attribute_id, value, created_at, updated_at, deleted_at";

fn row_to_value(row: &libsql::Row) -> Result<ExistingAttributeValue, DatabaseError> {
    Ok(ExistingAttributeValue {
        id: get_uuid(row, 0)?,
        existing_id: get_uuid(row, 1)?,
        attribute_id: get_uuid(row, 2)?,
        value: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
    })
}

/// Reject `value` unless `data_type` accepts it.
pub(crate) fn check_value_type(data_type: DataType, value: &str) -> Result<(), DatabaseError> {
    if data_type.accepts(value) {
        return Ok(());
    }
    Err(DatabaseError::Validation(ValidationErrors::from(vec![
        FieldError::new("/value", format!("{value:?} is not a valid {data_type} value")),
    ])))
}

impl AuditService {
    async fn check_attribute_value(&self, attribute_id: Uuid, value: &str) -> Result<(), DatabaseError> {
        let attribute = self.get_attribute(attribute_id).await?;
        if self.options().enforce_attribute_data_type {
            check_value_type(attribute.data_type, value)?;
        }
        Ok(())
    }

    /// Record a value. A pair that already exists, even soft-deleted, is a
    /// uniqueness violation; use [`set_attribute_value`](Self::set_attribute_value)
    /// to upsert.
    pub async fn create_existing_attribute_value(
        &self,
        new: NewExistingAttributeValue,
    ) -> Result<ExistingAttributeValue, DatabaseError> {
        self.schema().check(&new)?;
        self.ensure_live(EntityKind::Existing, new.existing_id).await?;
        self.check_attribute_value(new.attribute_id, &new.value).await?;

        let id = new_id();
        let write = async {
            self.db()
                .execute(
                    "INSERT INTO existing_attribute_values (id, existing_id, attribute_id, value,
                        created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    vec![
                        uuid(id),
                        uuid(new.existing_id),
                        uuid(new.attribute_id),
                        text(new.value),
                        text(timestamp(Utc::now())),
                    ],
                )
                .await?;
            self.refresh_derived(new.existing_id).await
        };
        self.db().savepoint(write).await?;

        self.get_existing_attribute_value(id).await
    }

    /// Set an item's value for an attribute: updates the live value, revives
    /// a soft-deleted one, or creates it.
    pub async fn set_attribute_value(
        &self,
        existing_id: Uuid,
        attribute_id: Uuid,
        value: impl Into<String>,
    ) -> Result<ExistingAttributeValue, DatabaseError> {
        let new = NewExistingAttributeValue {
            existing_id,
            attribute_id,
            value: value.into(),
        };
        let pair = self
            .find_pair(
                EntityKind::ExistingAttributeValue,
                ("existing_id", existing_id),
                ("attribute_id", attribute_id),
            )
            .await?;
        let Some(pair) = pair else {
            return self.create_existing_attribute_value(new).await;
        };

        self.schema().check(&new)?;
        self.ensure_live(EntityKind::Existing, existing_id).await?;
        self.check_attribute_value(attribute_id, &new.value).await?;

        let mut set = SetClause::new();
        set.set("value", text(new.value));
        let write = async {
            if pair.trashed {
                self.revive(EntityKind::ExistingAttributeValue, pair.id, set)
                    .await?;
            } else {
                self.apply_update(EntityKind::ExistingAttributeValue, pair.id, set)
                    .await?;
            }
            self.refresh_derived(existing_id).await
        };
        self.db().savepoint(write).await?;

        self.get_existing_attribute_value(pair.id).await
    }

    pub async fn get_existing_attribute_value(
        &self,
        id: Uuid,
    ) -> Result<ExistingAttributeValue, DatabaseError> {
        self.fetch_live(EntityKind::ExistingAttributeValue, COLUMNS, id, row_to_value)
            .await
    }

    /// Live values of an item, in the order they were recorded.
    pub async fn existing_attribute_values(
        &self,
        existing_id: Uuid,
    ) -> Result<Vec<ExistingAttributeValue>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM existing_attribute_values
                 WHERE existing_id = ?1 AND deleted_at IS NULL
                 ORDER BY created_at, rowid"
            ),
            vec![uuid(existing_id)],
            row_to_value,
        )
        .await
    }

    /// Live values recorded for an attribute across all items.
    pub async fn list_existing_attribute_values(
        &self,
        attribute_id: Uuid,
    ) -> Result<Vec<ExistingAttributeValue>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM existing_attribute_values
                 WHERE attribute_id = ?1 AND deleted_at IS NULL
                 ORDER BY created_at, rowid"
            ),
            vec![uuid(attribute_id)],
            row_to_value,
        )
        .await
    }

    pub async fn update_existing_attribute_value(
        &self,
        id: Uuid,
        update: ExistingAttributeValueUpdate,
    ) -> Result<ExistingAttributeValue, DatabaseError> {
        self.schema().check(&update)?;
        let current = self.get_existing_attribute_value(id).await?;

        let existing_id = update.existing_id.unwrap_or(current.existing_id);
        let attribute_id = update.attribute_id.unwrap_or(current.attribute_id);
        if existing_id != current.existing_id {
            self.ensure_live(EntityKind::Existing, existing_id).await?;
        }
        if update.value.is_some() || attribute_id != current.attribute_id {
            let value = update.value.as_deref().unwrap_or(&current.value);
            self.check_attribute_value(attribute_id, value).await?;
        }

        let mut set = SetClause::new();
        if let Some(existing_id) = update.existing_id {
            set.set("existing_id", uuid(existing_id));
        }
        if let Some(attribute_id) = update.attribute_id {
            set.set("attribute_id", uuid(attribute_id));
        }
        if let Some(value) = update.value {
            set.set("value", text(value));
        }

        if set.is_empty() {
            return Ok(current);
        }
        let write = async {
            self.apply_update(EntityKind::ExistingAttributeValue, id, set)
                .await?;
            self.refresh_derived(current.existing_id).await?;
            if existing_id == current.existing_id {
                Ok(())
            } else {
                self.refresh_derived(existing_id).await
            }
        };
        self.db().savepoint(write).await?;
        self.get_existing_attribute_value(id).await
    }

    pub async fn delete_existing_attribute_value(&self, id: Uuid) -> Result<(), DatabaseError> {
        let value = self.get_existing_attribute_value(id).await?;
        self.soft_delete(EntityKind::ExistingAttributeValue, id)
            .await?;
        self.refresh_derived(value.existing_id).await
    }

    pub async fn restore_existing_attribute_value(
        &self,
        id: Uuid,
    ) -> Result<ExistingAttributeValue, DatabaseError> {
        self.restore(EntityKind::ExistingAttributeValue, id).await?;
        let value = self.get_existing_attribute_value(id).await?;
        self.refresh_derived(value.existing_id).await?;
        Ok(value)
    }

    pub async fn force_delete_existing_attribute_value(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::ExistingAttributeValue, id)
            .await
    }
}
