//! Values inside a valueset.

use audit_core::entities::{NewValuesetValue, ValuesetValue, ValuesetValueUpdate};
use audit_core::enums::EntityKind;
use audit_core::ids::new_id;
use chrono::Utc;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, boolean, get_bool, get_i32, get_opt_string, get_uuid, integer, opt_text,
    parse_datetime, parse_optional_datetime, text, timestamp, uuid,
};
use crate::repos::existing_attribute_value::check_value_type;
use crate::service::AuditService;

const COLUMNS: &str = "id, valueset_id, value, display_label, sort_order, is_active, \
    created_at, updated_at, deleted_at";

fn row_to_valueset_value(row: &libsql::Row) -> Result<ValuesetValue, DatabaseError> {
    Ok(ValuesetValue {
        id: get_uuid(row, 0)?,
        valueset_id: get_uuid(row, 1)?,
        value: row.get(2)?,
        display_label: get_opt_string(row, 3)?,
        sort_order: get_i32(row, 4)?,
        is_active: get_bool(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
    })
}

impl AuditService {
    /// With data-type enforcement on, a NUMBER valueset only accepts
    /// numeric values.
    async fn check_valueset_value(&self, valueset_id: Uuid, value: &str) -> Result<(), DatabaseError> {
        let valueset = self.get_valueset(valueset_id).await?;
        if self.options().enforce_attribute_data_type {
            check_value_type(valueset.data_type, value)?;
        }
        Ok(())
    }

    pub async fn create_valueset_value(
        &self,
        new: NewValuesetValue,
    ) -> Result<ValuesetValue, DatabaseError> {
        self.schema().check(&new)?;
        self.check_valueset_value(new.valueset_id, &new.value).await?;

        let id = new_id();
        self.db()
            .execute(
                "INSERT INTO valueset_values (id, valueset_id, value, display_label, sort_order,
                    is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                vec![
                    uuid(id),
                    uuid(new.valueset_id),
                    text(new.value),
                    opt_text(new.display_label.as_deref()),
                    integer(new.sort_order),
                    boolean(new.is_active),
                    text(timestamp(Utc::now())),
                ],
            )
            .await?;

        self.get_valueset_value(id).await
    }

    pub async fn get_valueset_value(&self, id: Uuid) -> Result<ValuesetValue, DatabaseError> {
        self.fetch_live(EntityKind::ValuesetValue, COLUMNS, id, row_to_valueset_value)
            .await
    }

    /// Live values of a valueset by `sort_order`, then value. With
    /// `active_only`, inactive values are skipped.
    pub async fn valueset_values(
        &self,
        valueset_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<ValuesetValue>, DatabaseError> {
        self.ensure_live(EntityKind::Valueset, valueset_id).await?;
        let active = if active_only { " AND is_active = 1" } else { "" };
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM valueset_values
                 WHERE valueset_id = ?1 AND deleted_at IS NULL{active}
                 ORDER BY sort_order, value, rowid"
            ),
            vec![uuid(valueset_id)],
            row_to_valueset_value,
        )
        .await
    }

    pub async fn update_valueset_value(
        &self,
        id: Uuid,
        update: ValuesetValueUpdate,
    ) -> Result<ValuesetValue, DatabaseError> {
        self.schema().check(&update)?;
        let current = self.get_valueset_value(id).await?;

        if update.valueset_id.is_some() || update.value.is_some() {
            let valueset_id = update.valueset_id.unwrap_or(current.valueset_id);
            let value = update.value.as_deref().unwrap_or(&current.value);
            self.check_valueset_value(valueset_id, value).await?;
        }

        let mut set = SetClause::new();
        if let Some(valueset_id) = update.valueset_id {
            set.set("valueset_id", uuid(valueset_id));
        }
        if let Some(value) = update.value {
            set.set("value", text(value));
        }
        if let Some(label) = update.display_label {
            set.set("display_label", opt_text(label.as_deref()));
        }
        if let Some(sort_order) = update.sort_order {
            set.set("sort_order", integer(sort_order));
        }
        if let Some(active) = update.is_active {
            set.set("is_active", boolean(active));
        }

        if set.is_empty() {
            return Ok(current);
        }
        self.apply_update(EntityKind::ValuesetValue, id, set).await?;
        self.get_valueset_value(id).await
    }

    pub async fn delete_valueset_value(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.soft_delete(EntityKind::ValuesetValue, id).await
    }

    pub async fn restore_valueset_value(&self, id: Uuid) -> Result<ValuesetValue, DatabaseError> {
        self.restore(EntityKind::ValuesetValue, id).await?;
        self.get_valueset_value(id).await
    }

    pub async fn force_delete_valueset_value(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::ValuesetValue, id).await
    }
}
