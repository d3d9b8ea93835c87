//! Item type repository.

use audit_core::entities::{ItemType, ItemTypeUpdate, NewItemType};
use audit_core::enums::EntityKind;
use audit_core::ids::new_id;
use chrono::Utc;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, get_opt_string, get_uuid, opt_text, parse_datetime, parse_optional_datetime, text,
    timestamp, uuid,
};
use crate::service::AuditService;

const COLUMNS: &str =
    "id, name, label_abbreviation, color, description, created_at, updated_at, deleted_at";

fn row_to_type(row: &libsql::Row) -> Result<ItemType, DatabaseError> {
    Ok(ItemType {
        id: get_uuid(row, 0)?,
        name: row.get(1)?,
        label_abbreviation: get_opt_string(row, 2)?,
        color: row.get(3)?,
        description: get_opt_string(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
    })
}

impl AuditService {
    pub async fn create_type(&self, new: NewItemType) -> Result<ItemType, DatabaseError> {
        self.schema().check(&new)?;
        let id = new_id();
        let now = timestamp(Utc::now());

        self.db()
            .execute(
                "INSERT INTO types (id, name, label_abbreviation, color, description,
                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                vec![
                    uuid(id),
                    text(new.name),
                    opt_text(new.label_abbreviation.as_deref()),
                    text(new.color),
                    opt_text(new.description.as_deref()),
                    text(now),
                ],
            )
            .await?;

        self.get_type(id).await
    }

    pub async fn get_type(&self, id: Uuid) -> Result<ItemType, DatabaseError> {
        self.fetch_live(EntityKind::Type, COLUMNS, id, row_to_type).await
    }

    pub async fn list_types(&self) -> Result<Vec<ItemType>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM types WHERE deleted_at IS NULL ORDER BY created_at, rowid"
            ),
            vec![],
            row_to_type,
        )
        .await
    }

    /// Apply a partial update. Items of this type get their derived fields
    /// recomputed, since labels may fall back to the type name.
    pub async fn update_type(&self, id: Uuid, update: ItemTypeUpdate) -> Result<ItemType, DatabaseError> {
        self.schema().check(&update)?;

        let mut set = SetClause::new();
        if let Some(name) = update.name {
            set.set("name", text(name));
        }
        if let Some(abbreviation) = update.label_abbreviation {
            set.set("label_abbreviation", opt_text(abbreviation.as_deref()));
        }
        if let Some(color) = update.color {
            set.set("color", text(color));
        }
        if let Some(description) = update.description {
            set.set("description", opt_text(description.as_deref()));
        }

        if set.is_empty() {
            return self.get_type(id).await;
        }

        let write = async {
            self.apply_update(EntityKind::Type, id, set).await?;
            self.refresh_type_items(id).await
        };
        self.db().savepoint(write).await?;
        self.get_type(id).await
    }

    /// Soft-delete a type and its attribute links. Refused while live items
    /// still use the type.
    pub async fn delete_type(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.soft_delete(EntityKind::Type, id).await
    }

    pub async fn restore_type(&self, id: Uuid) -> Result<ItemType, DatabaseError> {
        self.restore(EntityKind::Type, id).await?;
        self.get_type(id).await
    }

    pub async fn force_delete_type(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::Type, id).await
    }
}
