//! Valueset repository.

use audit_core::entities::{NewValueset, Valueset, ValuesetUpdate};
use audit_core::enums::EntityKind;
use audit_core::ids::new_id;
use chrono::Utc;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, get_opt_string, get_uuid, opt_text, parse_datetime, parse_enum,
    parse_optional_datetime, text, timestamp, uuid,
};
use crate::service::AuditService;

pub(crate) const COLUMNS: &str =
    "id, name, label_abbreviation, data_type, description, created_at, updated_at, deleted_at";

pub(crate) fn row_to_valueset(row: &libsql::Row) -> Result<Valueset, DatabaseError> {
    Ok(Valueset {
        id: get_uuid(row, 0)?,
        name: row.get(1)?,
        label_abbreviation: get_opt_string(row, 2)?,
        data_type: parse_enum(&row.get::<String>(3)?)?,
        description: get_opt_string(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
    })
}

impl AuditService {
    pub async fn create_valueset(&self, new: NewValueset) -> Result<Valueset, DatabaseError> {
        self.schema().check(&new)?;
        let id = new_id();

        self.db()
            .execute(
                "INSERT INTO valuesets (id, name, label_abbreviation, data_type, description,
                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                vec![
                    uuid(id),
                    text(new.name),
                    opt_text(new.label_abbreviation.as_deref()),
                    text(new.data_type.as_str()),
                    opt_text(new.description.as_deref()),
                    text(timestamp(Utc::now())),
                ],
            )
            .await?;

        self.get_valueset(id).await
    }

    pub async fn get_valueset(&self, id: Uuid) -> Result<Valueset, DatabaseError> {
        self.fetch_live(EntityKind::Valueset, COLUMNS, id, row_to_valueset)
            .await
    }

    pub async fn list_valuesets(&self) -> Result<Vec<Valueset>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM valuesets WHERE deleted_at IS NULL ORDER BY created_at, rowid"
            ),
            vec![],
            row_to_valueset,
        )
        .await
    }

    pub async fn update_valueset(
        &self,
        id: Uuid,
        update: ValuesetUpdate,
    ) -> Result<Valueset, DatabaseError> {
        self.schema().check(&update)?;

        let mut set = SetClause::new();
        if let Some(name) = update.name {
            set.set("name", text(name));
        }
        if let Some(abbreviation) = update.label_abbreviation {
            set.set("label_abbreviation", opt_text(abbreviation.as_deref()));
        }
        if let Some(data_type) = update.data_type {
            set.set("data_type", text(data_type.as_str()));
        }
        if let Some(description) = update.description {
            set.set("description", opt_text(description.as_deref()));
        }

        if !set.is_empty() {
            self.apply_update(EntityKind::Valueset, id, set).await?;
        }
        self.get_valueset(id).await
    }

    /// Soft-delete a valueset, its values, and its attribute links.
    pub async fn delete_valueset(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.soft_delete(EntityKind::Valueset, id).await
    }

    pub async fn restore_valueset(&self, id: Uuid) -> Result<Valueset, DatabaseError> {
        self.restore(EntityKind::Valueset, id).await?;
        self.get_valueset(id).await
    }

    pub async fn force_delete_valueset(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::Valueset, id).await
    }
}
