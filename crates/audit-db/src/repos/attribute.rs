//! Attribute repository.

use audit_core::entities::{Attribute, AttributeUpdate, NewAttribute};
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

pub(crate) const COLUMNS: &str = "id, name, label_abbreviation, data_type, unit_of_measure, \
    description, created_at, updated_at, deleted_at";

pub(crate) fn row_to_attribute(row: &libsql::Row) -> Result<Attribute, DatabaseError> {
    Ok(Attribute {
        id: get_uuid(row, 0)?,
        name: row.get(1)?,
        label_abbreviation: get_opt_string(row, 2)?,
        data_type: parse_enum(&row.get::<String>(3)?)?,
        unit_of_measure: get_opt_string(row, 4)?,
        description: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
    })
}

impl AuditService {
    pub async fn create_attribute(&self, new: NewAttribute) -> Result<Attribute, DatabaseError> {
        self.schema().check(&new)?;
        let id = new_id();
        let now = timestamp(Utc::now());

        self.db()
            .execute(
                "INSERT INTO attributes (id, name, label_abbreviation, data_type,
                    unit_of_measure, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                vec![
                    uuid(id),
                    text(new.name),
                    opt_text(new.label_abbreviation.as_deref()),
                    text(new.data_type.as_str()),
                    opt_text(new.unit_of_measure.as_deref()),
                    opt_text(new.description.as_deref()),
                    text(now),
                ],
            )
            .await?;

        self.get_attribute(id).await
    }

    pub async fn get_attribute(&self, id: Uuid) -> Result<Attribute, DatabaseError> {
        self.fetch_live(EntityKind::Attribute, COLUMNS, id, row_to_attribute)
            .await
    }

    pub async fn list_attributes(&self) -> Result<Vec<Attribute>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM attributes WHERE deleted_at IS NULL ORDER BY created_at, rowid"
            ),
            vec![],
            row_to_attribute,
        )
        .await
    }

    pub async fn update_attribute(
        &self,
        id: Uuid,
        update: AttributeUpdate,
    ) -> Result<Attribute, DatabaseError> {
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
        if let Some(unit) = update.unit_of_measure {
            set.set("unit_of_measure", opt_text(unit.as_deref()));
        }
        if let Some(description) = update.description {
            set.set("description", opt_text(description.as_deref()));
        }

        if !set.is_empty() {
            self.apply_update(EntityKind::Attribute, id, set).await?;
        }
        self.get_attribute(id).await
    }

    /// Soft-delete an attribute with its type links, valueset links, and
    /// recorded values.
    pub async fn delete_attribute(&self, id: Uuid) -> Result<(), DatabaseError> {
        let affected = self.items_with_attribute(id).await?;
        self.soft_delete(EntityKind::Attribute, id).await?;
        for existing_id in affected {
            self.refresh_derived(existing_id).await?;
        }
        Ok(())
    }

    pub async fn restore_attribute(&self, id: Uuid) -> Result<Attribute, DatabaseError> {
        self.restore(EntityKind::Attribute, id).await?;
        for existing_id in self.items_with_attribute(id).await? {
            self.refresh_derived(existing_id).await?;
        }
        self.get_attribute(id).await
    }

    pub async fn force_delete_attribute(&self, id: Uuid) -> Result<(), DatabaseError> {
        let affected = self.items_with_attribute(id).await?;
        self.force_delete(EntityKind::Attribute, id).await?;
        for existing_id in affected {
            self.refresh_derived(existing_id).await?;
        }
        Ok(())
    }

    /// Live items holding a live value for this attribute.
    async fn items_with_attribute(&self, attribute_id: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        self.fetch_all(
            "SELECT DISTINCT v.existing_id FROM existing_attribute_values v
             JOIN existing e ON e.id = v.existing_id
             WHERE v.attribute_id = ?1 AND v.deleted_at IS NULL AND e.deleted_at IS NULL",
            vec![uuid(attribute_id)],
            |row| get_uuid(row, 0),
        )
        .await
    }
}
