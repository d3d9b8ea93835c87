//! Existing item repository and derived-field maintenance.

use audit_core::entities::{Existing, ExistingUpdate, NewExisting};
use audit_core::enums::EntityKind;
use audit_core::ids::new_id;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::derived::LabelInput;
use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, get_i32, get_opt_string, get_uuid, integer, opt_text, parse_datetime,
    parse_optional_datetime, text, timestamp, uuid,
};
use crate::service::AuditService;

const COLUMNS: &str = "id, type_id, location_id, name, label, label_abbr, \
    attribute_values_hash, quantity, notes, created_at, updated_at, deleted_at";

/// Labels are stored in a 255-character column.
const LABEL_MAX: usize = 255;

fn row_to_existing(row: &libsql::Row) -> Result<Existing, DatabaseError> {
    Ok(Existing {
        id: get_uuid(row, 0)?,
        type_id: get_uuid(row, 1)?,
        location_id: get_uuid(row, 2)?,
        name: get_opt_string(row, 3)?,
        label: row.get(4)?,
        label_abbr: get_opt_string(row, 5)?,
        attribute_values_hash: get_opt_string(row, 6)?,
        quantity: get_i32(row, 7)?,
        notes: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 11)?.as_deref())?,
    })
}

fn clamp_label(label: String) -> String {
    if label.chars().count() <= LABEL_MAX {
        label
    } else {
        label.chars().take(LABEL_MAX).collect()
    }
}

/// Optional filters for [`AuditService::list_existing`].
#[derive(Debug, Clone, Default)]
pub struct ExistingFilter {
    pub location_id: Option<Uuid>,
    pub type_id: Option<Uuid>,
    pub attribute_values_hash: Option<String>,
}

impl AuditService {
    /// Create an item. `label` and `attribute_values_hash` are computed, not
    /// accepted from the caller.
    pub async fn create_existing(&self, new: NewExisting) -> Result<Existing, DatabaseError> {
        self.schema().check(&new)?;
        let item_type = self.get_type(new.type_id).await?;
        self.ensure_live(EntityKind::Location, new.location_id)
            .await?;

        let type_attributes = self.type_attributes(item_type.id).await?;
        let input = LabelInput {
            name: new.name.as_deref(),
            item_type: &item_type,
            type_attributes: &type_attributes,
            values: &[],
        };
        let label = clamp_label(self.derived().label(&input));
        let hash = self.derived().attribute_values_hash(&input);

        let id = new_id();
        self.db()
            .execute(
                "INSERT INTO existing (id, type_id, location_id, name, label, label_abbr,
                    attribute_values_hash, quantity, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                vec![
                    uuid(id),
                    uuid(new.type_id),
                    uuid(new.location_id),
                    opt_text(new.name.as_deref()),
                    text(label),
                    opt_text(new.label_abbr.as_deref()),
                    opt_text(hash.as_deref()),
                    integer(new.quantity),
                    opt_text(new.notes.as_deref()),
                    text(timestamp(Utc::now())),
                ],
            )
            .await?;

        self.get_existing(id).await
    }

    pub async fn get_existing(&self, id: Uuid) -> Result<Existing, DatabaseError> {
        self.fetch_live(EntityKind::Existing, COLUMNS, id, row_to_existing)
            .await
    }

    /// Live items matching `filter`, oldest first.
    pub async fn list_existing(&self, filter: &ExistingFilter) -> Result<Vec<Existing>, DatabaseError> {
        let mut conditions = vec!["deleted_at IS NULL".to_string()];
        let mut params = Vec::new();
        if let Some(location_id) = filter.location_id {
            params.push(uuid(location_id));
            conditions.push(format!("location_id = ?{}", params.len()));
        }
        if let Some(type_id) = filter.type_id {
            params.push(uuid(type_id));
            conditions.push(format!("type_id = ?{}", params.len()));
        }
        if let Some(hash) = &filter.attribute_values_hash {
            params.push(text(hash.as_str()));
            conditions.push(format!("attribute_values_hash = ?{}", params.len()));
        }
        let sql = format!(
            "SELECT {COLUMNS} FROM existing WHERE {} ORDER BY created_at, rowid",
            conditions.join(" AND ")
        );
        self.fetch_all(&sql, params, row_to_existing).await
    }

    pub async fn update_existing(
        &self,
        id: Uuid,
        update: ExistingUpdate,
    ) -> Result<Existing, DatabaseError> {
        self.schema().check(&update)?;

        let mut set = SetClause::new();
        if let Some(type_id) = update.type_id {
            self.ensure_live(EntityKind::Type, type_id).await?;
            set.set("type_id", uuid(type_id));
        }
        if let Some(location_id) = update.location_id {
            self.ensure_live(EntityKind::Location, location_id).await?;
            set.set("location_id", uuid(location_id));
        }
        if let Some(name) = update.name {
            set.set("name", opt_text(name.as_deref()));
        }
        if let Some(abbr) = update.label_abbr {
            set.set("label_abbr", opt_text(abbr.as_deref()));
        }
        if let Some(quantity) = update.quantity {
            set.set("quantity", integer(quantity));
        }
        if let Some(notes) = update.notes {
            set.set("notes", opt_text(notes.as_deref()));
        }

        if set.is_empty() {
            return self.get_existing(id).await;
        }
        let write = async {
            self.apply_update(EntityKind::Existing, id, set).await?;
            self.refresh_derived(id).await
        };
        self.db().savepoint(write).await?;
        self.get_existing(id).await
    }

    /// Soft-delete an item together with its attribute values.
    pub async fn delete_existing(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.soft_delete(EntityKind::Existing, id).await
    }

    pub async fn restore_existing(&self, id: Uuid) -> Result<Existing, DatabaseError> {
        self.restore(EntityKind::Existing, id).await?;
        self.get_existing(id).await
    }

    pub async fn force_delete_existing(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::Existing, id).await
    }

    /// Recompute `label` and `attribute_values_hash` for a live item. Writes
    /// only when a value changed.
    pub(crate) async fn refresh_derived(&self, id: Uuid) -> Result<(), DatabaseError> {
        let item = self.get_existing(id).await?;
        let item_type = self.get_type(item.type_id).await?;
        let type_attributes = self.type_attributes(item.type_id).await?;
        let values = self.existing_attribute_values(id).await?;

        let input = LabelInput {
            name: item.name.as_deref(),
            item_type: &item_type,
            type_attributes: &type_attributes,
            values: &values,
        };
        let label = clamp_label(self.derived().label(&input));
        let hash = self.derived().attribute_values_hash(&input);
        if label == item.label && hash == item.attribute_values_hash {
            return Ok(());
        }

        debug!(%id, %label, "derived fields changed");
        let mut set = SetClause::new();
        set.set("label", text(label));
        set.set("attribute_values_hash", opt_text(hash.as_deref()));
        self.apply_update(EntityKind::Existing, id, set).await
    }

    /// Refresh every live item of a type.
    pub(crate) async fn refresh_type_items(&self, type_id: Uuid) -> Result<(), DatabaseError> {
        let items = self
            .fetch_all(
                "SELECT id FROM existing WHERE type_id = ?1 AND deleted_at IS NULL",
                vec![uuid(type_id)],
                |row| get_uuid(row, 0),
            )
            .await?;
        for id in items {
            self.refresh_derived(id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::DerivedFields;
    use crate::test_support::helpers::{
        seed_assessment, seed_existing, seed_location, seed_type, test_service,
    };
    use crate::updates::existing::ExistingUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_with_only_references_defaults_quantity() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let room = seed_location(&svc, assessment.id, None, "Room").await;
        let door = seed_type(&svc, "Door").await;

        let item = svc
            .create_existing(NewExisting::new(door.id, room.id))
            .await
            .unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.label, "Door");
        assert_eq!(item.attribute_values_hash, None);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let room = seed_location(&svc, assessment.id, None, "Room").await;
        let door = seed_type(&svc, "Door").await;

        let mut new = NewExisting::new(door.id, room.id);
        new.quantity = 0;
        let err = svc.create_existing(new).await.unwrap_err();
        let DatabaseError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.for_field("/quantity").is_some());
    }

    #[tokio::test]
    async fn null_name_clears_and_relabels() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let room = seed_location(&svc, assessment.id, None, "Room").await;
        let door = seed_type(&svc, "Door").await;
        let mut new = NewExisting::new(door.id, room.id);
        new.name = Some("Main entrance".into());
        let item = svc.create_existing(new).await.unwrap();
        assert_eq!(item.label, "Main entrance");

        let cleared = svc
            .update_existing(item.id, ExistingUpdateBuilder::new().name(None).build())
            .await
            .unwrap();
        assert_eq!(cleared.name, None);
        assert_eq!(cleared.label, "Door");
    }

    #[tokio::test]
    async fn empty_update_is_a_no_op() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let room = seed_location(&svc, assessment.id, None, "Room").await;
        let door = seed_type(&svc, "Door").await;
        let item = seed_existing(&svc, door.id, room.id).await;

        let same = svc
            .update_existing(item.id, ExistingUpdate::default())
            .await
            .unwrap();
        assert_eq!(same, item);
    }

    #[tokio::test]
    async fn moving_to_a_deleted_location_is_not_found() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let room = seed_location(&svc, assessment.id, None, "Room").await;
        let hall = seed_location(&svc, assessment.id, None, "Hall").await;
        let door = seed_type(&svc, "Door").await;
        let item = seed_existing(&svc, door.id, room.id).await;
        svc.delete_location(hall.id).await.unwrap();

        let err = svc
            .update_existing(item.id, ExistingUpdateBuilder::new().location_id(hall.id).build())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotFound { entity: EntityKind::Location, .. }
        ));
    }

    #[tokio::test]
    async fn list_filters_by_location_and_type() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let room = seed_location(&svc, assessment.id, None, "Room").await;
        let hall = seed_location(&svc, assessment.id, None, "Hall").await;
        let door = seed_type(&svc, "Door").await;
        let lamp = seed_type(&svc, "Lamp").await;
        let a = seed_existing(&svc, door.id, room.id).await;
        let b = seed_existing(&svc, lamp.id, room.id).await;
        let c = seed_existing(&svc, door.id, hall.id).await;

        let in_room = svc
            .list_existing(&ExistingFilter {
                location_id: Some(room.id),
                ..ExistingFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(in_room.iter().map(|e| e.id).collect::<Vec<_>>(), vec![a.id, b.id]);

        let doors = svc
            .list_existing(&ExistingFilter {
                type_id: Some(door.id),
                ..ExistingFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(doors.iter().map(|e| e.id).collect::<Vec<_>>(), vec![a.id, c.id]);
    }

    struct Shouting;

    impl DerivedFields for Shouting {
        fn label(&self, input: &LabelInput<'_>) -> String {
            input.item_type.name.to_uppercase().repeat(100)
        }

        fn attribute_values_hash(&self, input: &LabelInput<'_>) -> Option<String> {
            Some(format!("{}:{}", input.item_type.id, input.values.len()))
        }
    }

    #[tokio::test]
    async fn custom_derived_fields_are_stored_and_clamped() {
        let svc = test_service().await.with_derived_fields(Shouting);
        let (_, assessment) = seed_assessment(&svc).await;
        let room = seed_location(&svc, assessment.id, None, "Room").await;
        let door = seed_type(&svc, "Door").await;

        let item = seed_existing(&svc, door.id, room.id).await;
        assert_eq!(item.label.chars().count(), LABEL_MAX);
        assert!(item.label.starts_with("DOORDOOR"));
        assert_eq!(
            item.attribute_values_hash,
            Some(format!("{}:0", door.id))
        );
    }
}
