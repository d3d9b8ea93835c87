//! Type ↔ attribute links.
//!
//! Each type carries an ordered set of attributes. `label_concat_order`
//! decides where an attribute's value appears when item labels are composed;
//! links without an order sort last.

use audit_core::entities::{NewTypeAttribute, TypeAttribute, TypeAttributeUpdate};
use audit_core::enums::EntityKind;
use audit_core::ids::new_id;
use chrono::Utc;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, boolean, get_bool, get_opt_i32, get_opt_string, get_uuid, opt_integer,
    parse_datetime, parse_optional_datetime, text, timestamp, uuid,
};
use crate::service::AuditService;

const COLUMNS: &str = "id, type_id, attribute_id, label_concat_order, is_required, \
    created_at, updated_at, deleted_at";

fn row_to_type_attribute(row: &libsql::Row) -> Result<TypeAttribute, DatabaseError> {
    Ok(TypeAttribute {
        id: get_uuid(row, 0)?,
        type_id: get_uuid(row, 1)?,
        attribute_id: get_uuid(row, 2)?,
        label_concat_order: get_opt_i32(row, 3)?,
        is_required: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
    })
}

impl AuditService {
    /// Insert a new link. A pair that already exists, even soft-deleted,
    /// is a uniqueness violation; use [`attach_attribute`](Self::attach_attribute)
    /// to upsert.
    pub async fn create_type_attribute(
        &self,
        new: NewTypeAttribute,
    ) -> Result<TypeAttribute, DatabaseError> {
        self.schema().check(&new)?;
        self.ensure_live(EntityKind::Type, new.type_id).await?;
        self.ensure_live(EntityKind::Attribute, new.attribute_id)
            .await?;

        let id = new_id();
        let write = async {
            self.db()
                .execute(
                    "INSERT INTO type_attributes (id, type_id, attribute_id, label_concat_order,
                        is_required, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                    vec![
                        uuid(id),
                        uuid(new.type_id),
                        uuid(new.attribute_id),
                        opt_integer(new.label_concat_order),
                        boolean(new.is_required),
                        text(timestamp(Utc::now())),
                    ],
                )
                .await?;
            self.refresh_type_items(new.type_id).await
        };
        self.db().savepoint(write).await?;

        self.get_type_attribute(id).await
    }

    pub async fn get_type_attribute(&self, id: Uuid) -> Result<TypeAttribute, DatabaseError> {
        self.fetch_live(EntityKind::TypeAttribute, COLUMNS, id, row_to_type_attribute)
            .await
    }

    /// Every live link, oldest first.
    pub async fn list_type_attributes(&self) -> Result<Vec<TypeAttribute>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM type_attributes WHERE deleted_at IS NULL
                 ORDER BY created_at, rowid"
            ),
            vec![],
            row_to_type_attribute,
        )
        .await
    }

    /// Live links of a type in label order.
    pub async fn type_attributes(&self, type_id: Uuid) -> Result<Vec<TypeAttribute>, DatabaseError> {
        self.ensure_live(EntityKind::Type, type_id).await?;
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM type_attributes
                 WHERE type_id = ?1 AND deleted_at IS NULL
                 ORDER BY label_concat_order IS NULL, label_concat_order, created_at, rowid"
            ),
            vec![uuid(type_id)],
            row_to_type_attribute,
        )
        .await
    }

    /// Link an attribute to a type, or update the existing link. A
    /// soft-deleted link for the same pair is revived.
    pub async fn attach_attribute(
        &self,
        type_id: Uuid,
        attribute_id: Uuid,
        label_concat_order: Option<i32>,
        is_required: bool,
    ) -> Result<TypeAttribute, DatabaseError> {
        let existing = self
            .find_pair(
                EntityKind::TypeAttribute,
                ("type_id", type_id),
                ("attribute_id", attribute_id),
            )
            .await?;
        let Some(pair) = existing else {
            return self
                .create_type_attribute(NewTypeAttribute {
                    type_id,
                    attribute_id,
                    label_concat_order,
                    is_required,
                })
                .await;
        };

        self.ensure_live(EntityKind::Type, type_id).await?;
        self.ensure_live(EntityKind::Attribute, attribute_id).await?;
        let mut set = SetClause::new();
        set.set("label_concat_order", opt_integer(label_concat_order));
        set.set("is_required", boolean(is_required));

        let write = async {
            if pair.trashed {
                self.revive(EntityKind::TypeAttribute, pair.id, set).await?;
            } else {
                self.apply_update(EntityKind::TypeAttribute, pair.id, set)
                    .await?;
            }
            self.refresh_type_items(type_id).await
        };
        self.db().savepoint(write).await?;

        self.get_type_attribute(pair.id).await
    }

    /// Soft-delete the live link between a type and an attribute.
    pub async fn detach_attribute(&self, type_id: Uuid, attribute_id: Uuid) -> Result<(), DatabaseError> {
        let pair = self
            .find_pair(
                EntityKind::TypeAttribute,
                ("type_id", type_id),
                ("attribute_id", attribute_id),
            )
            .await?
            .filter(|pair| !pair.trashed)
            .ok_or_else(|| {
                DatabaseError::not_found(EntityKind::TypeAttribute, format!("{type_id}/{attribute_id}"))
            })?;
        self.delete_type_attribute(pair.id).await
    }

    pub async fn update_type_attribute(
        &self,
        id: Uuid,
        update: TypeAttributeUpdate,
    ) -> Result<TypeAttribute, DatabaseError> {
        self.schema().check(&update)?;
        let current = self.get_type_attribute(id).await?;

        let mut set = SetClause::new();
        if let Some(type_id) = update.type_id {
            self.ensure_live(EntityKind::Type, type_id).await?;
            set.set("type_id", uuid(type_id));
        }
        if let Some(attribute_id) = update.attribute_id {
            self.ensure_live(EntityKind::Attribute, attribute_id).await?;
            set.set("attribute_id", uuid(attribute_id));
        }
        if let Some(order) = update.label_concat_order {
            set.set("label_concat_order", opt_integer(order));
        }
        if let Some(required) = update.is_required {
            set.set("is_required", boolean(required));
        }

        if set.is_empty() {
            return Ok(current);
        }
        let write = async {
            self.apply_update(EntityKind::TypeAttribute, id, set).await?;
            self.refresh_type_items(current.type_id).await?;
            match update.type_id {
                Some(type_id) if type_id != current.type_id => {
                    self.refresh_type_items(type_id).await
                }
                _ => Ok(()),
            }
        };
        self.db().savepoint(write).await?;
        self.get_type_attribute(id).await
    }

    pub async fn delete_type_attribute(&self, id: Uuid) -> Result<(), DatabaseError> {
        let link = self.get_type_attribute(id).await?;
        self.soft_delete(EntityKind::TypeAttribute, id).await?;
        self.refresh_type_items(link.type_id).await
    }

    pub async fn restore_type_attribute(&self, id: Uuid) -> Result<TypeAttribute, DatabaseError> {
        self.restore(EntityKind::TypeAttribute, id).await?;
        let link = self.get_type_attribute(id).await?;
        self.refresh_type_items(link.type_id).await?;
        Ok(link)
    }

    pub async fn force_delete_type_attribute(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::TypeAttribute, id).await
    }
}
