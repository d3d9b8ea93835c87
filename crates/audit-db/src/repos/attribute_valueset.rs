//! Attribute ↔ valueset links.

use std::collections::HashSet;

use audit_core::entities::{
    AttributeValueset, AttributeValuesetUpdate, NewAttributeValueset, Valueset,
};
use audit_core::enums::EntityKind;
use audit_core::ids::new_id;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, get_opt_string, get_uuid, parse_datetime, parse_optional_datetime, text, timestamp,
    uuid,
};
use crate::repos::valueset::row_to_valueset;
use crate::service::AuditService;

const COLUMNS: &str = "id, attribute_id, valueset_id, created_at, updated_at, deleted_at";

fn row_to_link(row: &libsql::Row) -> Result<AttributeValueset, DatabaseError> {
    Ok(AttributeValueset {
        id: get_uuid(row, 0)?,
        attribute_id: get_uuid(row, 1)?,
        valueset_id: get_uuid(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
    })
}

impl AuditService {
    pub async fn create_attribute_valueset(
        &self,
        new: NewAttributeValueset,
    ) -> Result<AttributeValueset, DatabaseError> {
        self.schema().check(&new)?;
        self.ensure_live(EntityKind::Attribute, new.attribute_id)
            .await?;
        self.ensure_live(EntityKind::Valueset, new.valueset_id).await?;

        let id = new_id();
        self.db()
            .execute(
                "INSERT INTO attribute_valuesets (id, attribute_id, valueset_id, created_at,
                    updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                vec![
                    uuid(id),
                    uuid(new.attribute_id),
                    uuid(new.valueset_id),
                    text(timestamp(Utc::now())),
                ],
            )
            .await?;

        self.get_attribute_valueset(id).await
    }

    pub async fn get_attribute_valueset(&self, id: Uuid) -> Result<AttributeValueset, DatabaseError> {
        self.fetch_live(EntityKind::AttributeValueset, COLUMNS, id, row_to_link)
            .await
    }

    /// Live link rows of an attribute, oldest first.
    pub async fn list_attribute_valuesets(
        &self,
        attribute_id: Uuid,
    ) -> Result<Vec<AttributeValueset>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM attribute_valuesets
                 WHERE attribute_id = ?1 AND deleted_at IS NULL
                 ORDER BY created_at, rowid"
            ),
            vec![uuid(attribute_id)],
            row_to_link,
        )
        .await
    }

    /// The live valuesets an attribute draws from, in link order.
    pub async fn attribute_valuesets(&self, attribute_id: Uuid) -> Result<Vec<Valueset>, DatabaseError> {
        self.ensure_live(EntityKind::Attribute, attribute_id).await?;
        self.fetch_all(
            "SELECT v.id, v.name, v.label_abbreviation, v.data_type, v.description,
                    v.created_at, v.updated_at, v.deleted_at
             FROM attribute_valuesets l
             JOIN valuesets v ON v.id = l.valueset_id
             WHERE l.attribute_id = ?1 AND l.deleted_at IS NULL AND v.deleted_at IS NULL
             ORDER BY l.created_at, l.rowid",
            vec![uuid(attribute_id)],
            row_to_valueset,
        )
        .await
    }

    /// Link a valueset to an attribute. Linking an already-linked pair
    /// returns the existing link; a soft-deleted link is revived.
    pub async fn link_valueset(
        &self,
        attribute_id: Uuid,
        valueset_id: Uuid,
    ) -> Result<AttributeValueset, DatabaseError> {
        let pair = self
            .find_pair(
                EntityKind::AttributeValueset,
                ("attribute_id", attribute_id),
                ("valueset_id", valueset_id),
            )
            .await?;
        match pair {
            None => {
                self.create_attribute_valueset(NewAttributeValueset {
                    attribute_id,
                    valueset_id,
                })
                .await
            }
            Some(pair) if pair.trashed => {
                self.ensure_live(EntityKind::Attribute, attribute_id).await?;
                self.ensure_live(EntityKind::Valueset, valueset_id).await?;
                self.revive(EntityKind::AttributeValueset, pair.id, SetClause::new())
                    .await?;
                self.get_attribute_valueset(pair.id).await
            }
            Some(pair) => self.get_attribute_valueset(pair.id).await,
        }
    }

    /// Soft-delete the live link between an attribute and a valueset.
    pub async fn unlink_valueset(&self, attribute_id: Uuid, valueset_id: Uuid) -> Result<(), DatabaseError> {
        let pair = self
            .find_pair(
                EntityKind::AttributeValueset,
                ("attribute_id", attribute_id),
                ("valueset_id", valueset_id),
            )
            .await?
            .filter(|pair| !pair.trashed)
            .ok_or_else(|| {
                DatabaseError::not_found(
                    EntityKind::AttributeValueset,
                    format!("{attribute_id}/{valueset_id}"),
                )
            })?;
        self.soft_delete(EntityKind::AttributeValueset, pair.id).await
    }

    /// Replace an attribute's valueset links with exactly `valueset_ids`,
    /// atomically.
    pub async fn sync_valuesets(
        &self,
        attribute_id: Uuid,
        valueset_ids: &[Uuid],
    ) -> Result<Vec<Valueset>, DatabaseError> {
        self.ensure_live(EntityKind::Attribute, attribute_id).await?;
        let wanted: HashSet<Uuid> = valueset_ids.iter().copied().collect();

        let write = async {
            for link in self.list_attribute_valuesets(attribute_id).await? {
                if !wanted.contains(&link.valueset_id) {
                    self.soft_delete(EntityKind::AttributeValueset, link.id)
                        .await?;
                }
            }
            for &valueset_id in valueset_ids {
                self.link_valueset(attribute_id, valueset_id).await?;
            }
            Ok::<(), DatabaseError>(())
        };
        self.db().savepoint(write).await?;

        debug!(%attribute_id, links = wanted.len(), "valuesets synced");
        self.attribute_valuesets(attribute_id).await
    }

    pub async fn update_attribute_valueset(
        &self,
        id: Uuid,
        update: AttributeValuesetUpdate,
    ) -> Result<AttributeValueset, DatabaseError> {
        self.schema().check(&update)?;

        let mut set = SetClause::new();
        if let Some(attribute_id) = update.attribute_id {
            self.ensure_live(EntityKind::Attribute, attribute_id).await?;
            set.set("attribute_id", uuid(attribute_id));
        }
        if let Some(valueset_id) = update.valueset_id {
            self.ensure_live(EntityKind::Valueset, valueset_id).await?;
            set.set("valueset_id", uuid(valueset_id));
        }

        if !set.is_empty() {
            self.apply_update(EntityKind::AttributeValueset, id, set)
                .await?;
        }
        self.get_attribute_valueset(id).await
    }

    pub async fn delete_attribute_valueset(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.soft_delete(EntityKind::AttributeValueset, id).await
    }

    pub async fn restore_attribute_valueset(
        &self,
        id: Uuid,
    ) -> Result<AttributeValueset, DatabaseError> {
        self.restore(EntityKind::AttributeValueset, id).await?;
        self.get_attribute_valueset(id).await
    }

    pub async fn force_delete_attribute_valueset(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::AttributeValueset, id).await
    }
}
