//! Soft delete, restore, and physical delete across record relationships.
//!
//! Storage foreign keys only fire on physical deletes. Soft deletes walk
//! [`RELATIONS`] instead: cascading edges mark dependents with the same
//! `deleted_at` stamp, restricting edges refuse the delete while any live
//! dependent remains. Restore walks the same cascading edges and only revives
//! dependents carrying the exact stamp of the record being restored.

use std::collections::{HashSet, VecDeque};

use audit_core::enums::EntityKind;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DatabaseError, IntegrityViolation};
use crate::helpers::{entity_table, get_opt_string, get_uuid, text, timestamp, uuid};
use crate::service::AuditService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Cascade,
    Restrict,
}

#[derive(Debug, Clone, Copy)]
struct Relation {
    parent: EntityKind,
    child: EntityKind,
    /// Column on the child table holding the parent's id.
    column: &'static str,
    rule: Rule,
}

const fn rel(parent: EntityKind, child: EntityKind, column: &'static str, rule: Rule) -> Relation {
    Relation {
        parent,
        child,
        column,
        rule,
    }
}

/// Ownership edges between record kinds. `assessments.root_location_id` and
/// `assessments.assigned_to_id` are SET NULL references and only react to
/// physical deletes, so they are not listed.
const RELATIONS: &[Relation] = &[
    rel(EntityKind::Site, EntityKind::Assessment, "site_id", Rule::Restrict),
    rel(EntityKind::Assessment, EntityKind::Location, "assessment_id", Rule::Cascade),
    rel(EntityKind::Location, EntityKind::Location, "parent_location_id", Rule::Cascade),
    rel(EntityKind::Location, EntityKind::Existing, "location_id", Rule::Cascade),
    rel(EntityKind::Type, EntityKind::TypeAttribute, "type_id", Rule::Cascade),
    rel(EntityKind::Type, EntityKind::Existing, "type_id", Rule::Restrict),
    rel(EntityKind::Attribute, EntityKind::TypeAttribute, "attribute_id", Rule::Cascade),
    rel(
        EntityKind::Attribute,
        EntityKind::ExistingAttributeValue,
        "attribute_id",
        Rule::Cascade,
    ),
    rel(EntityKind::Attribute, EntityKind::AttributeValueset, "attribute_id", Rule::Cascade),
    rel(
        EntityKind::Existing,
        EntityKind::ExistingAttributeValue,
        "existing_id",
        Rule::Cascade,
    ),
    rel(EntityKind::Valueset, EntityKind::ValuesetValue, "valueset_id", Rule::Cascade),
    rel(EntityKind::Valueset, EntityKind::AttributeValueset, "valueset_id", Rule::Cascade),
];

fn dependents_of(kind: EntityKind) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.parent == kind)
}

fn owners_of(kind: EntityKind) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.child == kind)
}

impl AuditService {
    /// Soft-delete a live record and everything it owns.
    ///
    /// Runs in a savepoint: a restricting dependent anywhere in the cascade
    /// rolls back every row already marked.
    pub(crate) async fn soft_delete(&self, kind: EntityKind, id: Uuid) -> Result<(), DatabaseError> {
        self.ensure_live(kind, id).await?;
        let stamp = timestamp(Utc::now());

        let marked = self
            .db()
            .savepoint(self.mark_deleted(kind, id, &stamp))
            .await?;
        debug!(entity = %kind, %id, rows = marked, "soft deleted");
        Ok(())
    }

    async fn mark_deleted(
        &self,
        kind: EntityKind,
        id: Uuid,
        stamp: &str,
    ) -> Result<u64, DatabaseError> {
        let mut queue = VecDeque::from([(kind, id)]);
        let mut seen = HashSet::new();
        let mut marked = 0;

        while let Some((kind, id)) = queue.pop_front() {
            if !seen.insert((kind, id)) {
                continue;
            }
            for relation in dependents_of(kind) {
                let children = self.live_children(relation, id).await?;
                match relation.rule {
                    Rule::Restrict if !children.is_empty() => {
                        return Err(DatabaseError::Integrity(IntegrityViolation::Restricted {
                            entity: kind,
                            dependents: relation.child,
                        }));
                    }
                    Rule::Restrict => {}
                    Rule::Cascade => {
                        queue.extend(children.into_iter().map(|child| (relation.child, child)));
                    }
                }
            }
            let sql = format!(
                "UPDATE {} SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                entity_table(kind)
            );
            marked += self.db().execute(&sql, vec![text(stamp), uuid(id)]).await?;
        }
        Ok(marked)
    }

    async fn live_children(&self, relation: &Relation, parent: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        let sql = format!(
            "SELECT id FROM {} WHERE {} = ?1 AND deleted_at IS NULL",
            entity_table(relation.child),
            relation.column
        );
        let mut rows = self.db().query(&sql, vec![uuid(parent)]).await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(get_uuid(&row, 0)?);
        }
        Ok(ids)
    }

    /// Undo a soft delete, reviving the dependents removed alongside it.
    ///
    /// A live record is left untouched. Fails with `InvalidState` while any
    /// owning record is still soft-deleted.
    pub(crate) async fn restore(&self, kind: EntityKind, id: Uuid) -> Result<(), DatabaseError> {
        let table = entity_table(kind);
        let deleted_at = {
            let mut rows = self
                .db()
                .query(
                    &format!("SELECT deleted_at FROM {table} WHERE id = ?1"),
                    vec![uuid(id)],
                )
                .await?;
            let row = rows
                .next()
                .await?
                .ok_or_else(|| DatabaseError::not_found(kind, id))?;
            get_opt_string(&row, 0)?
        };
        let Some(stamp) = deleted_at else {
            return Ok(());
        };

        for relation in owners_of(kind) {
            let sql = format!(
                "SELECT p.id FROM {table} c JOIN {parent} p ON p.id = c.{column}
                 WHERE c.id = ?1 AND p.deleted_at IS NOT NULL",
                parent = entity_table(relation.parent),
                column = relation.column,
            );
            if self.db().exists(&sql, vec![uuid(id)]).await? {
                return Err(DatabaseError::InvalidState(format!(
                    "cannot restore {kind} {id}: its {} is deleted",
                    relation.parent
                )));
            }
        }

        let restored = self
            .db()
            .savepoint(self.mark_restored(kind, id, &stamp))
            .await?;
        debug!(entity = %kind, %id, rows = restored, "restored");
        Ok(())
    }

    async fn mark_restored(
        &self,
        kind: EntityKind,
        id: Uuid,
        stamp: &str,
    ) -> Result<u64, DatabaseError> {
        let now = timestamp(Utc::now());
        let mut queue = VecDeque::from([(kind, id)]);
        let mut seen = HashSet::new();
        let mut restored = 0;

        while let Some((kind, id)) = queue.pop_front() {
            if !seen.insert((kind, id)) {
                continue;
            }
            for relation in dependents_of(kind).filter(|r| r.rule == Rule::Cascade) {
                let sql = format!(
                    "SELECT id FROM {} WHERE {} = ?1 AND deleted_at = ?2",
                    entity_table(relation.child),
                    relation.column
                );
                let mut rows = self.db().query(&sql, vec![uuid(id), text(stamp)]).await?;
                while let Some(row) = rows.next().await? {
                    queue.push_back((relation.child, get_uuid(&row, 0)?));
                }
            }
            let sql = format!(
                "UPDATE {} SET deleted_at = NULL, updated_at = ?1 WHERE id = ?2",
                entity_table(kind)
            );
            restored += self.db().execute(&sql, vec![text(&now), uuid(id)]).await?;
        }
        Ok(restored)
    }

    /// Physically delete a record, live or trashed. Storage foreign keys
    /// cascade or null out references; restricting references, including
    /// trashed ones, refuse the delete.
    pub(crate) async fn force_delete(&self, kind: EntityKind, id: Uuid) -> Result<(), DatabaseError> {
        for relation in dependents_of(kind).filter(|r| r.rule == Rule::Restrict) {
            let sql = format!(
                "SELECT 1 FROM {} WHERE {} = ?1",
                entity_table(relation.child),
                relation.column
            );
            if self.db().exists(&sql, vec![uuid(id)]).await? {
                return Err(DatabaseError::Integrity(IntegrityViolation::Restricted {
                    entity: kind,
                    dependents: relation.child,
                }));
            }
        }

        let sql = format!("DELETE FROM {} WHERE id = ?1", entity_table(kind));
        if self.db().execute(&sql, vec![uuid(id)]).await? == 0 {
            return Err(DatabaseError::not_found(kind, id));
        }
        debug!(entity = %kind, %id, "force deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_relation_column_belongs_to_the_child() {
        for relation in RELATIONS {
            let expected = match relation.parent {
                EntityKind::Location if relation.child == EntityKind::Location => {
                    "parent_location_id"
                }
                EntityKind::Site => "site_id",
                EntityKind::Assessment => "assessment_id",
                EntityKind::Location => "location_id",
                EntityKind::Type => "type_id",
                EntityKind::Attribute => "attribute_id",
                EntityKind::Existing => "existing_id",
                EntityKind::Valueset => "valueset_id",
                other => panic!("{other} owns nothing"),
            };
            assert_eq!(relation.column, expected);
        }
    }

    #[test]
    fn only_site_and_type_restrict() {
        let restricting: Vec<_> = RELATIONS
            .iter()
            .filter(|r| r.rule == Rule::Restrict)
            .map(|r| (r.parent, r.child))
            .collect();
        assert_eq!(
            restricting,
            vec![
                (EntityKind::Site, EntityKind::Assessment),
                (EntityKind::Type, EntityKind::Existing),
            ]
        );
    }

    #[test]
    fn pivots_and_values_own_nothing() {
        for kind in [
            EntityKind::TypeAttribute,
            EntityKind::ExistingAttributeValue,
            EntityKind::ValuesetValue,
            EntityKind::AttributeValueset,
        ] {
            assert_eq!(dependents_of(kind).count(), 0, "{kind}");
        }
    }
}
