//! Location repository: the per-assessment location tree.
//!
//! Locations nest through `parent_location_id`. A parent must belong to the
//! same assessment, and reparenting may never create a cycle.

use std::collections::{HashMap, HashSet};

use audit_core::entities::{Location, LocationUpdate, NewLocation};
use audit_core::enums::EntityKind;
use audit_core::ids::new_id;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, get_i32, get_opt_string, get_opt_uuid, get_uuid, integer, opt_text, opt_uuid,
    parse_datetime, parse_optional_datetime, text, timestamp, uuid,
};
use crate::service::AuditService;

const COLUMNS: &str = "id, assessment_id, parent_location_id, name, label_abbreviation, \
    description, sort_order, created_at, updated_at, deleted_at";

fn row_to_location(row: &libsql::Row) -> Result<Location, DatabaseError> {
    Ok(Location {
        id: get_uuid(row, 0)?,
        assessment_id: get_uuid(row, 1)?,
        parent_location_id: get_opt_uuid(row, 2)?,
        name: row.get(3)?,
        label_abbreviation: get_opt_string(row, 4)?,
        description: get_opt_string(row, 5)?,
        sort_order: get_i32(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
    })
}

/// A location with its live descendants, siblings ordered by `sort_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationNode {
    #[serde(flatten)]
    pub location: Location,
    pub children: Vec<LocationNode>,
}

fn build_tree(
    parent: Option<Uuid>,
    by_parent: &mut HashMap<Option<Uuid>, Vec<Location>>,
) -> Vec<LocationNode> {
    by_parent
        .remove(&parent)
        .unwrap_or_default()
        .into_iter()
        .map(|location| {
            let children = build_tree(Some(location.id), by_parent);
            LocationNode { location, children }
        })
        .collect()
}

impl AuditService {
    pub async fn create_location(&self, new: NewLocation) -> Result<Location, DatabaseError> {
        self.schema().check(&new)?;
        self.ensure_live(EntityKind::Assessment, new.assessment_id)
            .await?;
        if let Some(parent_id) = new.parent_location_id {
            let parent = self.get_location(parent_id).await?;
            if parent.assessment_id != new.assessment_id {
                return Err(DatabaseError::InvalidState(format!(
                    "parent location {parent_id} belongs to another assessment"
                )));
            }
        }

        let id = new_id();
        let now = timestamp(Utc::now());
        self.db()
            .execute(
                "INSERT INTO locations (id, assessment_id, parent_location_id, name,
                    label_abbreviation, description, sort_order, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                vec![
                    uuid(id),
                    uuid(new.assessment_id),
                    opt_uuid(new.parent_location_id),
                    text(new.name),
                    opt_text(new.label_abbreviation.as_deref()),
                    opt_text(new.description.as_deref()),
                    integer(new.sort_order),
                    text(now),
                ],
            )
            .await?;

        self.get_location(id).await
    }

    pub async fn get_location(&self, id: Uuid) -> Result<Location, DatabaseError> {
        self.fetch_live(EntityKind::Location, COLUMNS, id, row_to_location)
            .await
    }

    /// Every live location of an assessment, flat, in sibling order.
    pub async fn list_locations(&self, assessment_id: Uuid) -> Result<Vec<Location>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM locations
                 WHERE assessment_id = ?1 AND deleted_at IS NULL
                 ORDER BY sort_order, name, rowid"
            ),
            vec![uuid(assessment_id)],
            row_to_location,
        )
        .await
    }

    /// Direct live children of a location.
    pub async fn location_children(&self, parent_id: Uuid) -> Result<Vec<Location>, DatabaseError> {
        self.ensure_live(EntityKind::Location, parent_id).await?;
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM locations
                 WHERE parent_location_id = ?1 AND deleted_at IS NULL
                 ORDER BY sort_order, name, rowid"
            ),
            vec![uuid(parent_id)],
            row_to_location,
        )
        .await
    }

    /// Ancestors of a location, nearest first, ending at the tree root.
    pub async fn location_ancestors(&self, id: Uuid) -> Result<Vec<Location>, DatabaseError> {
        let mut current = self.get_location(id).await?;
        let mut seen = HashSet::from([id]);
        let mut ancestors = Vec::new();

        while let Some(parent_id) = current.parent_location_id {
            if !seen.insert(parent_id) {
                return Err(DatabaseError::InvalidState(format!(
                    "location {id} has a cyclic ancestry"
                )));
            }
            let parent = self.get_location(parent_id).await?;
            ancestors.push(parent.clone());
            current = parent;
        }
        Ok(ancestors)
    }

    /// The live location forest of an assessment.
    pub async fn location_tree(&self, assessment_id: Uuid) -> Result<Vec<LocationNode>, DatabaseError> {
        self.ensure_live(EntityKind::Assessment, assessment_id)
            .await?;
        let mut by_parent: HashMap<Option<Uuid>, Vec<Location>> = HashMap::new();
        for location in self.list_locations(assessment_id).await? {
            by_parent
                .entry(location.parent_location_id)
                .or_default()
                .push(location);
        }
        Ok(build_tree(None, &mut by_parent))
    }

    /// Apply a partial update.
    ///
    /// Moving a location checks the new parent: it must be live, belong to
    /// the same assessment, and not be the location itself or one of its
    /// descendants. A location with live children cannot change assessment.
    pub async fn update_location(
        &self,
        id: Uuid,
        update: LocationUpdate,
    ) -> Result<Location, DatabaseError> {
        self.schema().check(&update)?;
        let current = self.get_location(id).await?;

        let assessment_id = update.assessment_id.unwrap_or(current.assessment_id);
        let parent_id = update
            .parent_location_id
            .unwrap_or(current.parent_location_id);

        if assessment_id != current.assessment_id {
            self.ensure_live(EntityKind::Assessment, assessment_id)
                .await?;
            if !self.location_children(id).await?.is_empty() {
                return Err(DatabaseError::InvalidState(format!(
                    "location {id} has children and cannot move to another assessment"
                )));
            }
        }
        if parent_id != current.parent_location_id || assessment_id != current.assessment_id {
            if let Some(parent_id) = parent_id {
                self.check_parent(id, assessment_id, parent_id).await?;
            }
        }

        let mut set = SetClause::new();
        if let Some(assessment_id) = update.assessment_id {
            set.set("assessment_id", uuid(assessment_id));
        }
        if let Some(parent) = update.parent_location_id {
            set.set("parent_location_id", opt_uuid(parent));
        }
        if let Some(name) = update.name {
            set.set("name", text(name));
        }
        if let Some(abbreviation) = update.label_abbreviation {
            set.set("label_abbreviation", opt_text(abbreviation.as_deref()));
        }
        if let Some(description) = update.description {
            set.set("description", opt_text(description.as_deref()));
        }
        if let Some(sort_order) = update.sort_order {
            set.set("sort_order", integer(sort_order));
        }

        if set.is_empty() {
            return Ok(current);
        }
        self.apply_update(EntityKind::Location, id, set).await?;
        self.get_location(id).await
    }

    async fn check_parent(
        &self,
        id: Uuid,
        assessment_id: Uuid,
        parent_id: Uuid,
    ) -> Result<(), DatabaseError> {
        if parent_id == id {
            return Err(DatabaseError::InvalidState(format!(
                "location {id} cannot be its own parent"
            )));
        }
        let parent = self.get_location(parent_id).await?;
        if parent.assessment_id != assessment_id {
            return Err(DatabaseError::InvalidState(format!(
                "parent location {parent_id} belongs to another assessment"
            )));
        }
        if self
            .location_ancestors(parent_id)
            .await?
            .iter()
            .any(|ancestor| ancestor.id == id)
        {
            return Err(DatabaseError::InvalidState(format!(
                "moving location {id} under {parent_id} would create a cycle"
            )));
        }
        Ok(())
    }

    /// Soft-delete a location, its descendants, and the items inside them.
    /// An assessment's `root_location_id` keeps pointing at it.
    pub async fn delete_location(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.soft_delete(EntityKind::Location, id).await
    }

    pub async fn restore_location(&self, id: Uuid) -> Result<Location, DatabaseError> {
        self.restore(EntityKind::Location, id).await?;
        self.get_location(id).await
    }

    pub async fn force_delete_location(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::Location, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{
        seed_assessment, seed_existing, seed_location, seed_type, test_service,
    };
    use crate::updates::assessment::LocationUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn children_are_ordered_by_sort_order() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let building = seed_location(&svc, assessment.id, None, "Building").await;

        for (name, order) in [("Roof", 3), ("Basement", 1), ("Ground", 2)] {
            let mut new = NewLocation {
                assessment_id: assessment.id,
                parent_location_id: Some(building.id),
                name: name.into(),
                label_abbreviation: None,
                description: None,
                sort_order: order,
            };
            new.description = Some(format!("{name} level"));
            svc.create_location(new).await.unwrap();
        }

        let names: Vec<_> = svc
            .location_children(building.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Basement", "Ground", "Roof"]);
    }

    #[tokio::test]
    async fn parent_must_share_the_assessment() {
        let svc = test_service().await;
        let (_, first) = seed_assessment(&svc).await;
        let (_, second) = seed_assessment(&svc).await;
        let foreign = seed_location(&svc, second.id, None, "Elsewhere").await;

        let err = svc
            .create_location(NewLocation {
                assessment_id: first.id,
                parent_location_id: Some(foreign.id),
                name: "Room".into(),
                label_abbreviation: None,
                description: None,
                sort_order: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn ancestors_walk_to_the_root() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let building = seed_location(&svc, assessment.id, None, "Building").await;
        let floor = seed_location(&svc, assessment.id, Some(building.id), "Floor").await;
        let room = seed_location(&svc, assessment.id, Some(floor.id), "Room").await;

        let ancestors: Vec<_> = svc
            .location_ancestors(room.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ancestors, vec![floor.id, building.id]);
        assert!(svc.location_ancestors(building.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reparenting_rejects_cycles() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let building = seed_location(&svc, assessment.id, None, "Building").await;
        let floor = seed_location(&svc, assessment.id, Some(building.id), "Floor").await;
        let room = seed_location(&svc, assessment.id, Some(floor.id), "Room").await;

        for parent in [building.id, room.id] {
            let err = svc
                .update_location(
                    building.id,
                    LocationUpdateBuilder::new()
                        .parent_location_id(Some(parent))
                        .build(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, DatabaseError::InvalidState(_)), "{err:?}");
        }

        // Moving the room directly under the building is fine.
        let moved = svc
            .update_location(
                room.id,
                LocationUpdateBuilder::new()
                    .parent_location_id(Some(building.id))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(moved.parent_location_id, Some(building.id));
    }

    #[tokio::test]
    async fn location_with_children_cannot_change_assessment() {
        let svc = test_service().await;
        let (_, first) = seed_assessment(&svc).await;
        let (_, second) = seed_assessment(&svc).await;
        let building = seed_location(&svc, first.id, None, "Building").await;
        seed_location(&svc, first.id, Some(building.id), "Floor").await;

        let err = svc
            .update_location(
                building.id,
                LocationUpdateBuilder::new().assessment_id(second.id).build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn tree_nests_children() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let building = seed_location(&svc, assessment.id, None, "Building").await;
        let floor = seed_location(&svc, assessment.id, Some(building.id), "Floor").await;
        seed_location(&svc, assessment.id, Some(floor.id), "Room").await;
        seed_location(&svc, assessment.id, None, "Yard").await;

        let tree = svc.location_tree(assessment.id).await.unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].location.name, "Building");
        assert_eq!(tree[0].children[0].location.name, "Floor");
        assert_eq!(tree[0].children[0].children[0].location.name, "Room");
        assert!(tree[1].children.is_empty());

        let json = serde_json::to_value(&tree[0]).unwrap();
        assert_eq!(json["name"], "Building");
        assert_eq!(json["children"][0]["name"], "Floor");
    }

    #[tokio::test]
    async fn delete_cascades_down_the_tree_and_restore_reverses_it() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let building = seed_location(&svc, assessment.id, None, "Building").await;
        let floor = seed_location(&svc, assessment.id, Some(building.id), "Floor").await;
        let door = seed_type(&svc, "Door").await;
        let item = seed_existing(&svc, door.id, floor.id).await;

        svc.delete_location(building.id).await.unwrap();
        assert!(svc.get_location(floor.id).await.is_err());
        assert!(svc.get_existing(item.id).await.is_err());
        assert!(svc.location_tree(assessment.id).await.unwrap().is_empty());

        svc.restore_location(building.id).await.unwrap();
        assert_eq!(svc.get_location(floor.id).await.unwrap().id, floor.id);
        assert_eq!(svc.get_existing(item.id).await.unwrap().id, item.id);
    }

    #[tokio::test]
    async fn restore_fails_while_parent_is_deleted() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let building = seed_location(&svc, assessment.id, None, "Building").await;
        let floor = seed_location(&svc, assessment.id, Some(building.id), "Floor").await;

        svc.delete_location(floor.id).await.unwrap();
        svc.delete_location(building.id).await.unwrap();

        let err = svc.restore_location(floor.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));

        // Restoring the building leaves the separately deleted floor trashed.
        svc.restore_location(building.id).await.unwrap();
        assert!(svc.get_location(floor.id).await.is_err());
        svc.restore_location(floor.id).await.unwrap();
    }

    #[tokio::test]
    async fn soft_deleting_root_location_keeps_the_reference() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let building = seed_location(&svc, assessment.id, None, "Building").await;
        svc.update_assessment(
            assessment.id,
            crate::updates::assessment::AssessmentUpdateBuilder::new()
                .root_location_id(Some(building.id))
                .build(),
        )
        .await
        .unwrap();

        svc.delete_location(building.id).await.unwrap();
        let reloaded = svc.get_assessment(assessment.id).await.unwrap();
        assert_eq!(reloaded.root_location_id, Some(building.id));
    }
}
