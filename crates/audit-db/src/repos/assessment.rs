//! Assessment repository: CRUD, filtering, and assignment stamping.

use audit_core::entities::{Assessment, AssessmentUpdate, NewAssessment};
use audit_core::enums::{AssessmentStatus, EntityKind};
use audit_core::ids::new_id;
use chrono::Utc;
use libsql::Value;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, get_opt_string, get_opt_uuid, get_uuid, opt_uuid, parse_date, parse_datetime,
    parse_enum, parse_optional_datetime, text, timestamp, uuid,
};
use crate::service::AuditService;

const COLUMNS: &str = "id, site_id, root_location_id, scheduled_date, assigned_to_id, \
    assigned_date, status, created_at, updated_at, deleted_at";

fn row_to_assessment(row: &libsql::Row) -> Result<Assessment, DatabaseError> {
    Ok(Assessment {
        id: get_uuid(row, 0)?,
        site_id: get_uuid(row, 1)?,
        root_location_id: get_opt_uuid(row, 2)?,
        scheduled_date: parse_date(&row.get::<String>(3)?)?,
        assigned_to_id: get_opt_uuid(row, 4)?,
        assigned_date: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        status: parse_enum(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
    })
}

/// Optional filters for [`AuditService::list_assessments`]. Unset fields
/// match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentFilter {
    pub site_id: Option<Uuid>,
    pub status: Option<AssessmentStatus>,
    pub assigned_to_id: Option<Uuid>,
}

impl AuditService {
    /// Create an assessment. Assigning a user at creation stamps
    /// `assigned_date`.
    pub async fn create_assessment(&self, new: NewAssessment) -> Result<Assessment, DatabaseError> {
        self.schema().check(&new)?;
        self.ensure_live(EntityKind::Site, new.site_id).await?;

        let id = new_id();
        if let Some(root) = new.root_location_id {
            self.check_root(id, root).await?;
        }
        let now = timestamp(Utc::now());
        let assigned_date = new
            .assigned_to_id
            .map_or(Value::Null, |_| text(now.clone()));

        self.db()
            .execute(
                "INSERT INTO assessments (id, site_id, root_location_id, scheduled_date,
                    assigned_to_id, assigned_date, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                vec![
                    uuid(id),
                    uuid(new.site_id),
                    opt_uuid(new.root_location_id),
                    text(new.scheduled_date.to_string()),
                    opt_uuid(new.assigned_to_id),
                    assigned_date,
                    text(new.status.as_str()),
                    text(now),
                ],
            )
            .await?;

        self.get_assessment(id).await
    }

    pub async fn get_assessment(&self, id: Uuid) -> Result<Assessment, DatabaseError> {
        self.fetch_live(EntityKind::Assessment, COLUMNS, id, row_to_assessment)
            .await
    }

    /// Live assessments matching `filter`, by scheduled date then creation.
    pub async fn list_assessments(
        &self,
        filter: &AssessmentFilter,
    ) -> Result<Vec<Assessment>, DatabaseError> {
        let mut conditions = vec!["deleted_at IS NULL".to_string()];
        let mut params = Vec::new();
        if let Some(site_id) = filter.site_id {
            params.push(uuid(site_id));
            conditions.push(format!("site_id = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(text(status.as_str()));
            conditions.push(format!("status = ?{}", params.len()));
        }
        if let Some(user) = filter.assigned_to_id {
            params.push(uuid(user));
            conditions.push(format!("assigned_to_id = ?{}", params.len()));
        }

        let sql = format!(
            "SELECT {COLUMNS} FROM assessments WHERE {} ORDER BY scheduled_date, created_at, rowid",
            conditions.join(" AND ")
        );
        self.fetch_all(&sql, params, row_to_assessment).await
    }

    /// Apply a partial update.
    ///
    /// Setting `assigned_to_id` to a different user re-stamps `assigned_date`;
    /// clearing it clears the date.
    pub async fn update_assessment(
        &self,
        id: Uuid,
        update: AssessmentUpdate,
    ) -> Result<Assessment, DatabaseError> {
        self.schema().check(&update)?;
        let current = self.get_assessment(id).await?;

        let mut set = SetClause::new();
        if let Some(site_id) = update.site_id {
            self.ensure_live(EntityKind::Site, site_id).await?;
            set.set("site_id", uuid(site_id));
        }
        if let Some(root) = update.root_location_id {
            if let Some(root) = root {
                self.check_root(id, root).await?;
            }
            set.set("root_location_id", opt_uuid(root));
        }
        if let Some(date) = update.scheduled_date {
            set.set("scheduled_date", text(date.to_string()));
        }
        if let Some(assignee) = update.assigned_to_id {
            match assignee {
                Some(user) if current.assigned_to_id != Some(user) => {
                    set.set("assigned_to_id", uuid(user));
                    set.set("assigned_date", text(timestamp(Utc::now())));
                }
                Some(_) => {}
                None => {
                    set.set("assigned_to_id", Value::Null);
                    set.set("assigned_date", Value::Null);
                }
            }
        }
        if let Some(status) = update.status {
            set.set("status", text(status.as_str()));
        }

        if set.is_empty() {
            return Ok(current);
        }
        self.apply_update(EntityKind::Assessment, id, set).await?;
        self.get_assessment(id).await
    }

    /// The root must be a live location inside this assessment's own tree.
    async fn check_root(&self, assessment_id: Uuid, root: Uuid) -> Result<(), DatabaseError> {
        let location = self.get_location(root).await?;
        if location.assessment_id != assessment_id {
            return Err(DatabaseError::InvalidState(format!(
                "root location {root} belongs to another assessment"
            )));
        }
        Ok(())
    }

    /// Soft-delete an assessment together with its location tree and the
    /// items inventoried there.
    pub async fn delete_assessment(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.soft_delete(EntityKind::Assessment, id).await
    }

    pub async fn restore_assessment(&self, id: Uuid) -> Result<Assessment, DatabaseError> {
        self.restore(EntityKind::Assessment, id).await?;
        self.get_assessment(id).await
    }

    pub async fn force_delete_assessment(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::Assessment, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntegrityViolation;
    use crate::test_support::helpers::{
        new_assessment, new_site, seed_assessment, seed_location, seed_user, test_service,
    };
    use crate::updates::assessment::AssessmentUpdateBuilder;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_assessment_defaults_to_planned_and_unassigned() {
        let svc = test_service().await;
        let (site, assessment) = seed_assessment(&svc).await;

        assert_eq!(assessment.site_id, site.id);
        assert_eq!(assessment.status, AssessmentStatus::Planned);
        assert_eq!(assessment.assigned_to_id, None);
        assert_eq!(assessment.assigned_date, None);
        assert_eq!(assessment.root_location_id, None);
    }

    #[tokio::test]
    async fn create_assessment_requires_live_site() {
        let svc = test_service().await;
        let err = svc
            .create_assessment(new_assessment(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: EntityKind::Site, .. }));
    }

    #[tokio::test]
    async fn assigning_at_creation_stamps_the_date() {
        let svc = test_service().await;
        let site = svc.create_site(new_site("Depot")).await.unwrap();
        let user = seed_user(&svc, "auditor@example.com").await;

        let mut new = new_assessment(site.id);
        new.assigned_to_id = Some(user);
        let assessment = svc.create_assessment(new).await.unwrap();

        assert_eq!(assessment.assigned_to_id, Some(user));
        assert_eq!(assessment.assigned_date, Some(assessment.created_at));
    }

    #[tokio::test]
    async fn assigning_unknown_user_violates_foreign_key() {
        let svc = test_service().await;
        let site = svc.create_site(new_site("Depot")).await.unwrap();
        let mut new = new_assessment(site.id);
        new.assigned_to_id = Some(Uuid::new_v4());

        let err = svc.create_assessment(new).await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Integrity(IntegrityViolation::ForeignKey)
        ));
    }

    #[tokio::test]
    async fn reassignment_restamps_and_clearing_clears() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let first = seed_user(&svc, "first@example.com").await;
        let second = seed_user(&svc, "second@example.com").await;

        let assigned = svc
            .update_assessment(
                assessment.id,
                AssessmentUpdateBuilder::new().assigned_to_id(Some(first)).build(),
            )
            .await
            .unwrap();
        let first_stamp = assigned.assigned_date.unwrap();

        let same = svc
            .update_assessment(
                assessment.id,
                AssessmentUpdateBuilder::new().assigned_to_id(Some(first)).build(),
            )
            .await
            .unwrap();
        assert_eq!(same.assigned_date, Some(first_stamp));

        let moved = svc
            .update_assessment(
                assessment.id,
                AssessmentUpdateBuilder::new().assigned_to_id(Some(second)).build(),
            )
            .await
            .unwrap();
        assert_eq!(moved.assigned_to_id, Some(second));
        assert!(moved.assigned_date.unwrap() >= first_stamp);

        let cleared = svc
            .update_assessment(
                assessment.id,
                AssessmentUpdateBuilder::new().assigned_to_id(None).build(),
            )
            .await
            .unwrap();
        assert_eq!(cleared.assigned_to_id, None);
        assert_eq!(cleared.assigned_date, None);
    }

    #[tokio::test]
    async fn any_status_can_follow_any_other() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;

        for status in [
            AssessmentStatus::Complete,
            AssessmentStatus::Planned,
            AssessmentStatus::InQc,
            AssessmentStatus::Assigned,
            AssessmentStatus::InProgress,
        ] {
            let updated = svc
                .update_assessment(
                    assessment.id,
                    AssessmentUpdateBuilder::new().status(status).build(),
                )
                .await
                .unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[tokio::test]
    async fn list_assessments_filters() {
        let svc = test_service().await;
        let (site, first) = seed_assessment(&svc).await;
        let other_site = svc.create_site(new_site("Annex")).await.unwrap();
        let mut later = new_assessment(other_site.id);
        later.scheduled_date = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        later.status = AssessmentStatus::InProgress;
        let second = svc.create_assessment(later).await.unwrap();

        let all = svc.list_assessments(&AssessmentFilter::default()).await.unwrap();
        assert_eq!(
            all.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );

        let by_site = svc
            .list_assessments(&AssessmentFilter {
                site_id: Some(site.id),
                ..AssessmentFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_site.len(), 1);
        assert_eq!(by_site[0].id, first.id);

        let in_progress = svc
            .list_assessments(&AssessmentFilter {
                status: Some(AssessmentStatus::InProgress),
                ..AssessmentFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].id, second.id);
    }

    #[tokio::test]
    async fn root_location_can_point_into_the_tree() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let root = seed_location(&svc, assessment.id, None, "Building").await;

        let updated = svc
            .update_assessment(
                assessment.id,
                AssessmentUpdateBuilder::new()
                    .root_location_id(Some(root.id))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.root_location_id, Some(root.id));

        // Hard-deleting the location nulls the reference.
        svc.force_delete_location(root.id).await.unwrap();
        let reloaded = svc.get_assessment(assessment.id).await.unwrap();
        assert_eq!(reloaded.root_location_id, None);
    }

    #[tokio::test]
    async fn root_location_from_another_assessment_is_refused() {
        let svc = test_service().await;
        let (site, visit) = seed_assessment(&svc).await;
        let other = svc.create_assessment(new_assessment(site.id)).await.unwrap();
        let foreign = seed_location(&svc, other.id, None, "Annex").await;

        let err = svc
            .update_assessment(
                visit.id,
                AssessmentUpdateBuilder::new()
                    .root_location_id(Some(foreign.id))
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert_eq!(svc.get_assessment(visit.id).await.unwrap().root_location_id, None);

        // A new assessment owns no locations yet, so any root is foreign.
        let err = svc
            .create_assessment(NewAssessment {
                root_location_id: Some(foreign.id),
                ..new_assessment(site.id)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));

        let err = svc
            .create_assessment(NewAssessment {
                root_location_id: Some(Uuid::new_v4()),
                ..new_assessment(site.id)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: EntityKind::Location, .. }));
    }

    #[tokio::test]
    async fn delete_assessment_cascades_to_locations() {
        let svc = test_service().await;
        let (_, assessment) = seed_assessment(&svc).await;
        let building = seed_location(&svc, assessment.id, None, "Building").await;
        let floor = seed_location(&svc, assessment.id, Some(building.id), "Floor 1").await;

        svc.delete_assessment(assessment.id).await.unwrap();
        assert!(svc.get_location(building.id).await.is_err());
        assert!(svc.get_location(floor.id).await.is_err());

        svc.restore_assessment(assessment.id).await.unwrap();
        assert_eq!(svc.get_location(floor.id).await.unwrap().name, "Floor 1");
    }
}
