//! Shared test utilities for audit-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use audit_core::entities::{
        Assessment, Existing, ItemType, Location, NewAssessment, NewAttribute, NewExisting,
        NewItemType, NewLocation, NewSite, NewValueset, Site,
    };
    use audit_core::enums::{AssessmentStatus, DataType};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::AuditDb;
    use crate::helpers::{text, timestamp, uuid};
    use crate::service::AuditService;

    /// Create an in-memory `AuditService` with default options.
    pub async fn test_service() -> AuditService {
        let db = AuditDb::open_local(":memory:").await.unwrap();
        AuditService::from_db(db).unwrap()
    }

    pub fn new_site(name: &str) -> NewSite {
        NewSite {
            site_name: name.into(),
            site_address: "1 Main Street".into(),
            site_address_2: None,
            site_city: "Springfield".into(),
            site_state: "IL".into(),
            site_postal_code: "62701".into(),
            site_contact_name: None,
            site_contact_phone: None,
            site_contact_email: Some("facilities@example.com".into()),
        }
    }

    pub fn new_assessment(site_id: Uuid) -> NewAssessment {
        NewAssessment {
            site_id,
            root_location_id: None,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            assigned_to_id: None,
            status: AssessmentStatus::Planned,
        }
    }

    pub fn new_attribute(name: &str, data_type: DataType) -> NewAttribute {
        NewAttribute {
            name: name.into(),
            label_abbreviation: None,
            data_type,
            unit_of_measure: None,
            description: None,
        }
    }

    pub fn new_valueset(name: &str, data_type: DataType) -> NewValueset {
        NewValueset {
            name: name.into(),
            label_abbreviation: None,
            data_type,
            description: None,
        }
    }

    /// A fresh site with one planned assessment.
    pub async fn seed_assessment(svc: &AuditService) -> (Site, Assessment) {
        let site = svc.create_site(new_site("Test Site")).await.unwrap();
        let assessment = svc.create_assessment(new_assessment(site.id)).await.unwrap();
        (site, assessment)
    }

    pub async fn seed_location(
        svc: &AuditService,
        assessment_id: Uuid,
        parent_location_id: Option<Uuid>,
        name: &str,
    ) -> Location {
        svc.create_location(NewLocation {
            assessment_id,
            parent_location_id,
            name: name.into(),
            label_abbreviation: None,
            description: None,
            sort_order: 0,
        })
        .await
        .unwrap()
    }

    pub async fn seed_type(svc: &AuditService, name: &str) -> ItemType {
        svc.create_type(NewItemType::named(name)).await.unwrap()
    }

    pub async fn seed_existing(svc: &AuditService, type_id: Uuid, location_id: Uuid) -> Existing {
        svc.create_existing(NewExisting::new(type_id, location_id))
            .await
            .unwrap()
    }

    /// Insert a user row directly; users have no repository.
    pub async fn seed_user(svc: &AuditService, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        svc.db()
            .execute(
                "INSERT INTO users (id, name, email, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                vec![
                    uuid(id),
                    text("Test User"),
                    text(email),
                    text(timestamp(Utc::now())),
                ],
            )
            .await
            .unwrap();
        id
    }
}
