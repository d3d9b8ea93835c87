//! End-to-end record lifecycles through the public `AuditService` API.

use audit_config::SeedConfig;
use audit_core::entities::{
    NewAssessment, NewAttribute, NewExisting, NewItemType, NewLocation, NewSite,
};
use audit_core::enums::{AssessmentStatus, DataType, EntityKind};
use audit_db::helpers::{text, timestamp, uuid};
use audit_db::repos::existing::ExistingFilter;
use audit_db::updates::assessment::{AssessmentUpdateBuilder, LocationUpdateBuilder};
use audit_db::updates::existing::ExistingUpdateBuilder;
use audit_db::{
    AuditService, DatabaseError, DerivedFields, IntegrityViolation, LabelInput, ServiceOptions,
};
use chrono::{NaiveDate, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

async fn service() -> AuditService {
    AuditService::open_local(":memory:")
        .await
        .expect("in-memory database should open")
}

fn site(name: &str) -> NewSite {
    NewSite {
        site_name: name.into(),
        site_address: "100 River Rd".into(),
        site_address_2: None,
        site_city: "Springfield".into(),
        site_state: "IL".into(),
        site_postal_code: "62701".into(),
        site_contact_name: Some("Pat Doe".into()),
        site_contact_phone: None,
        site_contact_email: None,
    }
}

fn assessment(site_id: Uuid) -> NewAssessment {
    NewAssessment {
        site_id,
        root_location_id: None,
        scheduled_date: NaiveDate::from_ymd_opt(2026, 12, 7).unwrap(),
        assigned_to_id: None,
        status: AssessmentStatus::Planned,
    }
}

fn location(assessment_id: Uuid, parent: Option<Uuid>, name: &str) -> NewLocation {
    NewLocation {
        assessment_id,
        parent_location_id: parent,
        name: name.into(),
        label_abbreviation: None,
        description: None,
        sort_order: 0,
    }
}

fn attribute(name: &str, data_type: DataType) -> NewAttribute {
    NewAttribute {
        name: name.into(),
        label_abbreviation: None,
        data_type,
        unit_of_measure: None,
        description: None,
    }
}

async fn user(svc: &AuditService, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    svc.db()
        .execute(
            "INSERT INTO users (id, name, email, created_at, updated_at)
             VALUES (?1, 'Inspector', ?2, ?3, ?3)",
            vec![uuid(id), text(email), text(timestamp(Utc::now()))],
        )
        .await
        .unwrap();
    id
}

/// Labels an item by its attribute values in `label_concat_order`, joined
/// with spaces, and fingerprints the same sequence.
struct ValueLabel;

impl ValueLabel {
    fn parts(input: &LabelInput<'_>) -> Vec<String> {
        input
            .type_attributes
            .iter()
            .filter(|ta| ta.label_concat_order.is_some())
            .filter_map(|ta| {
                input
                    .values
                    .iter()
                    .find(|v| v.attribute_id == ta.attribute_id)
                    .map(|v| v.value.clone())
            })
            .collect()
    }
}

impl DerivedFields for ValueLabel {
    fn label(&self, input: &LabelInput<'_>) -> String {
        let parts = Self::parts(input);
        if parts.is_empty() {
            input.item_type.name.clone()
        } else {
            format!("{} {}", input.item_type.name, parts.join(" "))
        }
    }

    fn attribute_values_hash(&self, input: &LabelInput<'_>) -> Option<String> {
        let parts = Self::parts(input);
        (!parts.is_empty()).then(|| parts.join("|"))
    }
}

#[tokio::test]
async fn site_with_live_assessment_cannot_be_deleted() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();

    let err = svc.delete_site(riverside.id).await.unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::Integrity(IntegrityViolation::Restricted {
            entity: EntityKind::Site,
            dependents: EntityKind::Assessment,
        })
    ));

    // A trashed assessment no longer blocks the soft delete, but still
    // blocks the hard one.
    svc.delete_assessment(visit.id).await.unwrap();
    let err = svc.force_delete_site(riverside.id).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Integrity(IntegrityViolation::Restricted { .. })));
    svc.delete_site(riverside.id).await.unwrap();
    assert!(matches!(
        svc.get_site(riverside.id).await.unwrap_err(),
        DatabaseError::NotFound { entity: EntityKind::Site, .. }
    ));
}

#[tokio::test]
async fn assessment_delete_cascades_and_restore_brings_back_only_its_batch() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let building = svc
        .create_location(location(visit.id, None, "Building A"))
        .await
        .unwrap();
    let office = svc
        .create_location(location(visit.id, Some(building.id), "Office 101"))
        .await
        .unwrap();
    let lobby = svc
        .create_location(location(visit.id, Some(building.id), "Lobby"))
        .await
        .unwrap();
    let door = svc.create_type(NewItemType::named("Door")).await.unwrap();
    let item = svc
        .create_existing(NewExisting::new(door.id, office.id))
        .await
        .unwrap();

    // Trashed earlier, separately: must stay trashed after the restore.
    svc.delete_location(lobby.id).await.unwrap();

    svc.delete_assessment(visit.id).await.unwrap();
    assert!(svc.get_location(building.id).await.is_err());
    assert!(svc.get_location(office.id).await.is_err());
    assert!(svc.get_existing(item.id).await.is_err());

    let restored = svc.restore_assessment(visit.id).await.unwrap();
    assert_eq!(restored.deleted_at, None);
    assert!(svc.get_location(building.id).await.is_ok());
    assert!(svc.get_location(office.id).await.is_ok());
    assert!(svc.get_existing(item.id).await.is_ok());
    assert!(svc.get_location(lobby.id).await.is_err());

    let names: Vec<_> = svc
        .list_locations(visit.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["Building A", "Office 101"]);
}

#[tokio::test]
async fn restoring_under_a_trashed_owner_is_refused() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let hall = svc
        .create_location(location(visit.id, None, "Hall"))
        .await
        .unwrap();

    svc.delete_location(hall.id).await.unwrap();
    svc.delete_assessment(visit.id).await.unwrap();

    let err = svc.restore_location(hall.id).await.unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidState(_)));

    svc.restore_assessment(visit.id).await.unwrap();
    let hall = svc.restore_location(hall.id).await.unwrap();
    assert_eq!(hall.deleted_at, None);
}

#[tokio::test]
async fn location_moves_may_not_form_cycles() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let floor = svc
        .create_location(location(visit.id, None, "Floor 1"))
        .await
        .unwrap();
    let wing = svc
        .create_location(location(visit.id, Some(floor.id), "East wing"))
        .await
        .unwrap();
    let room = svc
        .create_location(location(visit.id, Some(wing.id), "Room 12"))
        .await
        .unwrap();

    for parent in [floor.id, room.id] {
        let err = svc
            .update_location(
                floor.id,
                LocationUpdateBuilder::new()
                    .parent_location_id(Some(parent))
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)), "{err:?}");
    }

    let ancestry: Vec<_> = svc
        .location_ancestors(room.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ancestry.len(), 2);
    assert!(ancestry.contains(&floor.id) && ancestry.contains(&wing.id));

    let tree = svc.location_tree(visit.id).await.unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].children[0].children[0].location.id, room.id);
}

#[tokio::test]
async fn assignment_stamps_and_clears_the_assigned_date() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    assert_eq!(visit.assigned_date, None);

    let inspector = user(&svc, "inspector@example.com").await;
    let assigned = svc
        .update_assessment(
            visit.id,
            AssessmentUpdateBuilder::new()
                .assigned_to_id(Some(inspector))
                .status(AssessmentStatus::Assigned)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(assigned.assigned_to_id, Some(inspector));
    assert_eq!(assigned.status, AssessmentStatus::Assigned);
    let stamped = assigned.assigned_date.expect("assignment should stamp a date");

    let again = svc
        .update_assessment(
            visit.id,
            AssessmentUpdateBuilder::new()
                .assigned_to_id(Some(inspector))
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(again.assigned_date, Some(stamped));

    let cleared = svc
        .update_assessment(
            visit.id,
            AssessmentUpdateBuilder::new().assigned_to_id(None).build(),
        )
        .await
        .unwrap();
    assert_eq!(cleared.assigned_to_id, None);
    assert_eq!(cleared.assigned_date, None);

    let err = svc
        .update_assessment(
            visit.id,
            AssessmentUpdateBuilder::new()
                .assigned_to_id(Some(Uuid::new_v4()))
                .build(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::Integrity(IntegrityViolation::ForeignKey)
    ));
}

#[tokio::test]
async fn hard_deleting_the_root_location_detaches_it_from_the_assessment() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let campus = svc
        .create_location(location(visit.id, None, "Campus"))
        .await
        .unwrap();
    svc.update_assessment(
        visit.id,
        AssessmentUpdateBuilder::new()
            .root_location_id(Some(campus.id))
            .build(),
    )
    .await
    .unwrap();

    svc.delete_location(campus.id).await.unwrap();
    assert_eq!(
        svc.get_assessment(visit.id).await.unwrap().root_location_id,
        Some(campus.id)
    );

    svc.force_delete_location(campus.id).await.unwrap();
    assert_eq!(svc.get_assessment(visit.id).await.unwrap().root_location_id, None);
    assert!(matches!(
        svc.force_delete_location(campus.id).await.unwrap_err(),
        DatabaseError::NotFound { .. }
    ));
}

#[tokio::test]
async fn one_value_per_item_and_attribute() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let room = svc
        .create_location(location(visit.id, None, "Room"))
        .await
        .unwrap();
    let door = svc.create_type(NewItemType::named("Door")).await.unwrap();
    let width = svc
        .create_attribute(attribute("Width", DataType::Number))
        .await
        .unwrap();
    let item = svc
        .create_existing(NewExisting::new(door.id, room.id))
        .await
        .unwrap();

    let first = svc.set_attribute_value(item.id, width.id, "36").await.unwrap();
    let second = svc.set_attribute_value(item.id, width.id, "42").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.value, "42");

    let err = svc
        .create_existing_attribute_value(audit_core::entities::NewExistingAttributeValue {
            existing_id: item.id,
            attribute_id: width.id,
            value: "48".into(),
        })
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(svc.existing_attribute_values(item.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn numeric_attributes_reject_text_only_when_enforced() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let room = svc
        .create_location(location(visit.id, None, "Room"))
        .await
        .unwrap();
    let door = svc.create_type(NewItemType::named("Door")).await.unwrap();
    let width = svc
        .create_attribute(attribute("Width", DataType::Number))
        .await
        .unwrap();
    let item = svc
        .create_existing(NewExisting::new(door.id, room.id))
        .await
        .unwrap();

    svc.set_attribute_value(item.id, width.id, "wide").await.unwrap();

    let strict = svc.with_options(ServiceOptions {
        enforce_attribute_data_type: true,
    });
    let err = strict
        .set_attribute_value(item.id, width.id, "narrow")
        .await
        .unwrap_err();
    let DatabaseError::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    assert!(errors.for_field("/value").is_some());
    strict.set_attribute_value(item.id, width.id, "36.5").await.unwrap();
}

#[tokio::test]
async fn labels_follow_attribute_values_and_type_changes() {
    let svc = service().await.with_derived_fields(ValueLabel);
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let room = svc
        .create_location(location(visit.id, None, "Room"))
        .await
        .unwrap();
    let door = svc.create_type(NewItemType::named("Door")).await.unwrap();
    let width = svc
        .create_attribute(attribute("Width", DataType::Number))
        .await
        .unwrap();
    let finish = svc
        .create_attribute(attribute("Finish", DataType::Characters))
        .await
        .unwrap();
    svc.attach_attribute(door.id, finish.id, Some(2), false)
        .await
        .unwrap();
    svc.attach_attribute(door.id, width.id, Some(1), true)
        .await
        .unwrap();

    let item = svc
        .create_existing(NewExisting::new(door.id, room.id))
        .await
        .unwrap();
    assert_eq!(item.label, "Door");
    assert_eq!(item.attribute_values_hash, None);

    svc.set_attribute_value(item.id, finish.id, "Oak").await.unwrap();
    svc.set_attribute_value(item.id, width.id, "36").await.unwrap();
    let item = svc.get_existing(item.id).await.unwrap();
    assert_eq!(item.label, "Door 36 Oak");
    assert_eq!(item.attribute_values_hash.as_deref(), Some("36|Oak"));

    let same = svc
        .list_existing(&ExistingFilter {
            attribute_values_hash: Some("36|Oak".into()),
            ..ExistingFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(same.iter().map(|e| e.id).collect::<Vec<_>>(), vec![item.id]);

    svc.detach_attribute(door.id, finish.id).await.unwrap();
    assert_eq!(svc.get_existing(item.id).await.unwrap().label, "Door 36");

    svc.delete_attribute(width.id).await.unwrap();
    assert_eq!(svc.get_existing(item.id).await.unwrap().label, "Door");

    let updated = svc
        .update_existing(item.id, ExistingUpdateBuilder::new().quantity(3).build())
        .await
        .unwrap();
    assert_eq!(updated.quantity, 3);
    assert_eq!(updated.label, "Door");
}

#[tokio::test]
async fn type_in_use_is_restricted_and_deleting_it_leaves_items() {
    let svc = service().await;
    let riverside = svc.create_site(site("Riverside")).await.unwrap();
    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let room = svc
        .create_location(location(visit.id, None, "Room"))
        .await
        .unwrap();
    let door = svc.create_type(NewItemType::named("Door")).await.unwrap();
    let item = svc
        .create_existing(NewExisting::new(door.id, room.id))
        .await
        .unwrap();

    assert!(matches!(
        svc.delete_type(door.id).await.unwrap_err(),
        DatabaseError::Integrity(IntegrityViolation::Restricted {
            entity: EntityKind::Type,
            dependents: EntityKind::Existing,
        })
    ));

    svc.force_delete_existing(item.id).await.unwrap();
    svc.delete_type(door.id).await.unwrap();
    svc.force_delete_type(door.id).await.unwrap();
    assert!(svc.list_types().await.unwrap().is_empty());
}

#[tokio::test]
async fn seeding_twice_is_harmless() {
    let svc = service().await;
    let config = SeedConfig::default();

    let first = svc.seed(&config).await.unwrap();
    let second = svc.seed(&config).await.unwrap();
    assert!(first.changed());
    assert!(!second.changed());
    assert_eq!(first.admin_id, second.admin_id);

    let mut rows = svc
        .db()
        .query(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            vec![text(config.admin_email.as_str())],
        )
        .await
        .unwrap();
    let admins: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
    assert_eq!(admins, 1);
}

#[tokio::test]
async fn empty_text_is_kept_distinct_from_null() {
    let svc = service().await;
    let riverside = svc
        .create_site(NewSite {
            site_address_2: Some(String::new()),
            ..site("Riverside")
        })
        .await
        .unwrap();
    assert_eq!(
        svc.get_site(riverside.id).await.unwrap().site_address_2,
        Some(String::new())
    );
    assert_eq!(svc.get_site(riverside.id).await.unwrap().site_contact_phone, None);

    let visit = svc.create_assessment(assessment(riverside.id)).await.unwrap();
    let room = svc
        .create_location(location(visit.id, None, "Room"))
        .await
        .unwrap();
    let door = svc.create_type(NewItemType::named("Door")).await.unwrap();
    let item = svc
        .create_existing(NewExisting {
            name: Some("Front door".into()),
            notes: Some(String::new()),
            ..NewExisting::new(door.id, room.id)
        })
        .await
        .unwrap();
    assert_eq!(
        svc.get_existing(item.id).await.unwrap().notes,
        Some(String::new())
    );

    let renamed = svc
        .update_existing(
            item.id,
            ExistingUpdateBuilder::new().name(Some(String::new())).build(),
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, Some(String::new()));
    assert_eq!(renamed.label, "Door");

    let cleared = svc
        .update_existing(item.id, ExistingUpdateBuilder::new().notes(None).build())
        .await
        .unwrap();
    assert_eq!(cleared.notes, None);
}
