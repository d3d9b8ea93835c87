use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{AssessmentStatus, EntityKind};
use crate::patch::nullable;

/// A scheduled audit of one site.
///
/// `assigned_date` is stamped by the server whenever `assigned_to_id` changes
/// to a new user, so it never appears in the create or update payloads.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Assessment {
    pub id: Uuid,
    pub site_id: Uuid,
    #[serde(default)]
    pub root_location_id: Option<Uuid>,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub assigned_to_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: AssessmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`Assessment`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAssessment {
    pub site_id: Uuid,
    #[serde(default)]
    pub root_location_id: Option<Uuid>,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub assigned_to_id: Option<Uuid>,
    #[serde(default)]
    pub status: AssessmentStatus,
}

/// Partial update for [`Assessment`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AssessmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub site_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Uuid>")]
    pub root_location_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "NaiveDate")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Uuid>")]
    pub assigned_to_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "AssessmentStatus")]
    pub status: Option<AssessmentStatus>,
}

record!(Assessment, EntityKind::Assessment);
contracts!(Assessment, NewAssessment, AssessmentUpdate, "assessment");
