use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EntityKind;
use crate::patch::nullable;

/// A node in an assessment's location tree (building → floor → room …).
///
/// Root locations have no `parent_location_id`. Siblings are ordered by
/// `sort_order`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Location {
    pub id: Uuid,
    pub assessment_id: Uuid,
    #[serde(default)]
    pub parent_location_id: Option<Uuid>,
    #[schemars(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub label_abbreviation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`Location`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewLocation {
    pub assessment_id: Uuid,
    #[serde(default)]
    pub parent_location_id: Option<Uuid>,
    #[schemars(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub label_abbreviation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Partial update for [`Location`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LocationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub assessment_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Uuid>")]
    pub parent_location_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String", length(max = 255))]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>", length(max = 50))]
    pub label_abbreviation: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "i32")]
    pub sort_order: Option<i32>,
}

record!(Location, EntityKind::Location);
contracts!(Location, NewLocation, LocationUpdate, "location");
