use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EntityKind;
use crate::patch::nullable;

const fn default_quantity() -> i32 {
    1
}

/// An inventoried existing-condition item at a location.
///
/// `label` and `attribute_values_hash` are computed by the server and are not
/// part of the create or update payloads.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Existing {
    pub id: Uuid,
    pub type_id: Uuid,
    pub location_id: Uuid,
    #[serde(default)]
    #[schemars(length(max = 255))]
    pub name: Option<String>,
    #[schemars(length(max = 255))]
    pub label: String,
    #[serde(default)]
    #[schemars(length(max = 100))]
    pub label_abbr: Option<String>,
    #[serde(default)]
    #[schemars(length(max = 255))]
    pub attribute_values_hash: Option<String>,
    #[serde(default = "default_quantity")]
    #[schemars(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`Existing`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewExisting {
    pub type_id: Uuid,
    pub location_id: Uuid,
    #[serde(default)]
    #[schemars(length(max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    #[schemars(length(max = 100))]
    pub label_abbr: Option<String>,
    #[serde(default = "default_quantity")]
    #[schemars(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewExisting {
    /// A single unnamed item of `type_id` at `location_id`.
    #[must_use]
    pub const fn new(type_id: Uuid, location_id: Uuid) -> Self {
        Self {
            type_id,
            location_id,
            name: None,
            label_abbr: None,
            quantity: default_quantity(),
            notes: None,
        }
    }
}

/// Partial update for [`Existing`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExistingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub type_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub location_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>", length(max = 255))]
    pub name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>", length(max = 100))]
    pub label_abbr: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "i32", range(min = 1))]
    pub quantity: Option<i32>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub notes: Option<Option<String>>,
}

record!(Existing, EntityKind::Existing);
contracts!(Existing, NewExisting, ExistingUpdate, "existing");
