use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{DataType, EntityKind};
use crate::patch::nullable;

/// A named, ordered list of permitted values that attributes may draw from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Valueset {
    pub id: Uuid,
    #[schemars(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub label_abbreviation: Option<String>,
    pub data_type: DataType,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`Valueset`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewValueset {
    #[schemars(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub label_abbreviation: Option<String>,
    pub data_type: DataType,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update for [`Valueset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValuesetUpdate {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "DataType")]
    pub data_type: Option<DataType>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub description: Option<Option<String>>,
}

record!(Valueset, EntityKind::Valueset);
contracts!(Valueset, NewValueset, ValuesetUpdate, "valueset");
