use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{DataType, EntityKind};
use crate::patch::nullable;

/// A typed property that item types can require (width, material, rating …).
///
/// `data_type` should not change once values reference the attribute; this is
/// a convention, not enforced.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Attribute {
    pub id: Uuid,
    #[schemars(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub label_abbreviation: Option<String>,
    pub data_type: DataType,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`Attribute`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAttribute {
    #[schemars(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub label_abbreviation: Option<String>,
    pub data_type: DataType,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update for [`Attribute`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AttributeUpdate {
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
    #[schemars(with = "Option<String>", length(max = 50))]
    pub unit_of_measure: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub description: Option<Option<String>>,
}

record!(Attribute, EntityKind::Attribute);
contracts!(Attribute, NewAttribute, AttributeUpdate, "attribute");
