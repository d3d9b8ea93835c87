use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EntityKind;

/// Pivot constraining an attribute to a valueset.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AttributeValueset {
    pub id: Uuid,
    pub attribute_id: Uuid,
    pub valueset_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`AttributeValueset`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAttributeValueset {
    pub attribute_id: Uuid,
    pub valueset_id: Uuid,
}

/// Partial update for [`AttributeValueset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AttributeValuesetUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub attribute_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub valueset_id: Option<Uuid>,
}

record!(AttributeValueset, EntityKind::AttributeValueset);
contracts!(
    AttributeValueset,
    NewAttributeValueset,
    AttributeValuesetUpdate,
    "attribute_valueset"
);
