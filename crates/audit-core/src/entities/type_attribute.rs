use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EntityKind;
use crate::patch::nullable;

/// Pivot linking an item type to one of its attributes.
///
/// At most one link exists per `(type_id, attribute_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TypeAttribute {
    pub id: Uuid,
    pub type_id: Uuid,
    pub attribute_id: Uuid,
    #[serde(default)]
    pub label_concat_order: Option<i32>,
    #[serde(default)]
    pub is_required: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`TypeAttribute`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewTypeAttribute {
    pub type_id: Uuid,
    pub attribute_id: Uuid,
    #[serde(default)]
    pub label_concat_order: Option<i32>,
    #[serde(default)]
    pub is_required: bool,
}

/// Partial update for [`TypeAttribute`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TypeAttributeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub type_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub attribute_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<i32>")]
    pub label_concat_order: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "bool")]
    pub is_required: Option<bool>,
}

record!(TypeAttribute, EntityKind::TypeAttribute);
contracts!(TypeAttribute, NewTypeAttribute, TypeAttributeUpdate, "type_attribute");
