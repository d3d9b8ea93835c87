use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EntityKind;

/// The value an existing item holds for one attribute.
///
/// `value` is free text whatever the attribute's declared data type. At most
/// one value exists per `(existing_id, attribute_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExistingAttributeValue {
    pub id: Uuid,
    pub existing_id: Uuid,
    pub attribute_id: Uuid,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`ExistingAttributeValue`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewExistingAttributeValue {
    pub existing_id: Uuid,
    pub attribute_id: Uuid,
    pub value: String,
}

/// Partial update for [`ExistingAttributeValue`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExistingAttributeValueUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub existing_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Uuid")]
    pub attribute_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String")]
    pub value: Option<String>,
}

record!(ExistingAttributeValue, EntityKind::ExistingAttributeValue);
contracts!(
    ExistingAttributeValue,
    NewExistingAttributeValue,
    ExistingAttributeValueUpdate,
    "existing_attribute_value"
);
