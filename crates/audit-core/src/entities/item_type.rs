use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EntityKind;
use crate::patch::nullable;

/// Display color applied when a type is created without one.
pub const DEFAULT_TYPE_COLOR: &str = "#808080";

fn default_color() -> String {
    DEFAULT_TYPE_COLOR.to_string()
}

/// A category of inventoried item (door, window, fixture …).
///
/// Registered under the schema name `type`. `color` is free text (hex, named,
/// `rgb()` …) and defaults to grey only when omitted; an explicit `null` is
/// rejected.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ItemType {
    pub id: Uuid,
    #[schemars(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub label_abbreviation: Option<String>,
    #[serde(default = "default_color")]
    #[schemars(length(max = 50))]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`ItemType`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewItemType {
    #[schemars(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub label_abbreviation: Option<String>,
    #[serde(default = "default_color")]
    #[schemars(length(max = 50))]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewItemType {
    /// A type with only a name; every other field takes its default.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label_abbreviation: None,
            color: default_color(),
            description: None,
        }
    }
}

/// Partial update for [`ItemType`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ItemTypeUpdate {
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
    #[schemars(with = "String", length(max = 50))]
    pub color: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub description: Option<Option<String>>,
}

record!(ItemType, EntityKind::Type);
contracts!(ItemType, NewItemType, ItemTypeUpdate, "type");
