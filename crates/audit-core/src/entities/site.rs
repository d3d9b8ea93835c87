use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EntityKind;
use crate::patch::nullable;

/// A physical site that hosts one or more assessments.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Site {
    pub id: Uuid,
    #[schemars(length(max = 255))]
    pub site_name: String,
    #[schemars(length(max = 255))]
    pub site_address: String,
    #[serde(default)]
    #[schemars(length(max = 255))]
    pub site_address_2: Option<String>,
    #[schemars(length(max = 100))]
    pub site_city: String,
    #[schemars(length(max = 50))]
    pub site_state: String,
    #[schemars(length(max = 20))]
    pub site_postal_code: String,
    #[serde(default)]
    #[schemars(length(max = 255))]
    pub site_contact_name: Option<String>,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub site_contact_phone: Option<String>,
    #[serde(default)]
    #[schemars(email, length(max = 255))]
    pub site_contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create payload for [`Site`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewSite {
    #[schemars(length(max = 255))]
    pub site_name: String,
    #[schemars(length(max = 255))]
    pub site_address: String,
    #[serde(default)]
    #[schemars(length(max = 255))]
    pub site_address_2: Option<String>,
    #[schemars(length(max = 100))]
    pub site_city: String,
    #[schemars(length(max = 50))]
    pub site_state: String,
    #[schemars(length(max = 20))]
    pub site_postal_code: String,
    #[serde(default)]
    #[schemars(length(max = 255))]
    pub site_contact_name: Option<String>,
    #[serde(default)]
    #[schemars(length(max = 50))]
    pub site_contact_phone: Option<String>,
    #[serde(default)]
    #[schemars(email, length(max = 255))]
    pub site_contact_email: Option<String>,
}

/// Partial update for [`Site`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SiteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String", length(max = 255))]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String", length(max = 255))]
    pub site_address: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>", length(max = 255))]
    pub site_address_2: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String", length(max = 100))]
    pub site_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String", length(max = 50))]
    pub site_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String", length(max = 20))]
    pub site_postal_code: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>", length(max = 255))]
    pub site_contact_name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>", length(max = 50))]
    pub site_contact_phone: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>", email, length(max = 255))]
    pub site_contact_email: Option<Option<String>>,
}

record!(Site, EntityKind::Site);
contracts!(Site, NewSite, SiteUpdate, "site");
