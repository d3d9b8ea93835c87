//! Entity structs and their create/update payloads.
//!
//! Each entity maps to one table in the database. Every module defines three
//! contracts:
//! - the full record (`Site`), validating a fully materialized row;
//! - the create payload (`NewSite`), without system-generated or derived fields;
//! - the update payload (`SiteUpdate`), where every field is optional.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so the JSON
//! Schemas exported by `audit-schema` are generated from the same definitions
//! the Rust code uses.

macro_rules! record {
    ($ty:ty, $kind:expr) => {
        impl $crate::entities::Record for $ty {
            const KIND: $crate::enums::EntityKind = $kind;

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }
            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }
            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }
            fn deleted_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.deleted_at
            }
        }
    };
}

macro_rules! contracts {
    ($full:ty, $new:ty, $update:ty, $name:literal) => {
        impl $crate::entities::Contract for $full {
            const SCHEMA: &'static str = $name;
        }
        impl $crate::entities::Contract for $new {
            const SCHEMA: &'static str = concat!($name, "_create");
        }
        impl $crate::entities::Contract for $update {
            const SCHEMA: &'static str = concat!($name, "_update");
        }
    };
}

mod assessment;
mod attribute;
mod attribute_valueset;
mod existing;
mod existing_attribute_value;
mod item_type;
mod location;
mod site;
mod type_attribute;
mod valueset;
mod valueset_value;

pub use assessment::{Assessment, AssessmentUpdate, NewAssessment};
pub use attribute::{Attribute, AttributeUpdate, NewAttribute};
pub use attribute_valueset::{AttributeValueset, AttributeValuesetUpdate, NewAttributeValueset};
pub use existing::{Existing, ExistingUpdate, NewExisting};
pub use existing_attribute_value::{
    ExistingAttributeValue, ExistingAttributeValueUpdate, NewExistingAttributeValue,
};
pub use item_type::{DEFAULT_TYPE_COLOR, ItemType, ItemTypeUpdate, NewItemType};
pub use location::{Location, LocationUpdate, NewLocation};
pub use site::{NewSite, Site, SiteUpdate};
pub use type_attribute::{NewTypeAttribute, TypeAttribute, TypeAttributeUpdate};
pub use valueset::{NewValueset, Valueset, ValuesetUpdate};
pub use valueset_value::{NewValuesetValue, ValuesetValue, ValuesetValueUpdate};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::enums::EntityKind;

/// A persisted record carrying the base shape (`id` + timestamp triad).
pub trait Record {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Whether the record has been soft-deleted.
    fn is_trashed(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// A type with a named JSON Schema contract in the registry.
pub trait Contract {
    /// Registry name, e.g. `"site"`, `"site_create"`, `"site_update"`.
    const SCHEMA: &'static str;
}
