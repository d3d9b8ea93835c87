//! Central schema registry for all audit contracts.
//!
//! The `SchemaRegistry` builds a JSON Schema for every full / create / update
//! contract at construction time, compiles a format-checking validator for
//! each, and turns validator output into per-field errors.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use audit_core::entities::{
    Assessment, AssessmentUpdate, Attribute, AttributeUpdate, AttributeValueset,
    AttributeValuesetUpdate, Contract, Existing, ExistingAttributeValue,
    ExistingAttributeValueUpdate, ExistingUpdate, ItemType, ItemTypeUpdate, Location,
    LocationUpdate, NewAssessment, NewAttribute, NewAttributeValueset, NewExisting,
    NewExistingAttributeValue, NewItemType, NewLocation, NewSite, NewTypeAttribute, NewValueset,
    NewValuesetValue, Site, SiteUpdate, TypeAttribute, TypeAttributeUpdate, Valueset,
    ValuesetUpdate, ValuesetValue, ValuesetValueUpdate,
};
use audit_core::enums::{AssessmentStatus, DataType};
use jsonschema::Validator;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::convert::{into_named, to_json_schema};
use crate::error::SchemaError;
use crate::validate::{FieldError, ValidationErrors};

struct Entry {
    schema: Value,
    validator: Validator,
}

impl Entry {
    fn compile<T: JsonSchema>() -> Result<Self, SchemaError> {
        let schema = to_json_schema::<T>(None)?;
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|e| SchemaError::Generation(e.to_string()))?;
        Ok(Self { schema, validator })
    }
}

/// Store of every audit contract schema with its compiled validator.
pub struct SchemaRegistry {
    entries: HashMap<&'static str, Entry>,
}

/// Compile a schema and insert it. Contract types register under their own
/// `Contract::SCHEMA` name; other types take an explicit one.
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, Entry::compile::<$ty>()?);
    };
    ($map:expr, $ty:ty) => {
        register!($map, <$ty as Contract>::SCHEMA, $ty)
    };
}

impl SchemaRegistry {
    /// Build a registry containing every entity contract plus the two wire
    /// enums.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Unsupported` or `SchemaError::Generation` if any
    /// contract fails to convert or compile.
    pub fn new() -> Result<Self, SchemaError> {
        let mut entries = HashMap::new();

        // --- Full records (11) ---
        register!(entries, Site);
        register!(entries, Assessment);
        register!(entries, Location);
        register!(entries, ItemType);
        register!(entries, Attribute);
        register!(entries, TypeAttribute);
        register!(entries, Existing);
        register!(entries, ExistingAttributeValue);
        register!(entries, Valueset);
        register!(entries, ValuesetValue);
        register!(entries, AttributeValueset);

        // --- Create payloads (11) ---
        register!(entries, NewSite);
        register!(entries, NewAssessment);
        register!(entries, NewLocation);
        register!(entries, NewItemType);
        register!(entries, NewAttribute);
        register!(entries, NewTypeAttribute);
        register!(entries, NewExisting);
        register!(entries, NewExistingAttributeValue);
        register!(entries, NewValueset);
        register!(entries, NewValuesetValue);
        register!(entries, NewAttributeValueset);

        // --- Update payloads (11) ---
        register!(entries, SiteUpdate);
        register!(entries, AssessmentUpdate);
        register!(entries, LocationUpdate);
        register!(entries, ItemTypeUpdate);
        register!(entries, AttributeUpdate);
        register!(entries, TypeAttributeUpdate);
        register!(entries, ExistingUpdate);
        register!(entries, ExistingAttributeValueUpdate);
        register!(entries, ValuesetUpdate);
        register!(entries, ValuesetValueUpdate);
        register!(entries, AttributeValuesetUpdate);

        // --- Enums (2) ---
        register!(entries, "assessment_status", AssessmentStatus);
        register!(entries, "data_type", DataType);

        Ok(Self { entries })
    }

    /// Get a schema (root form) by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|e| &e.schema)
    }

    /// Collect every field error `instance` has against the named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown.
    pub fn errors(&self, name: &str, instance: &Value) -> Result<ValidationErrors, SchemaError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
        Ok(entry
            .validator
            .iter_errors(instance)
            .map(|e| FieldError::from_validator(&e))
            .collect())
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` carrying every field error.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let errors = self.errors(name, instance)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed(errors))
        }
    }

    /// Validate raw input against `T`'s contract and deserialize it.
    ///
    /// Defaults declared on `T` apply only to absent fields; an explicit
    /// `null` on a non-nullable field fails validation first. Unknown fields,
    /// including system fields on create payloads, are dropped.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` on any contract violation, or
    /// `SchemaError::Deserialize` if the value cannot be read into `T`.
    pub fn parse<T: DeserializeOwned + Contract>(&self, instance: Value) -> Result<T, SchemaError> {
        self.parse_as(T::SCHEMA, instance)
    }

    /// Like [`parse`](Self::parse), with an explicit schema name.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse); also `SchemaError::NotFound` for an unknown
    /// name.
    pub fn parse_as<T: DeserializeOwned>(
        &self,
        name: &str,
        instance: Value,
    ) -> Result<T, SchemaError> {
        self.validate(name, &instance)?;
        serde_json::from_value(instance).map_err(|e| SchemaError::Deserialize {
            schema: name.to_string(),
            message: e.to_string(),
        })
    }

    /// Validate an already-typed payload against its contract.
    ///
    /// Rust types cannot express max lengths, formats, or minimums, so typed
    /// payloads are serialized and checked the same way raw input is.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` on any contract violation.
    pub fn check<T: Serialize + Contract>(&self, value: &T) -> Result<(), SchemaError> {
        let instance = serde_json::to_value(value).map_err(|e| SchemaError::Deserialize {
            schema: T::SCHEMA.to_string(),
            message: e.to_string(),
        })?;
        self.validate(T::SCHEMA, &instance)
    }

    /// The named (`$ref` / `$defs`) form of one schema, for export.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown.
    pub fn export(&self, name: &str) -> Result<Value, SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
        into_named(name, schema.clone())
    }

    /// Every schema in named form, keyed by name.
    ///
    /// # Errors
    ///
    /// Propagates `SchemaError::Generation` from [`into_named`].
    pub fn export_all(&self) -> Result<BTreeMap<&'static str, Value>, SchemaError> {
        self.entries
            .iter()
            .map(|(name, entry)| Ok((*name, into_named(name, entry.schema.clone())?)))
            .collect()
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.list())
            .finish()
    }
}
