//! Contract → JSON Schema conversion.
//!
//! Schemas are generated from the `audit-core` types with `schemars` and then
//! normalized for cross-language consumers:
//! - every `format: "uuid"` node also carries the canonical UUID `pattern`, so
//!   validators that ignore formats still enforce the shape;
//! - integer `format`s (`int32`, `uint8`, ...) become explicit `minimum` /
//!   `maximum` bounds, keeping any tighter bound the field already declares;
//! - every keyword is checked against the set this crate knows how to emit;
//!   anything else is rejected rather than silently dropped.

use std::collections::BTreeMap;

use audit_core::ids::UUID_PATTERN;
use schemars::{JsonSchema, schema_for};
use serde_json::{Map, Value, json};

use crate::error::SchemaError;
use crate::registry::SchemaRegistry;
use crate::validate::escape_pointer;

/// Dialect declared by every generated schema.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

const SUPPORTED_KEYWORDS: &[&str] = &[
    "$schema",
    "$ref",
    "$defs",
    "title",
    "description",
    "type",
    "properties",
    "required",
    "additionalProperties",
    "items",
    "enum",
    "const",
    "oneOf",
    "anyOf",
    "allOf",
    "format",
    "pattern",
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "default",
    "examples",
    "deprecated",
    "readOnly",
    "writeOnly",
];

/// Generate the JSON Schema for `T`.
///
/// Without a `name`, returns a draft 2020-12 root schema. With a name, the
/// body moves under `$defs/<name>` next to any nested definitions and the root
/// becomes a `$ref` to it, so several exported schemas can be merged and
/// referenced by name.
///
/// # Errors
///
/// Returns `SchemaError::Unsupported` if the generated schema contains a
/// keyword outside the supported set, or `SchemaError::Generation` if it
/// cannot be serialized.
pub fn to_json_schema<T: JsonSchema>(name: Option<&str>) -> Result<Value, SchemaError> {
    let mut root = serde_json::to_value(schema_for!(T))
        .map_err(|e| SchemaError::Generation(e.to_string()))?;
    normalize(&mut root, "")?;
    match name {
        None => Ok(root),
        Some(name) => into_named(name, root),
    }
}

/// Rewrite a root schema into the named `$ref` / `$defs` form.
///
/// # Errors
///
/// Returns `SchemaError::Generation` if `root` is not a JSON object.
pub fn into_named(name: &str, root: Value) -> Result<Value, SchemaError> {
    let Value::Object(mut body) = root else {
        return Err(SchemaError::Generation(format!(
            "schema {name} is not an object"
        )));
    };
    let dialect = body
        .remove("$schema")
        .unwrap_or_else(|| Value::String(DRAFT_2020_12.to_string()));
    let mut defs = match body.remove("$defs") {
        Some(Value::Object(defs)) => defs,
        _ => Map::new(),
    };
    defs.insert(name.to_string(), Value::Object(body));
    Ok(json!({
        "$schema": dialect,
        "$ref": format!("#/$defs/{}", escape_pointer(name)),
        "$defs": defs,
    }))
}

/// Every registered contract in named form, keyed by schema name.
///
/// # Errors
///
/// Propagates any generation error from building the registry.
pub fn generate_all() -> Result<BTreeMap<&'static str, Value>, SchemaError> {
    SchemaRegistry::new()?.export_all()
}

fn normalize(node: &mut Value, pointer: &str) -> Result<(), SchemaError> {
    let Value::Object(schema) = node else {
        // `true` / `false` schemas
        return Ok(());
    };

    if let Some(keyword) = schema
        .keys()
        .find(|k| !SUPPORTED_KEYWORDS.contains(&k.as_str()))
    {
        return Err(SchemaError::Unsupported {
            keyword: keyword.clone(),
            pointer: pointer.to_string(),
        });
    }

    if schema.get("format").and_then(Value::as_str) == Some("uuid")
        && !schema.contains_key("pattern")
    {
        schema.insert("pattern".into(), Value::String(UUID_PATTERN.into()));
    }

    if let Some((min, max)) = schema
        .get("format")
        .and_then(Value::as_str)
        .and_then(integer_bounds)
    {
        tighten(schema, "minimum", min, |current, bound| current >= bound);
        tighten(schema, "maximum", max, |current, bound| current <= bound);
    }

    for (keyword, value) in schema.iter_mut() {
        let here = format!("{pointer}/{}", escape_pointer(keyword));
        match keyword.as_str() {
            "properties" | "$defs" => {
                if let Value::Object(children) = value {
                    for (key, child) in children.iter_mut() {
                        normalize(child, &format!("{here}/{}", escape_pointer(key)))?;
                    }
                }
            }
            "oneOf" | "anyOf" | "allOf" => {
                if let Value::Array(children) = value {
                    for (i, child) in children.iter_mut().enumerate() {
                        normalize(child, &format!("{here}/{i}"))?;
                    }
                }
            }
            "items" | "additionalProperties" => normalize(value, &here)?,
            _ => {}
        }
    }
    Ok(())
}

/// Range implied by a `schemars` integer format.
fn integer_bounds(format: &str) -> Option<(Value, Value)> {
    let bounds = match format {
        "int8" => (json!(i8::MIN), json!(i8::MAX)),
        "int16" => (json!(i16::MIN), json!(i16::MAX)),
        "int32" => (json!(i32::MIN), json!(i32::MAX)),
        "int64" | "int" => (json!(i64::MIN), json!(i64::MAX)),
        "uint8" => (json!(0), json!(u8::MAX)),
        "uint16" => (json!(0), json!(u16::MAX)),
        "uint32" => (json!(0), json!(u32::MAX)),
        "uint64" | "uint" => (json!(0), json!(u64::MAX)),
        _ => return None,
    };
    Some(bounds)
}

/// Set `keyword` to `bound` unless the schema already holds a value `keeps` prefers.
fn tighten(
    schema: &mut Map<String, Value>,
    keyword: &str,
    bound: Value,
    keeps: fn(f64, f64) -> bool,
) {
    if let (Some(current), Some(limit)) =
        (schema.get(keyword).and_then(Value::as_f64), bound.as_f64())
    {
        if keeps(current, limit) {
            return;
        }
    }
    schema.insert(keyword.to_string(), bound);
}
