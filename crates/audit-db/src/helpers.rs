//! Row-to-entity parsing helpers and SQL parameter builders.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual
//! datetime format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use audit_core::enums::EntityKind;
use audit_core::ids::parse_uuid;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::Value;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a `YYYY-MM-DD` TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string is not a calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with every audit-core enum; the stored text is the wire value.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a required UUID TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column is not a canonical UUID.
pub fn get_uuid(row: &libsql::Row, idx: i32) -> Result<Uuid, DatabaseError> {
    let s = row.get::<String>(idx)?;
    parse_uuid(&s).map_err(|e| DatabaseError::Query(e.to_string()))
}

/// Read a nullable UUID TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a present value is not a canonical UUID.
pub fn get_opt_uuid(row: &libsql::Row, idx: i32) -> Result<Option<Uuid>, DatabaseError> {
    get_opt_string(row, idx)?
        .map(|s| parse_uuid(&s).map_err(|e| DatabaseError::Query(e.to_string())))
        .transpose()
}

/// Read a nullable TEXT column. SQL NULL is `None`; an empty string stays `Some("")`.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    Ok(row.get::<Option<String>>(idx)?)
}

/// Read an INTEGER column that the schema bounds to `i32`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored value is out of range.
pub fn get_i32(row: &libsql::Row, idx: i32) -> Result<i32, DatabaseError> {
    let n = row.get::<i64>(idx)?;
    i32::try_from(n).map_err(|e| DatabaseError::Query(format!("Integer {n} out of range: {e}")))
}

/// Read a nullable INTEGER column bounded to `i32`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a present value is out of range.
pub fn get_opt_i32(row: &libsql::Row, idx: i32) -> Result<Option<i32>, DatabaseError> {
    row.get::<Option<i64>>(idx)?
        .map(|n| {
            i32::try_from(n)
                .map_err(|e| DatabaseError::Query(format!("Integer {n} out of range: {e}")))
        })
        .transpose()
}

/// Read a 0/1 INTEGER column as `bool`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

// ---------------------------------------------------------------------------
// Parameter values
// ---------------------------------------------------------------------------

/// Canonical storage form of a timestamp.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

#[must_use]
pub fn text(s: impl Into<String>) -> Value {
    Value::Text(s.into())
}

#[must_use]
pub fn opt_text(s: Option<&str>) -> Value {
    s.map_or(Value::Null, |s| Value::Text(s.to_string()))
}

#[must_use]
pub fn uuid(id: Uuid) -> Value {
    Value::Text(id.to_string())
}

#[must_use]
pub fn opt_uuid(id: Option<Uuid>) -> Value {
    id.map_or(Value::Null, uuid)
}

#[must_use]
pub fn integer(n: impl Into<i64>) -> Value {
    Value::Integer(n.into())
}

#[must_use]
pub fn opt_integer(n: Option<i32>) -> Value {
    n.map_or(Value::Null, |n| Value::Integer(n.into()))
}

#[must_use]
pub fn boolean(b: bool) -> Value {
    Value::Integer(i64::from(b))
}

/// Accumulates the `SET` list of a dynamic UPDATE.
///
/// Placeholders are numbered in push order; [`finish`](Self::finish) appends
/// `updated_at` and the id filter.
#[derive(Debug, Default)]
pub struct SetClause {
    sets: Vec<String>,
    params: Vec<Value>,
}

impl SetClause {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.params.push(value);
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The raw assignments and their parameters, for statements that need a
    /// different filter than [`finish`](Self::finish) builds.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Value>) {
        (self.sets, self.params)
    }

    /// Build `UPDATE <table> SET … WHERE id = ? AND deleted_at IS NULL`.
    #[must_use]
    pub fn finish(mut self, table: &str, id: Uuid, now: DateTime<Utc>) -> (String, Vec<Value>) {
        self.set("updated_at", text(timestamp(now)));
        self.params.push(uuid(id));
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{} AND deleted_at IS NULL",
            self.sets.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}

/// Map an entity kind to its SQL table.
///
/// Exhaustive match: adding an `EntityKind` variant forces updating this.
#[must_use]
pub const fn entity_table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Site => "sites",
        EntityKind::Assessment => "assessments",
        EntityKind::Location => "locations",
        EntityKind::Type => "types",
        EntityKind::Attribute => "attributes",
        EntityKind::TypeAttribute => "type_attributes",
        EntityKind::Existing => "existing",
        EntityKind::ExistingAttributeValue => "existing_attribute_values",
        EntityKind::Valueset => "valuesets",
        EntityKind::ValuesetValue => "valueset_values",
        EntityKind::AttributeValueset => "attribute_valuesets",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_both_datetime_formats() {
        let rfc = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let sqlite = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(rfc, sqlite);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn timestamp_roundtrips_exactly() {
        let now = Utc::now();
        assert_eq!(parse_datetime(&timestamp(now)).unwrap(), now);
    }

    #[test]
    fn optional_datetime_treats_empty_as_none() {
        assert_eq!(parse_optional_datetime(None).unwrap(), None);
        assert_eq!(parse_optional_datetime(Some("")).unwrap(), None);
        assert!(parse_optional_datetime(Some("2026-01-01T00:00:00Z")).unwrap().is_some());
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_date("2026-03-14").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
        );
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn parses_wire_enums() {
        use audit_core::enums::{AssessmentStatus, DataType};
        assert_eq!(
            parse_enum::<AssessmentStatus>("IN_PROGRESS").unwrap(),
            AssessmentStatus::InProgress
        );
        assert_eq!(parse_enum::<DataType>("NUMBER").unwrap(), DataType::Number);
        assert!(parse_enum::<DataType>("number").is_err());
    }

    #[test]
    fn set_clause_numbers_placeholders_in_order() {
        let id = Uuid::nil();
        let now = Utc::now();
        let mut set = SetClause::new();
        assert!(set.is_empty());
        set.set("name", text("Door"));
        set.set("notes", Value::Null);
        let (sql, params) = set.finish("existing", id, now);
        assert_eq!(
            sql,
            "UPDATE existing SET name = ?1, notes = ?2, updated_at = ?3 WHERE id = ?4 AND deleted_at IS NULL"
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn every_kind_has_a_table() {
        assert_eq!(entity_table(EntityKind::Type), "types");
        assert_eq!(entity_table(EntityKind::Existing), "existing");
        assert_eq!(
            entity_table(EntityKind::ExistingAttributeValue),
            "existing_attribute_values"
        );
    }
}
