//! Status, data-type, and entity-kind enums.
//!
//! Wire enums (`AssessmentStatus`, `DataType`) serialize in `SCREAMING_SNAKE_CASE`,
//! matching the values stored in the database CHECK constraints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AssessmentStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an assessment.
///
/// ```text
/// PLANNED ⇄ ASSIGNED ⇄ IN_PROGRESS ⇄ IN_QC ⇄ COMPLETE
/// ```
///
/// No transition rules are enforced: every state is reachable from every other.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentStatus {
    #[default]
    Planned,
    Assigned,
    InProgress,
    InQc,
    Complete,
}

impl AssessmentStatus {
    pub const ALL: [Self; 5] = [
        Self::Planned,
        Self::Assigned,
        Self::InProgress,
        Self::InQc,
        Self::Complete,
    ];

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::InQc => "IN_QC",
            Self::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// Declared value type of an attribute or valueset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Number,
    Characters,
}

impl DataType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Characters => "CHARACTERS",
        }
    }

    /// Whether a free-text attribute value is acceptable for this data type.
    ///
    /// `NUMBER` requires a finite decimal; `CHARACTERS` accepts anything.
    #[must_use]
    pub fn accepts(self, value: &str) -> bool {
        match self {
            Self::Number => value
                .trim()
                .parse::<f64>()
                .is_ok_and(f64::is_finite),
            Self::Characters => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Every persisted record kind. Used in error messages and table lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Site,
    Assessment,
    Location,
    Type,
    Attribute,
    TypeAttribute,
    Existing,
    ExistingAttributeValue,
    Valueset,
    ValuesetValue,
    AttributeValueset,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Assessment => "assessment",
            Self::Location => "location",
            Self::Type => "type",
            Self::Attribute => "attribute",
            Self::TypeAttribute => "type_attribute",
            Self::Existing => "existing",
            Self::ExistingAttributeValue => "existing_attribute_value",
            Self::Valueset => "valueset",
            Self::ValuesetValue => "valueset_value",
            Self::AttributeValueset => "attribute_valueset",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
