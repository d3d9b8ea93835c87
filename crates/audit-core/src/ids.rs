//! Record identifiers.
//!
//! Every record is keyed by a random (v4) UUID, stored and exchanged in its
//! canonical 36-character hyphenated form. Any version nibble is accepted on
//! input; only the shape is checked.

use uuid::Uuid;

use crate::errors::CoreError;

/// Regex equivalent of [`is_valid_uuid`], embedded in exported JSON Schemas.
pub const UUID_PATTERN: &str =
    "^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

/// Length of the canonical hyphenated form.
pub const UUID_LEN: usize = 36;

/// Check that `s` is a canonical hyphenated UUID (8-4-4-4-12 hex digits).
///
/// Braced, URN, and unhyphenated forms are rejected even though
/// [`Uuid::parse_str`] would accept them.
#[must_use]
pub fn is_valid_uuid(s: &str) -> bool {
    s.len() == UUID_LEN
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

/// Parse a canonical UUID string.
///
/// # Errors
///
/// Returns `CoreError::InvalidId` if `s` is not in canonical form.
pub fn parse_uuid(s: &str) -> Result<Uuid, CoreError> {
    if !is_valid_uuid(s) {
        return Err(CoreError::InvalidId(s.to_string()));
    }
    Uuid::parse_str(s).map_err(|_| CoreError::InvalidId(s.to_string()))
}

/// Generate a fresh record ID.
#[must_use]
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}
