//! Tri-state deserialization for partial updates.
//!
//! Update payloads distinguish three states for a nullable column:
//!
//! | JSON input        | Rust value          | Effect            |
//! |-------------------|---------------------|-------------------|
//! | field absent      | `None`              | column unchanged  |
//! | `"field": null`   | `Some(None)`        | column cleared    |
//! | `"field": value`  | `Some(Some(value))` | column set        |
//!
//! Serde maps both "absent" and `null` to `None` for a plain `Option<Option<T>>`,
//! so nullable update fields use [`nullable`] together with `#[serde(default)]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(_)`.
///
/// Must be paired with `#[serde(default)]` so an absent field stays `None`.
///
/// # Errors
///
/// Propagates the inner deserializer's error.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
