//! Builders for update payloads.
//!
//! The payload structs live in `audit-core` next to their contracts. These
//! builders assemble them field by field: a plain setter changes a column, a
//! setter taking `Option` on a nullable column clears it with `None`. Fields
//! never touched are left out of the dynamic `UPDATE`.

pub mod assessment;
pub mod catalog;
pub mod existing;
pub mod valueset;
