//! # audit-schema
//!
//! JSON Schema generation, validation, and registry for audit records.
//!
//! This crate provides:
//! - `SchemaRegistry`: every full / create / update contract with a compiled,
//!   format-checking validator
//! - Per-field validation errors (`FieldError`, `ValidationErrors`)
//! - The JSON-Schema converter used for export (`auditctl schema export`)
//!
//! ## Architecture
//!
//! Entity types are defined in `audit-core` with `#[derive(JsonSchema)]`.
//! This crate turns them into normalized JSON Schemas and validates raw JSON
//! against them before it is deserialized into the typed payloads.
//! `audit-db` validates every write through the registry.

pub mod convert;
pub mod error;
pub mod registry;
pub mod validate;

pub use convert::{generate_all, to_json_schema};
pub use error::SchemaError;
pub use registry::SchemaRegistry;
pub use validate::{FieldError, ValidationErrors};
