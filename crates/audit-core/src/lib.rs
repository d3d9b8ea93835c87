//! # audit-core
//!
//! Core types, ID helpers, and error types for audit records.
//!
//! This crate provides the foundational types shared across all audit crates:
//! - Entity structs for every persisted record (the "full" contract)
//! - Create and update payloads for each entity (the "create"/"update" contracts)
//! - Status and data-type enums
//! - UUID format checks and ID generation
//! - Tri-state patch deserialization for partial updates
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod patch;
