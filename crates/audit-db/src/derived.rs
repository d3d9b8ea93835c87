//! Server-computed fields of existing items.
//!
//! `Existing.label` and `Existing.attribute_values_hash` are never accepted
//! from callers. They are recomputed by a [`DerivedFields`] implementation
//! whenever an item, its type, or its attribute values change.

use audit_core::entities::{ExistingAttributeValue, ItemType, TypeAttribute};

/// Everything a label can be derived from.
#[derive(Debug, Clone, Copy)]
pub struct LabelInput<'a> {
    /// The item's own name, if it has one.
    pub name: Option<&'a str>,
    pub item_type: &'a ItemType,
    /// The type's live attribute links, in `label_concat_order`.
    pub type_attributes: &'a [TypeAttribute],
    /// The item's live attribute values.
    pub values: &'a [ExistingAttributeValue],
}

/// Computes the derived columns of an existing item.
pub trait DerivedFields: Send + Sync {
    /// Display label, at most 255 characters.
    fn label(&self, input: &LabelInput<'_>) -> String;

    /// Fingerprint of the item's attribute values, or `None` to leave the
    /// column empty.
    fn attribute_values_hash(&self, input: &LabelInput<'_>) -> Option<String>;
}

/// Labels an item by its name, falling back to its type's name. Computes no
/// hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDerivedFields;

impl DerivedFields for DefaultDerivedFields {
    fn label(&self, input: &LabelInput<'_>) -> String {
        input
            .name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&input.item_type.name)
            .to_string()
    }

    fn attribute_values_hash(&self, _input: &LabelInput<'_>) -> Option<String> {
        None
    }
}
