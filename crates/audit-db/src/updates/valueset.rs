//! Valueset, valueset value, and attribute-valueset update builders.

use audit_core::entities::{AttributeValuesetUpdate, ValuesetUpdate, ValuesetValueUpdate};
use audit_core::enums::DataType;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ValuesetUpdateBuilder(ValuesetUpdate);

impl ValuesetUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn label_abbreviation(mut self, label_abbreviation: Option<String>) -> Self {
        self.0.label_abbreviation = Some(label_abbreviation);
        self
    }

    #[must_use]
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.0.data_type = Some(data_type);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn build(self) -> ValuesetUpdate {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct ValuesetValueUpdateBuilder(ValuesetValueUpdate);

impl ValuesetValueUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn valueset_id(mut self, valueset_id: Uuid) -> Self {
        self.0.valueset_id = Some(valueset_id);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.0.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn display_label(mut self, display_label: Option<String>) -> Self {
        self.0.display_label = Some(display_label);
        self
    }

    #[must_use]
    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.0.sort_order = Some(sort_order);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.0.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn build(self) -> ValuesetValueUpdate {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct AttributeValuesetUpdateBuilder(AttributeValuesetUpdate);

impl AttributeValuesetUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attribute_id(mut self, attribute_id: Uuid) -> Self {
        self.0.attribute_id = Some(attribute_id);
        self
    }

    #[must_use]
    pub fn valueset_id(mut self, valueset_id: Uuid) -> Self {
        self.0.valueset_id = Some(valueset_id);
        self
    }

    #[must_use]
    pub fn build(self) -> AttributeValuesetUpdate {
        self.0
    }
}
