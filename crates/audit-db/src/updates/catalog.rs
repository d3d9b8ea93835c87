//! Type, attribute, and type-attribute update builders.

use audit_core::entities::{AttributeUpdate, ItemTypeUpdate, TypeAttributeUpdate};
use audit_core::enums::DataType;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ItemTypeUpdateBuilder(ItemTypeUpdate);

impl ItemTypeUpdateBuilder {
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
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.0.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn build(self) -> ItemTypeUpdate {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct AttributeUpdateBuilder(AttributeUpdate);

impl AttributeUpdateBuilder {
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
    pub fn unit_of_measure(mut self, unit_of_measure: Option<String>) -> Self {
        self.0.unit_of_measure = Some(unit_of_measure);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn build(self) -> AttributeUpdate {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct TypeAttributeUpdateBuilder(TypeAttributeUpdate);

impl TypeAttributeUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn type_id(mut self, type_id: Uuid) -> Self {
        self.0.type_id = Some(type_id);
        self
    }

    #[must_use]
    pub fn attribute_id(mut self, attribute_id: Uuid) -> Self {
        self.0.attribute_id = Some(attribute_id);
        self
    }

    #[must_use]
    pub fn label_concat_order(mut self, label_concat_order: Option<i32>) -> Self {
        self.0.label_concat_order = Some(label_concat_order);
        self
    }

    #[must_use]
    pub fn is_required(mut self, is_required: bool) -> Self {
        self.0.is_required = Some(is_required);
        self
    }

    #[must_use]
    pub fn build(self) -> TypeAttributeUpdate {
        self.0
    }
}
