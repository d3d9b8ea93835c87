//! Existing item and attribute value update builders.

use audit_core::entities::{ExistingAttributeValueUpdate, ExistingUpdate};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ExistingUpdateBuilder(ExistingUpdate);

impl ExistingUpdateBuilder {
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
    pub fn location_id(mut self, location_id: Uuid) -> Self {
        self.0.location_id = Some(location_id);
        self
    }

    /// `None` clears the name; the label falls back to the type name.
    #[must_use]
    pub fn name(mut self, name: Option<String>) -> Self {
        self.0.name = Some(name);
        self
    }

    #[must_use]
    pub fn label_abbr(mut self, label_abbr: Option<String>) -> Self {
        self.0.label_abbr = Some(label_abbr);
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: i32) -> Self {
        self.0.quantity = Some(quantity);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.0.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn build(self) -> ExistingUpdate {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct ExistingAttributeValueUpdateBuilder(ExistingAttributeValueUpdate);

impl ExistingAttributeValueUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn existing_id(mut self, existing_id: Uuid) -> Self {
        self.0.existing_id = Some(existing_id);
        self
    }

    #[must_use]
    pub fn attribute_id(mut self, attribute_id: Uuid) -> Self {
        self.0.attribute_id = Some(attribute_id);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.0.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn build(self) -> ExistingAttributeValueUpdate {
        self.0
    }
}
