//! Site, assessment, and location update builders.

use audit_core::entities::{AssessmentUpdate, LocationUpdate, SiteUpdate};
use audit_core::enums::AssessmentStatus;
use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SiteUpdateBuilder(SiteUpdate);

impl SiteUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn site_name(mut self, site_name: impl Into<String>) -> Self {
        self.0.site_name = Some(site_name.into());
        self
    }

    #[must_use]
    pub fn site_address(mut self, site_address: impl Into<String>) -> Self {
        self.0.site_address = Some(site_address.into());
        self
    }

    #[must_use]
    pub fn site_address_2(mut self, site_address_2: Option<String>) -> Self {
        self.0.site_address_2 = Some(site_address_2);
        self
    }

    #[must_use]
    pub fn site_city(mut self, site_city: impl Into<String>) -> Self {
        self.0.site_city = Some(site_city.into());
        self
    }

    #[must_use]
    pub fn site_state(mut self, site_state: impl Into<String>) -> Self {
        self.0.site_state = Some(site_state.into());
        self
    }

    #[must_use]
    pub fn site_postal_code(mut self, site_postal_code: impl Into<String>) -> Self {
        self.0.site_postal_code = Some(site_postal_code.into());
        self
    }

    #[must_use]
    pub fn site_contact_name(mut self, name: Option<String>) -> Self {
        self.0.site_contact_name = Some(name);
        self
    }

    #[must_use]
    pub fn site_contact_phone(mut self, phone: Option<String>) -> Self {
        self.0.site_contact_phone = Some(phone);
        self
    }

    #[must_use]
    pub fn site_contact_email(mut self, email: Option<String>) -> Self {
        self.0.site_contact_email = Some(email);
        self
    }

    #[must_use]
    pub fn build(self) -> SiteUpdate {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct AssessmentUpdateBuilder(AssessmentUpdate);

impl AssessmentUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn site_id(mut self, site_id: Uuid) -> Self {
        self.0.site_id = Some(site_id);
        self
    }

    #[must_use]
    pub fn root_location_id(mut self, root_location_id: Option<Uuid>) -> Self {
        self.0.root_location_id = Some(root_location_id);
        self
    }

    #[must_use]
    pub fn scheduled_date(mut self, scheduled_date: NaiveDate) -> Self {
        self.0.scheduled_date = Some(scheduled_date);
        self
    }

    /// `Some(user)` assigns, `None` unassigns.
    #[must_use]
    pub fn assigned_to_id(mut self, assigned_to_id: Option<Uuid>) -> Self {
        self.0.assigned_to_id = Some(assigned_to_id);
        self
    }

    #[must_use]
    pub fn status(mut self, status: AssessmentStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> AssessmentUpdate {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct LocationUpdateBuilder(LocationUpdate);

impl LocationUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn assessment_id(mut self, assessment_id: Uuid) -> Self {
        self.0.assessment_id = Some(assessment_id);
        self
    }

    /// `None` makes the location a tree root.
    #[must_use]
    pub fn parent_location_id(mut self, parent_location_id: Option<Uuid>) -> Self {
        self.0.parent_location_id = Some(parent_location_id);
        self
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
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.0.sort_order = Some(sort_order);
        self
    }

    #[must_use]
    pub fn build(self) -> LocationUpdate {
        self.0
    }
}
