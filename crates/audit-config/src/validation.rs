//! Write-time validation switches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Reject attribute values whose text does not match the attribute's
    /// declared data type (`NUMBER` values must parse as a finite number).
    /// Values are free text when this is off.
    #[serde(default)]
    pub enforce_attribute_data_type: bool,
}
