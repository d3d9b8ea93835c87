//! Bootstrap seed settings for the admin account.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_admin_email() -> String {
    "admin@audit-demo.local".to_string()
}

fn default_admin_name() -> String {
    "Admin User".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedConfig {
    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    #[serde(default = "default_admin_name")]
    pub admin_name: String,

    /// Initial admin password. Never defaulted; when empty the admin user is
    /// created without a password.
    #[serde(default)]
    pub admin_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            admin_name: default_admin_name(),
            admin_password: String::new(),
        }
    }
}

impl SeedConfig {
    /// The configured admin password, if any.
    #[must_use]
    pub fn admin_password(&self) -> Option<&str> {
        Some(self.admin_password.as_str()).filter(|p| !p.is_empty())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let email = self.admin_email.trim();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(ConfigError::InvalidValue {
                field: "seed.admin_email".into(),
                reason: format!("{email:?} is not an email address"),
            });
        }
        if self.admin_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "seed.admin_name".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
