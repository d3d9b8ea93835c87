//! # audit-config
//!
//! Layered configuration loading for audit records using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`AUDIT_*` prefix, `__` as separator)
//! 2. Project-level `.audit/config.toml`
//! 3. User-level `~/.config/audit/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `AUDIT_DATABASE__PATH` -> `database.path`,
//! `AUDIT_SEED__ADMIN_PASSWORD` -> `seed.admin_password`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use audit_config::AuditConfig;
//!
//! let config = AuditConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod database;
mod error;
mod seed;
mod validation;

pub use database::{DatabaseConfig, IN_MEMORY};
pub use error::ConfigError;
pub use seed::SeedConfig;
pub use validation::ValidationConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "AUDIT_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AuditConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`load_with_dotenv`](Self::load_with_dotenv)
    /// for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be read or merged, or
    /// `ConfigError::InvalidValue` if a loaded value is unusable.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and check a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers can layer extra providers (e.g. CLI flags) on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".audit/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.seed.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("audit").join("config.toml"))
    }
}
