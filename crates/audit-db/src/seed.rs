//! Bootstrap seed: permissions, roles, and the admin account.
//!
//! Every step is create-if-missing, so running the seed again is a no-op.
//! The admin password only ever comes from configuration.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use audit_config::SeedConfig;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{get_uuid, opt_text, text, timestamp, uuid};
use crate::service::AuditService;

/// Permission names and descriptions.
pub const PERMISSIONS: [(&str, &str); 6] = [
    ("view-audits", "View audits"),
    ("create-audits", "Create new audits"),
    ("edit-audits", "Edit existing audits"),
    ("delete-audits", "Delete audits"),
    ("manage-templates", "Manage audit templates"),
    ("manage-users", "Manage users and permissions"),
];

/// Role name, description, and granted permissions.
pub const ROLES: [(&str, &str, &[&str]); 3] = [
    (
        "admin",
        "Administrator with full access",
        &[
            "view-audits",
            "create-audits",
            "edit-audits",
            "delete-audits",
            "manage-templates",
            "manage-users",
        ],
    ),
    (
        "auditor",
        "Auditor who can create and edit audits",
        &["view-audits", "create-audits", "edit-audits"],
    ),
    ("viewer", "Viewer who can only view audits", &["view-audits"]),
];

const ADMIN_ROLE: &str = "admin";

/// What a seed run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub permissions_created: u64,
    pub roles_created: u64,
    pub grants_created: u64,
    pub admin_id: Uuid,
    pub admin_created: bool,
    pub admin_has_password: bool,
}

impl SeedReport {
    /// Whether the run wrote anything.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.permissions_created > 0
            || self.roles_created > 0
            || self.grants_created > 0
            || self.admin_created
    }
}

/// Argon2id hash of `password` as a PHC string with a fresh random salt.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if the hasher rejects its input.
pub fn hash_password(password: &str) -> Result<String, DatabaseError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Check `candidate` against a PHC string produced by [`hash_password`].
///
/// Anything that does not parse as a PHC string never verifies.
#[must_use]
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    })
}

impl AuditService {
    /// Seed permissions, roles, and the admin user described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is kept in
    /// that case.
    pub async fn seed(&self, config: &SeedConfig) -> Result<SeedReport, DatabaseError> {
        let report = self.db().savepoint(self.seed_inner(config)).await?;

        if report.changed() {
            info!(
                permissions = report.permissions_created,
                roles = report.roles_created,
                grants = report.grants_created,
                admin_created = report.admin_created,
                "seed applied"
            );
        } else {
            info!("seed already applied");
        }
        Ok(report)
    }

    async fn seed_inner(&self, config: &SeedConfig) -> Result<SeedReport, DatabaseError> {
        let now = timestamp(Utc::now());
        let mut report = SeedReport::default();

        for (name, description) in PERMISSIONS {
            report.permissions_created += self
                .db()
                .execute(
                    "INSERT INTO permissions (name, description, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3) ON CONFLICT (name) DO NOTHING",
                    vec![text(name), text(description), text(now.as_str())],
                )
                .await?;
        }

        for (role, description, permissions) in ROLES {
            report.roles_created += self
                .db()
                .execute(
                    "INSERT INTO roles (name, description, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3) ON CONFLICT (name) DO NOTHING",
                    vec![text(role), text(description), text(now.as_str())],
                )
                .await?;
            for permission in permissions {
                report.grants_created += self
                    .db()
                    .execute(
                        "INSERT INTO permission_role (permission_id, role_id, created_at, updated_at)
                         SELECT p.id, r.id, ?3, ?3 FROM permissions p, roles r
                         WHERE p.name = ?1 AND r.name = ?2
                         ON CONFLICT (permission_id, role_id) DO NOTHING",
                        vec![text(*permission), text(role), text(now.as_str())],
                    )
                    .await?;
            }
        }

        let email = config.admin_email.trim();
        let existing = self
            .fetch_optional(
                "SELECT id, password_hash IS NOT NULL FROM users WHERE email = ?1",
                vec![text(email)],
                |row| Ok((get_uuid(row, 0)?, row.get::<i64>(1)? != 0)),
            )
            .await?;

        match existing {
            Some((id, has_password)) => {
                report.admin_id = id;
                report.admin_has_password = has_password;
            }
            None => {
                let hash = config.admin_password().map(hash_password).transpose()?;
                if hash.is_none() {
                    warn!(email, "no admin password configured; admin account has no password");
                }
                let id = Uuid::new_v4();
                self.db()
                    .execute(
                        "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                        vec![
                            uuid(id),
                            text(config.admin_name.trim()),
                            text(email),
                            opt_text(hash.as_deref()),
                            text(now.as_str()),
                        ],
                    )
                    .await?;
                report.admin_id = id;
                report.admin_created = true;
                report.admin_has_password = hash.is_some();
            }
        }

        report.grants_created += self
            .db()
            .execute(
                "INSERT INTO role_user (role_id, user_id, created_at, updated_at)
                 SELECT id, ?2, ?3, ?3 FROM roles WHERE name = ?1
                 ON CONFLICT (role_id, user_id) DO NOTHING",
                vec![text(ADMIN_ROLE), uuid(report.admin_id), text(now.as_str())],
            )
            .await?;

        Ok(report)
    }
}
