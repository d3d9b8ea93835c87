//! Site repository.

use audit_core::entities::{NewSite, Site, SiteUpdate};
use audit_core::enums::EntityKind;
use audit_core::ids::new_id;
use chrono::Utc;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, get_opt_string, get_uuid, opt_text, parse_datetime, parse_optional_datetime, text,
    timestamp, uuid,
};
use crate::service::AuditService;
use uuid::Uuid;

const COLUMNS: &str = "id, site_name, site_address, site_address_2, site_city, site_state, \
    site_postal_code, site_contact_name, site_contact_phone, site_contact_email, \
    created_at, updated_at, deleted_at";

fn row_to_site(row: &libsql::Row) -> Result<Site, DatabaseError> {
    Ok(Site {
        id: get_uuid(row, 0)?,
        site_name: row.get(1)?,
        site_address: row.get(2)?,
        site_address_2: get_opt_string(row, 3)?,
        site_city: row.get(4)?,
        site_state: row.get(5)?,
        site_postal_code: row.get(6)?,
        site_contact_name: get_opt_string(row, 7)?,
        site_contact_phone: get_opt_string(row, 8)?,
        site_contact_email: get_opt_string(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 12)?.as_deref())?,
    })
}

impl AuditService {
    pub async fn create_site(&self, new: NewSite) -> Result<Site, DatabaseError> {
        self.schema().check(&new)?;
        let id = new_id();
        let now = timestamp(Utc::now());

        self.db()
            .execute(
                "INSERT INTO sites (id, site_name, site_address, site_address_2, site_city,
                    site_state, site_postal_code, site_contact_name, site_contact_phone,
                    site_contact_email, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
                vec![
                    uuid(id),
                    text(new.site_name),
                    text(new.site_address),
                    opt_text(new.site_address_2.as_deref()),
                    text(new.site_city),
                    text(new.site_state),
                    text(new.site_postal_code),
                    opt_text(new.site_contact_name.as_deref()),
                    opt_text(new.site_contact_phone.as_deref()),
                    opt_text(new.site_contact_email.as_deref()),
                    text(now),
                ],
            )
            .await?;

        self.get_site(id).await
    }

    pub async fn get_site(&self, id: Uuid) -> Result<Site, DatabaseError> {
        self.fetch_live(EntityKind::Site, COLUMNS, id, row_to_site).await
    }

    /// All live sites, oldest first.
    pub async fn list_sites(&self) -> Result<Vec<Site>, DatabaseError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} FROM sites WHERE deleted_at IS NULL ORDER BY created_at, rowid"
            ),
            vec![],
            row_to_site,
        )
        .await
    }

    pub async fn update_site(&self, id: Uuid, update: SiteUpdate) -> Result<Site, DatabaseError> {
        self.schema().check(&update)?;

        let mut set = SetClause::new();
        if let Some(site_name) = update.site_name {
            set.set("site_name", text(site_name));
        }
        if let Some(site_address) = update.site_address {
            set.set("site_address", text(site_address));
        }
        if let Some(site_address_2) = update.site_address_2 {
            set.set("site_address_2", opt_text(site_address_2.as_deref()));
        }
        if let Some(site_city) = update.site_city {
            set.set("site_city", text(site_city));
        }
        if let Some(site_state) = update.site_state {
            set.set("site_state", text(site_state));
        }
        if let Some(site_postal_code) = update.site_postal_code {
            set.set("site_postal_code", text(site_postal_code));
        }
        if let Some(name) = update.site_contact_name {
            set.set("site_contact_name", opt_text(name.as_deref()));
        }
        if let Some(phone) = update.site_contact_phone {
            set.set("site_contact_phone", opt_text(phone.as_deref()));
        }
        if let Some(email) = update.site_contact_email {
            set.set("site_contact_email", opt_text(email.as_deref()));
        }

        if !set.is_empty() {
            self.apply_update(EntityKind::Site, id, set).await?;
        }
        self.get_site(id).await
    }

    /// Soft-delete a site. Refused while it has live assessments.
    pub async fn delete_site(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.soft_delete(EntityKind::Site, id).await
    }

    pub async fn restore_site(&self, id: Uuid) -> Result<Site, DatabaseError> {
        self.restore(EntityKind::Site, id).await?;
        self.get_site(id).await
    }

    pub async fn force_delete_site(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.force_delete(EntityKind::Site, id).await
    }
}
