//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use tracing::info;

use crate::AuditDb;
use crate::error::DatabaseError;

/// Domain schema: users plus the eleven record tables and their indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");
/// Roles, permissions, and their pivots.
const MIGRATION_002: &str = include_str!("../migrations/002_access.sql");

impl AuditDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        self.conn
            .execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_access: {e}")))?;
        info!("migrations applied");
        Ok(())
    }
}
