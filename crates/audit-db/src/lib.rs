//! # audit-db
//!
//! libSQL persistence for audit records.
//!
//! Handles all relational state: sites, assessments, the per-assessment
//! location tree, the item-type catalogue with its attributes, inventoried
//! existing items and their attribute values, and valuesets. Records use UUID
//! keys and soft deletes; cascade / restrict rules are enforced by the storage
//! foreign keys for hard deletes and by [`cascade`] for soft deletes.
//!
//! Uses the `libsql` crate (C `SQLite` fork) with a local or in-memory file.

mod cascade;
pub mod derived;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod seed;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

pub use derived::{DefaultDerivedFields, DerivedFields, LabelInput};
pub use error::{DatabaseError, IntegrityViolation};
pub use repos::location::LocationNode;
pub use seed::SeedReport;
pub use service::{AuditService, ServiceOptions};

use std::future::Future;

use libsql::{Builder, Rows, Value, params_from_iter};
use tokio::sync::Mutex;
use tracing::debug;

/// Savepoint name used for multi-statement writes. Savepoints nest, so an
/// operation that already runs inside one may open another.
const SAVEPOINT: &str = "audit_write";

tokio::task_local! {
    /// Set while the polled future owns the write lock.
    static WRITE_HELD: ();
}

fn holds_write_lock() -> bool {
    WRITE_HELD.try_with(|_| ()).is_ok()
}

/// Central database handle for audit state.
///
/// Wraps a libSQL database and its single connection. Every write on that
/// connection goes through one async lock: a savepoint holds it until it is
/// released or rolled back, so statements from concurrent callers never land
/// inside another caller's savepoint. Reads do not take the lock and may see
/// rows of a savepoint that is still open.
pub struct AuditDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    write_lock: Mutex<()>,
}

impl AuditDb {
    /// Open a local database at the given path (`:memory:` for tests).
    ///
    /// Runs migrations automatically on every open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let audit_db = Self {
            db,
            conn,
            write_lock: Mutex::new(()),
        };
        audit_db.run_migrations().await?;
        Ok(audit_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    ///
    /// Statements run here bypass the write lock.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Execute a statement, returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// Constraint failures become `DatabaseError::Integrity`; anything else
    /// is `DatabaseError::LibSql`.
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64, DatabaseError> {
        debug!(sql, params = params.len(), "execute");
        if holds_write_lock() {
            return Ok(self.conn.execute(sql, params_from_iter(params)).await?);
        }
        let _guard = self.write_lock.lock().await;
        Ok(self.conn.execute(sql, params_from_iter(params)).await?)
    }

    /// Run a query and return its rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the query fails.
    pub async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Rows, DatabaseError> {
        debug!(sql, params = params.len(), "query");
        Ok(self.conn.query(sql, params_from_iter(params)).await?)
    }

    /// Whether `sql` returns at least one row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the query fails.
    pub async fn exists(&self, sql: &str, params: Vec<Value>) -> Result<bool, DatabaseError> {
        let mut rows = self.query(sql, params).await?;
        Ok(rows.next().await?.is_some())
    }

    /// Run `op` inside a savepoint: release it when `op` succeeds, roll it
    /// back when it fails, and pass the result through.
    ///
    /// The outermost savepoint holds the write lock until it is released, so
    /// concurrent callers wait instead of interleaving. A savepoint opened
    /// from inside `op` nests without waiting.
    ///
    /// # Errors
    ///
    /// Returns the error from `op`, or the libSQL error if the savepoint
    /// cannot be opened or released.
    pub async fn savepoint<T, F>(&self, op: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, DatabaseError>>,
    {
        if holds_write_lock() {
            return self.run_savepoint(op).await;
        }
        let _guard = self.write_lock.lock().await;
        WRITE_HELD.scope((), self.run_savepoint(op)).await
    }

    async fn run_savepoint<T, F>(&self, op: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, DatabaseError>>,
    {
        self.conn
            .execute(&format!("SAVEPOINT {SAVEPOINT}"), ())
            .await?;
        match op.await {
            Ok(value) => {
                self.conn
                    .execute(&format!("RELEASE {SAVEPOINT}"), ())
                    .await?;
                Ok(value)
            }
            Err(error) => {
                let rollback = format!("ROLLBACK TO {SAVEPOINT}; RELEASE {SAVEPOINT};");
                if let Err(e) = self.conn.execute_batch(&rollback).await {
                    tracing::warn!(error = %e, "rollback failed");
                }
                Err(error)
            }
        }
    }
}
