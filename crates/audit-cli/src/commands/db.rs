use anyhow::Context;
use audit_config::AuditConfig;
use audit_db::AuditService;
use serde_json::{Value, json};

use crate::cli::subcommands::DbCommands;

/// Handle `auditctl db`.
pub async fn handle(action: &DbCommands, config: &AuditConfig) -> anyhow::Result<Value> {
    // Opening the service applies any pending migrations.
    let service = AuditService::from_config(config)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))?;

    match action {
        DbCommands::Init => Ok(json!({
            "database": config.database.path,
            "schemas": service.schema().schema_count(),
            "status": "ready",
        })),
        DbCommands::Seed => {
            let report = service.seed(&config.seed).await.context("seeding failed")?;
            Ok(serde_json::to_value(report)?)
        }
    }
}
