use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use audit_schema::SchemaRegistry;
use serde_json::{Value, json};
use tracing::info;

use crate::cli::subcommands::{SchemaCommands, SchemaExportArgs};

/// Handle `auditctl schema`.
pub fn handle(action: &SchemaCommands) -> anyhow::Result<Value> {
    let registry = SchemaRegistry::new().context("failed to build schema registry")?;
    match action {
        SchemaCommands::List => Ok(json!(registry.list())),
        SchemaCommands::Export(args) => export(&registry, args),
    }
}

fn export(registry: &SchemaRegistry, args: &SchemaExportArgs) -> anyhow::Result<Value> {
    let schemas = match &args.name {
        Some(name) => vec![(name.clone(), registry.export(name)?)],
        None => registry
            .export_all()?
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    let Some(dir) = &args.out else {
        if args.name.is_some() {
            return Ok(schemas.into_iter().next().map(|(_, schema)| schema).unwrap_or_default());
        }
        return Ok(Value::Object(schemas.into_iter().collect()));
    };

    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let mut written = Vec::with_capacity(schemas.len());
    for (name, schema) in &schemas {
        written.push(write_schema(dir, name, schema)?);
    }
    info!(count = written.len(), dir = %dir.display(), "schemas exported");
    Ok(json!({ "written": written }))
}

fn write_schema(dir: &Path, name: &str, schema: &Value) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{name}.schema.json"));
    let body = serde_json::to_string_pretty(schema)?;
    fs::write(&path, body + "\n").with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
