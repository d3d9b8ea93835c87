use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use audit_schema::{SchemaRegistry, ValidationErrors};
use serde::Serialize;
use serde_json::Value;

use crate::cli::root_commands::ValidateArgs;

/// Outcome of checking one document.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub schema: String,
    pub valid: bool,
    pub errors: ValidationErrors,
}

/// Handle `auditctl validate`.
pub fn handle(args: &ValidateArgs) -> anyhow::Result<ValidationReport> {
    let registry = SchemaRegistry::new().context("failed to build schema registry")?;
    let instance = read_json(&args.file)?;
    let errors = registry.errors(&args.schema, &instance)?;
    Ok(ValidationReport {
        schema: args.schema.clone(),
        valid: errors.is_empty(),
        errors,
    })
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let body = if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("failed to read stdin")?;
        body
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&body).with_context(|| format!("{} is not valid JSON", path.display()))
}
