use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::{DbCommands, SchemaCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Inspect and export the JSON-Schema contracts.
    Schema {
        #[command(subcommand)]
        action: SchemaCommands,
    },
    /// Validate a JSON document against a named contract.
    Validate(ValidateArgs),
    /// Database setup.
    Db {
        #[command(subcommand)]
        action: DbCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Contract name, e.g. `site_create`.
    pub schema: String,
    /// JSON file to check; `-` reads stdin.
    pub file: PathBuf,
}
