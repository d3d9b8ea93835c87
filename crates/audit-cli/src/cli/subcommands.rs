use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Clone, Debug, Subcommand)]
pub enum SchemaCommands {
    /// List every registered contract name.
    List,
    /// Print one contract, or all of them, in named JSON-Schema form.
    Export(SchemaExportArgs),
}

#[derive(Clone, Debug, Args)]
pub struct SchemaExportArgs {
    /// Contract to export; all contracts when omitted.
    pub name: Option<String>,
    /// Write `<name>.schema.json` files into this directory instead of
    /// printing.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum DbCommands {
    /// Create the database file and apply migrations.
    Init,
    /// Insert the default roles, permissions, and admin account.
    Seed,
}
