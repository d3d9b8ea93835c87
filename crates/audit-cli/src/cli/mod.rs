use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `auditctl` binary.
#[derive(Debug, Parser)]
#[command(name = "auditctl", version, about = "Audit records - contracts and storage")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path, overriding `database.path` from configuration
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Cli, Commands, OutputFormat};
    use crate::cli::subcommands::{DbCommands, SchemaCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_on_either_side_of_the_subcommand() {
        let before = Cli::try_parse_from(["auditctl", "--db", "/tmp/a.db", "--verbose", "db", "init"])
            .expect("cli should parse");
        assert_eq!(before.db.as_deref(), Some("/tmp/a.db"));
        assert!(before.verbose);
        assert!(matches!(before.command, Commands::Db { action: DbCommands::Init }));

        let after = Cli::try_parse_from(["auditctl", "db", "seed", "--quiet", "--format", "raw"])
            .expect("cli should parse");
        assert!(after.quiet);
        assert_eq!(after.format, OutputFormat::Raw);
        assert!(matches!(after.command, Commands::Db { action: DbCommands::Seed }));
    }

    #[test]
    fn schema_export_takes_optional_name_and_out_dir() {
        let cli = Cli::try_parse_from(["auditctl", "schema", "export", "site", "--out", "schemas"])
            .expect("cli should parse");
        let Commands::Schema { action: SchemaCommands::Export(args) } = cli.command else {
            panic!("expected schema export");
        };
        assert_eq!(args.name.as_deref(), Some("site"));
        assert_eq!(args.out, Some(PathBuf::from("schemas")));

        let all = Cli::try_parse_from(["auditctl", "schema", "export"]).expect("cli should parse");
        assert!(matches!(
            all.command,
            Commands::Schema { action: SchemaCommands::Export(ref args) } if args.name.is_none()
        ));
    }

    #[test]
    fn validate_requires_schema_and_file() {
        assert!(Cli::try_parse_from(["auditctl", "validate", "site"]).is_err());
        let cli = Cli::try_parse_from(["auditctl", "validate", "site_create", "site.json"])
            .expect("cli should parse");
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.schema, "site_create");
        assert_eq!(args.file, PathBuf::from("site.json"));
    }

    #[test]
    fn output_format_rejects_unknown_value() {
        assert!(Cli::try_parse_from(["auditctl", "--format", "table", "schema", "list"]).is_err());
    }
}
