pub mod db;
pub mod schema;
pub mod validate;

use crate::cli::{Commands, GlobalFlags};
use crate::output::output;

/// Route a parsed command to its handler and print the result.
pub async fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Schema { action } => output(&schema::handle(&action)?, flags.format),
        Commands::Validate(args) => {
            let report = validate::handle(&args)?;
            output(&report, flags.format)?;
            if report.valid {
                Ok(())
            } else {
                anyhow::bail!(
                    "{} does not match '{}' ({} errors)",
                    args.file.display(),
                    args.schema,
                    report.errors.len()
                )
            }
        }
        Commands::Db { action } => {
            let config = crate::bootstrap::load_config(flags)?;
            output(&db::handle(&action, &config).await?, flags.format)
        }
    }
}
