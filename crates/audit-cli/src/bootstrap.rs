use anyhow::Context;
use audit_config::AuditConfig;
use figment::providers::Serialized;

use crate::cli::GlobalFlags;

/// Load layered configuration, with `--db` taking precedence over every
/// other source for the database path.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<AuditConfig> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let mut figment = AuditConfig::figment();
    if let Some(path) = &flags.db {
        figment = figment.merge(Serialized::default("database.path", path));
    }
    AuditConfig::from_figment(&figment).context("failed to load audit configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn db_flag_overrides_the_environment() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("AUDIT_DATABASE__PATH", "from-env.db");

            let from_env = load_config(&GlobalFlags::default()).expect("config should load");
            assert_eq!(from_env.database.path, "from-env.db");

            let flags = GlobalFlags {
                db: Some("from-flag.db".into()),
                ..GlobalFlags::default()
            };
            let from_flag = load_config(&flags).expect("config should load");
            assert_eq!(from_flag.database.path, "from-flag.db");
            Ok(())
        });
    }
}
