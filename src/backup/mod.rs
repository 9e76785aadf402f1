pub(crate) mod db_dump;

use anyhow::{Context, Result};
use std::fs;

use crate::config::{self, Settings};
use crate::utils::messages::{message_success, message_welcome};
use crate::utils::setting::check_db_connection;

/// Public entry point for the backup operation.
pub async fn run_backup_flow(settings: &Settings) -> Result<()> {
    message_welcome(&format!(
        "Backing up the '{}' database...",
        settings.database
    ));

    config::ensure_not_superuser(settings, "a backup")?;

    fs::create_dir_all(&settings.backup_dir).with_context(|| {
        format!(
            "Failed to create backup directory: {}",
            settings.backup_dir.display()
        )
    })?;

    // Fail fast on bad credentials before spawning pg_dump.
    check_db_connection(settings.database_url()?.as_str(), &settings.host).await?;

    let backup_filename = db_dump::dump_database(settings)?;

    message_success(&format!(
        "'{}' database backup '{}' has been created and placed in '{}'.",
        settings.database,
        backup_filename,
        settings.backup_dir.display()
    ));
    Ok(())
}
