pub(crate) mod db_restore;

use anyhow::Result;

use crate::config::{self, Settings};
use crate::utils::confirm::confirm;
use crate::utils::messages::{message_info, message_success, message_welcome};
use crate::utils::resolve_backup_file;

/// Public entry point for the restore operation.
///
/// All validation happens before any database mutation. Once the existing
/// database is dropped there is no rollback: a failure while creating or
/// replaying leaves an empty or absent database.
pub async fn run_restore_flow(settings: &Settings, file_name: Option<&str>) -> Result<()> {
    let backup_path =
        resolve_backup_file(&settings.backup_dir, file_name, "restore <filename>")?;
    let backup_filename = file_name.unwrap_or_default().trim();

    config::ensure_not_superuser(settings, "a restore")?;

    message_welcome(&format!(
        "Restoring the '{}' database from the '{}' backup...",
        settings.database, backup_filename
    ));

    if !confirm(&format!(
        "This will DROP the '{}' database and replace its contents with the backup. Continue?",
        settings.database
    ))? {
        anyhow::bail!("Restore cancelled before any changes were made.");
    }

    let mut admin_conn = db_restore::connect_admin(settings).await?;

    message_info(&format!("Dropping the '{}' database...", settings.database));
    db_restore::drop_database(&mut admin_conn, settings).await?;

    message_info(&format!(
        "Creating a new '{}' database...",
        settings.database
    ));
    db_restore::create_database(&mut admin_conn, settings).await?;

    message_info("Applying the backup to the new database...");
    db_restore::apply_dump(settings, &backup_path)?;

    message_success(&format!(
        "The '{}' database has been restored from the '{}' backup.",
        settings.database, backup_filename
    ));
    Ok(())
}
