use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::Settings;
use crate::utils::confirm::confirm;
use crate::utils::messages::{message_success, message_welcome};
use crate::utils::resolve_backup_file;

/// Public entry point for the remove operation. Runs behind the same
/// confirmation gate as restore.
pub fn run_removal_flow(settings: &Settings, file_name: Option<&str>) -> Result<()> {
    let backup_path =
        resolve_backup_file(&settings.backup_dir, file_name, "remove-backup <filename>")?;
    let backup_filename = file_name.unwrap_or_default().trim();

    message_welcome(&format!(
        "Removing the '{backup_filename}' backup file..."
    ));

    if !confirm(&format!("Delete '{backup_filename}' permanently?"))? {
        anyhow::bail!("Removal cancelled; the backup file was left untouched.");
    }

    delete_backup_file(&backup_path)?;

    message_success(&format!(
        "The '{backup_filename}' backup file has been removed."
    ));
    Ok(())
}

/// Deletes exactly the named file; backups live flat in the backup
/// directory.
fn delete_backup_file(backup_path: &Path) -> Result<()> {
    fs::remove_file(backup_path)
        .with_context(|| format!("Failed to remove backup file: {}", backup_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_removes_only_the_named_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let doomed = dir.path().join("appdb_2024_01_01T00_00_00.sql.gz");
        let sibling = dir.path().join("appdb_2024_01_02T00_00_00.sql.gz");
        fs::write(&doomed, b"old")?;
        fs::write(&sibling, b"keep")?;

        delete_backup_file(&doomed)?;

        assert!(!doomed.exists());
        assert!(sibling.exists());
        Ok(())
    }

    #[test]
    fn test_delete_missing_file_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("appdb_2024_01_01T00_00_00.sql.gz");

        assert!(delete_backup_file(&missing).is_err());
        Ok(())
    }
}
