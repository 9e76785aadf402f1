pub mod confirm;
pub mod messages;
pub mod setting;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolves a backup filename argument to a path inside the backup
/// directory. The file must be named directly (no path separators) and must
/// already exist; both destructive operations go through this check before
/// touching anything.
pub fn resolve_backup_file(
    backup_dir: &Path,
    file_name: Option<&str>,
    usage: &str,
) -> Result<PathBuf> {
    let file_name = file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .with_context(|| format!("Backup filename is required. Usage: {usage}"))?;

    if file_name.contains(std::path::is_separator) || file_name == ".." {
        anyhow::bail!("Backup filename must not contain path separators: {file_name}");
    }

    let backup_path = backup_dir.join(file_name);
    if !backup_path.is_file() {
        anyhow::bail!(
            "No backup with the specified filename found in {}. Check out the 'backups' command output to see if there is one and try again.",
            backup_dir.display()
        );
    }

    Ok(backup_path)
}
