use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::SystemTime;

use crate::config::Settings;
use crate::utils::messages::message_welcome;

pub struct BackupEntry {
    pub file_name: String,
    pub size: u64,
    pub mode: u32,
    pub modified: SystemTime,
}

/// Public entry point for the list operation. An empty backup directory is
/// not an error; it simply lists nothing.
pub fn run_listing_flow(settings: &Settings) -> Result<()> {
    message_welcome("These are the backups you have got:");

    for entry in collect_backups(&settings.backup_dir)? {
        let modified: DateTime<Local> = entry.modified.into();
        println!(
            "{} {:>10} {} {}",
            format_mode(entry.mode),
            human_size(entry.size),
            modified.format("%Y-%m-%d %H:%M"),
            entry.file_name
        );
    }
    Ok(())
}

/// Enumerates the regular files in the backup directory, most recently
/// modified first.
pub fn collect_backups(backup_dir: &Path) -> Result<Vec<BackupEntry>> {
    let mut entries = Vec::new();

    for dir_entry in fs::read_dir(backup_dir)
        .with_context(|| format!("Failed to read backup directory: {}", backup_dir.display()))?
    {
        let dir_entry = dir_entry
            .with_context(|| format!("Failed to read an entry of {}", backup_dir.display()))?;
        let metadata = dir_entry
            .metadata()
            .with_context(|| format!("Failed to stat {}", dir_entry.path().display()))?;
        if !metadata.is_file() {
            continue;
        }

        entries.push(BackupEntry {
            file_name: dir_entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            mode: metadata.permissions().mode(),
            modified: metadata
                .modified()
                .with_context(|| format!("Failed to read mtime of {}", dir_entry.path().display()))?,
        });
    }

    sort_newest_first(&mut entries);
    Ok(entries)
}

fn sort_newest_first(entries: &mut [BackupEntry]) {
    // Timestamps only resolve to the second; the filename tiebreak works
    // because backup names sort lexicographically by creation time.
    entries.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.file_name.cmp(&a.file_name))
    });
}

/// Renders the permission bits the way `ls -l` does, e.g. `-rw-r--r--`.
fn format_mode(mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push('-');
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn entry(file_name: &str, offset_secs: u64) -> BackupEntry {
        BackupEntry {
            file_name: file_name.to_string(),
            size: 0,
            mode: 0o100644,
            modified: UNIX_EPOCH + Duration::from_secs(offset_secs),
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut entries = vec![
            entry("appdb_2024_01_01T00_00_00.sql.gz", 100),
            entry("appdb_2024_03_01T00_00_00.sql.gz", 300),
            entry("appdb_2024_02_01T00_00_00.sql.gz", 200),
        ];
        sort_newest_first(&mut entries);

        let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(
            names,
            [
                "appdb_2024_03_01T00_00_00.sql.gz",
                "appdb_2024_02_01T00_00_00.sql.gz",
                "appdb_2024_01_01T00_00_00.sql.gz",
            ]
        );
    }

    #[test]
    fn test_sort_breaks_mtime_ties_by_name() {
        let mut entries = vec![
            entry("appdb_2024_01_01T00_00_01.sql.gz", 100),
            entry("appdb_2024_01_01T00_00_02.sql.gz", 100),
        ];
        sort_newest_first(&mut entries);

        assert_eq!(entries[0].file_name, "appdb_2024_01_01T00_00_02.sql.gz");
    }

    #[test]
    fn test_collect_backups_skips_directories() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("appdb_2024_01_01T00_00_00.sql.gz"), b"a")?;
        std::fs::write(dir.path().join("appdb_2024_01_02T00_00_00.sql.gz"), b"bb")?;
        std::fs::create_dir(dir.path().join("not-a-backup"))?;

        let entries = collect_backups(dir.path())?;
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.file_name.ends_with(".sql.gz")));
        Ok(())
    }

    #[test]
    fn test_collect_backups_empty_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(collect_backups(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_collect_backups_missing_directory_is_an_error() {
        assert!(collect_backups(Path::new("/nonexistent/backups")).is_err());
    }

    #[test]
    fn test_format_mode() {
        assert_eq!(format_mode(0o100644), "-rw-r--r--");
        assert_eq!(format_mode(0o100755), "-rwxr-xr-x");
        assert_eq!(format_mode(0o100600), "-rw-------");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KiB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
