use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;
use which::which;

use crate::config::Settings;

/// Zero-padded and fixed-width, so filename order equals creation order.
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%dT%H_%M_%S";

fn find_pg_dump_executable() -> Result<PathBuf> {
    which("pg_dump").context(
        "pg_dump executable not found in PATH. Please ensure PostgreSQL client tools are installed and in your PATH.",
    )
}

pub fn backup_file_name(prefix: &str, taken_at: NaiveDateTime) -> String {
    format!("{}_{}.sql.gz", prefix, taken_at.format(TIMESTAMP_FORMAT))
}

/// Streams a full logical dump of the configured database through a gzip
/// encoder into the backup directory.
///
/// The dump is written to a temporary file and only renamed to its final
/// timestamped name after pg_dump exits cleanly, so a failed dump never
/// leaves a truncated file under a valid backup name.
pub fn dump_database(settings: &Settings) -> Result<String> {
    let pg_dump_path = find_pg_dump_executable()?;

    let backup_filename = backup_file_name(&settings.backup_prefix, Local::now().naive_local());
    let backup_path = settings.backup_dir.join(&backup_filename);

    let staging_file = NamedTempFile::new_in(&settings.backup_dir).with_context(|| {
        format!(
            "Failed to create a staging file in {}",
            settings.backup_dir.display()
        )
    })?;
    let mut encoder = GzEncoder::new(staging_file, Compression::default());

    let mut child = Command::new(&pg_dump_path)
        .arg(settings.database_url()?.as_str())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to execute pg_dump for database: {}", settings.database))?;

    let mut dump_stream = child
        .stdout
        .take()
        .context("Failed to capture pg_dump stdout")?;
    let copy_result = io::copy(&mut dump_stream, &mut encoder);
    drop(dump_stream);

    let output = child
        .wait_with_output()
        .context("Failed to wait for pg_dump to finish")?;
    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "pg_dump for database {} failed with status: {}\nStderr: {}",
            settings.database,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    copy_result.context("Failed to stream pg_dump output into the compressed backup file")?;

    let staging_file = encoder
        .finish()
        .context("Failed to finish gzip encoding of the backup")?;
    staging_file.persist(&backup_path).with_context(|| {
        format!(
            "Failed to move the finished backup into place at {}",
            backup_path.display()
        )
    })?;

    Ok(backup_filename)
}
