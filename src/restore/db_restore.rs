use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use sqlx::{Connection, PgConnection};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use which::which;

use crate::config::{POSTGRES_SUPERUSER, Settings};

fn find_psql_executable() -> Result<PathBuf> {
    which("psql").context(
        "psql executable not found in PATH. Please ensure PostgreSQL client tools are installed and in your PATH.",
    )
}

/// Opens a connection to the `postgres` maintenance database. DROP/CREATE
/// DATABASE cannot run from a session connected to the target database.
pub async fn connect_admin(settings: &Settings) -> Result<PgConnection> {
    let admin_url = settings.admin_url()?;
    PgConnection::connect(admin_url.as_str())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to the '{}' maintenance database on {}",
                POSTGRES_SUPERUSER, settings.host
            )
        })
}

/// Drops the target database after terminating its other sessions; a
/// connected client would otherwise block the drop indefinitely.
pub async fn drop_database(admin_conn: &mut PgConnection, settings: &Settings) -> Result<()> {
    if settings.database.eq_ignore_ascii_case(POSTGRES_SUPERUSER) {
        anyhow::bail!(
            "Refusing to drop the '{}' system database.",
            POSTGRES_SUPERUSER
        );
    }

    sqlx::query(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = $1 AND pid <> pg_backend_pid()",
    )
    .bind(&settings.database)
    .execute(&mut *admin_conn)
    .await
    .with_context(|| {
        format!(
            "Failed to terminate connections to database '{}'",
            settings.database
        )
    })?;

    sqlx::query(&format!(
        r#"DROP DATABASE IF EXISTS "{}""#,
        quote_ident(&settings.database)
    ))
    .execute(&mut *admin_conn)
    .await
    .with_context(|| format!("Failed to drop database '{}'", settings.database))?;

    Ok(())
}

/// Creates an empty target database owned by the configured user.
pub async fn create_database(admin_conn: &mut PgConnection, settings: &Settings) -> Result<()> {
    sqlx::query(&format!(
        r#"CREATE DATABASE "{}" OWNER "{}""#,
        quote_ident(&settings.database),
        quote_ident(&settings.user)
    ))
    .execute(&mut *admin_conn)
    .await
    .with_context(|| format!("Failed to create database '{}'", settings.database))?;

    Ok(())
}

/// Decompresses the backup file and replays it against the target database
/// by streaming it into psql's stdin.
pub fn apply_dump(settings: &Settings, backup_path: &Path) -> Result<()> {
    let psql_path = find_psql_executable()?;

    let backup_file = File::open(backup_path)
        .with_context(|| format!("Failed to open backup file: {}", backup_path.display()))?;
    let mut decoder = GzDecoder::new(backup_file);

    let mut child = Command::new(&psql_path)
        .arg("-X") // Do not read psqlrc
        .arg("-q") // Quiet mode
        .arg("-v")
        .arg("ON_ERROR_STOP=1") // Exit on first error
        .arg("-d")
        .arg(settings.database_url()?.as_str())
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| {
            format!(
                "Failed to execute psql to replay backup: {}",
                backup_path.display()
            )
        })?;

    let mut replay_input = child.stdin.take().context("Failed to open psql stdin")?;
    // If psql dies early the copy fails with a broken pipe; psql's stderr
    // below carries the actual cause, so its status is checked first.
    let copy_result = io::copy(&mut decoder, &mut replay_input);
    drop(replay_input);

    let output = child
        .wait_with_output()
        .context("Failed to wait for psql to finish")?;
    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "psql replay of {} failed with status: {}\nStderr: {}",
            backup_path.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    copy_result.context("Failed to stream the decompressed backup into psql")?;

    Ok(())
}

fn quote_ident(name: &str) -> String {
    name.replace('"', "\"\"")
}
