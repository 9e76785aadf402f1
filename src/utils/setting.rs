use anyhow::{Context, Result};
use sqlx::{Connection, PgConnection};

/// Verifies the database answers before an operation starts work.
pub async fn check_db_connection(db_url: &str, host: &str) -> Result<()> {
    let mut conn = PgConnection::connect(db_url)
        .await
        .with_context(|| format!("Failed to connect to the database on {host}"))?;
    conn.ping()
        .await
        .with_context(|| format!("Database on {host} did not answer ping"))?;
    Ok(())
}
