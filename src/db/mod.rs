use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

pub mod watermark;

// One row, pinned to id 1. `last_ts` keeps Slack's textual form so the value
// round-trips exactly.
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS watermark (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        last_ts TEXT NOT NULL,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Opens (creating if needed) the watermark database. A single connection is
/// enough for the one poll loop that writes to it.
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open watermark database {}", db_path.display()))?;

    sqlx::query(SCHEMA).execute(&pool).await?;
    tracing::debug!(target: "db", path = %db_path.display(), "watermark database ready");

    Ok(pool)
}
