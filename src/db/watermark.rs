use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use crate::domain::{SlackTs, WatermarkStore};

/// Watermark kept in a one-row sqlite table so it survives restarts.
#[derive(Clone)]
pub struct SqliteWatermarkStore {
    pool: SqlitePool,
}

impl SqliteWatermarkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl WatermarkStore for SqliteWatermarkStore {
    async fn get(&self) -> Result<Option<SlackTs>> {
        let row: Option<(String,)> = sqlx::query_as(r#"SELECT last_ts FROM watermark WHERE id = 1"#)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(raw,)| raw.parse::<SlackTs>())
            .transpose()
            .context("stored watermark is corrupt")
    }

    async fn set(&self, ts: SlackTs) -> Result<()> {
        // text comparison would misorder timestamps, so check in Rust under
        // a transaction instead of in SQL
        let mut tx = self.pool.begin().await?;
        let current: Option<(String,)> =
            sqlx::query_as(r#"SELECT last_ts FROM watermark WHERE id = 1"#)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.and_then(|(raw,)| raw.parse::<SlackTs>().ok());
        if current.is_some_and(|current| current >= ts) {
            tracing::debug!(target: "watermark", requested = %ts, "stored watermark is not older; keeping it");
            return Ok(());
        }

        sqlx::query(
            r#"INSERT INTO watermark (id, last_ts, updated_at) VALUES (1, ?1, CURRENT_TIMESTAMP)
               ON CONFLICT(id) DO UPDATE SET last_ts = excluded.last_ts, updated_at = excluded.updated_at"#,
        )
        .bind(ts.to_string())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::debug!(target: "watermark", ts = %ts, "watermark persisted");
        Ok(())
    }
}
