use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::Result;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables and indexes. Idempotent.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Chunks and conversational turns share one append-only table,
    // partitioned by scope. embedding is NULL when no vector could be
    // computed for the content.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            scope TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            sender_role TEXT NOT NULL,
            content TEXT NOT NULL,
            embedding BLOB,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One canonical answer per (query, scope); writes are upserts.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            query TEXT NOT NULL,
            scope TEXT NOT NULL,
            answer TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(query, scope)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_scope ON messages(scope)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_answers_scope ON answers(scope)")
        .execute(pool)
        .await?;

    Ok(())
}
