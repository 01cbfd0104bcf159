//! Content store adapter over SQLite.
//!
//! Owns all persisted state: chunk/message rows and cached answers. The
//! pipeline holds no durable in-process state; every lookup round-trips to
//! the store. Retrieval returns chunks in insertion order and does not rank
//! or filter by embedding similarity — ranking, when enabled, happens in
//! the query pipeline on top of [`ContentStore::list_chunks_with_embeddings`].

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::embedding::{blob_to_vec, vec_to_blob};
use crate::error::Result;
use crate::models::{Answer, Sender};

#[derive(Clone)]
pub struct ContentStore {
    pool: SqlitePool,
}

impl ContentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert one extracted chunk. `embedding = None` stores a NULL vector;
    /// the content is persisted either way. Returns the new row id.
    pub async fn insert_chunk(
        &self,
        content: &str,
        embedding: Option<&[f32]>,
        scope: &str,
        producer: &Sender,
    ) -> Result<String> {
        self.insert_row(scope, producer, content, embedding).await
    }

    /// Insert a conversational turn (user question or AI answer) into the
    /// same ordered log as chunks. Returns the new row id.
    pub async fn insert_message(
        &self,
        scope: &str,
        sender: &Sender,
        content: &str,
    ) -> Result<String> {
        self.insert_row(scope, sender, content, None).await
    }

    async fn insert_row(
        &self,
        scope: &str,
        sender: &Sender,
        content: &str,
        embedding: Option<&[f32]>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        let blob = embedding.map(vec_to_blob);

        sqlx::query(
            r#"
            INSERT INTO messages (id, scope, sender_id, sender_role, content, embedding, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(scope)
        .bind(&sender.id)
        .bind(&sender.role)
        .bind(content)
        .bind(blob)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// All stored content for a scope, in insertion order.
    pub async fn list_chunks(&self, scope: &str) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT content FROM messages WHERE scope = ? ORDER BY rowid")
            .bind(scope)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("content")).collect())
    }

    /// All stored content for a scope with its embedding (if any), in
    /// insertion order. Used by similarity-ranked retrieval.
    pub async fn list_chunks_with_embeddings(
        &self,
        scope: &str,
    ) -> Result<Vec<(String, Option<Vec<f32>>)>> {
        let rows =
            sqlx::query("SELECT content, embedding FROM messages WHERE scope = ? ORDER BY rowid")
                .bind(scope)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let content: String = row.get("content");
                let blob: Option<Vec<u8>> = row.get("embedding");
                (content, blob.map(|b| blob_to_vec(&b)))
            })
            .collect())
    }

    /// Whether any content exists for a scope.
    pub async fn scope_has_content(&self, scope: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE scope = ?")
            .bind(scope)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Look up the canonical answer for an exact `(query, scope)` pair.
    pub async fn get_answer(&self, query: &str, scope: &str) -> Result<Option<Answer>> {
        let row = sqlx::query(
            "SELECT query, scope, answer, created_at FROM answers WHERE query = ? AND scope = ?",
        )
        .bind(query)
        .bind(scope)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Answer {
            query: row.get("query"),
            scope: row.get("scope"),
            answer: row.get("answer"),
            created_at: row.get("created_at"),
        }))
    }

    /// Upsert the canonical answer for `(query, scope)`. Concurrent
    /// duplicate generations converge on a single row, last write wins.
    pub async fn put_answer(&self, query: &str, scope: &str, answer: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO answers (query, scope, answer, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(query, scope) DO UPDATE SET
                answer = excluded.answer,
                created_at = excluded.created_at
            "#,
        )
        .bind(query)
        .bind(scope)
        .bind(answer)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
