//! SQLite-backed [`RecordStore`].
//!
//! The schema migration is applied inline via `include_str!` on open so a
//! fresh database is usable immediately; every lookup is a plain `SELECT`.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::trace;

use super::{Message, RecordKind, RecordStore, StoreError, Thread};

/// Row type returned by SQLite queries for messages.
type MessageRow = (String, Option<String>, i64, Option<i64>, bool);

/// Record store over a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at the given path and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migration fails.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .pragma("trusted_schema", "OFF")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open record store at {}", path.display()))?;

        let migration_sql = include_str!("../../migrations/001_outreach_schema.sql");
        sqlx::raw_sql(migration_sql)
            .execute(&pool)
            .await
            .context("failed to apply outreach schema migration")?;

        Ok(Self { pool })
    }

    /// The underlying pool, for loading fixtures and administrative access.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn find_thread(&self, practice_id: i64, doctor_id: i64) -> Result<Thread, StoreError> {
        let row: (i64, i64, i64) = sqlx::query_as(
            "SELECT id, practice_id, doctor_id FROM message_threads \
             WHERE practice_id = ?1 AND doctor_id = ?2 ORDER BY id LIMIT 1",
        )
        .bind(practice_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            record: RecordKind::Thread,
            id: format!("practice {practice_id} / doctor {doctor_id}"),
        })?;
        trace!(thread_id = row.0, "thread found");
        Ok(Thread {
            id: row.0,
            practice_id: row.1,
            doctor_id: row.2,
        })
    }

    async fn list_messages(&self, thread_id: i64) -> Result<Vec<Message>, StoreError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, body, user_id, doctor_id, is_read FROM messages \
             WHERE thread_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, body, user_id, doctor_id, is_read)| Message {
                id,
                body: body.unwrap_or_default(),
                user_id,
                doctor_id,
                is_read,
            })
            .collect())
    }

    async fn find_user_display_name(&self, doctor_id: i64) -> Result<String, StoreError> {
        let row: (Option<String>,) = sqlx::query_as("SELECT display_name FROM users WHERE id = ?1")
            .bind(doctor_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                record: RecordKind::Doctor,
                id: doctor_id.to_string(),
            })?;
        Ok(row.0.unwrap_or_default())
    }

    async fn find_practice_name(&self, practice_id: i64) -> Result<String, StoreError> {
        let row: (String,) = sqlx::query_as("SELECT name FROM practices WHERE id = ?1")
            .bind(practice_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                record: RecordKind::Practice,
                id: practice_id.to_string(),
            })?;
        Ok(row.0)
    }
}
