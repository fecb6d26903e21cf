//! SQLite chat log.
//!
//! A single `chats` table; rows are only ever inserted. The autoincrement
//! `id` gives insertion order, so history reads never depend on timestamp
//! resolution.

use async_trait::async_trait;
use chrono::Utc;
use nextyou_core::chat_log::{ChatLog, ChatLogEntry};
use nextyou_core::error::ChatLogError;
use nextyou_core::message::Role;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// A SQLite-backed append-only chat log.
pub struct SqliteChatLog {
    pool: SqlitePool,
}

impl SqliteChatLog {
    /// Open (or create) the chat log at `path`.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, ChatLogError> {
        if !path.contains(":memory:") {
            if let Some(parent) = Path::new(path.trim_start_matches("sqlite://")).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        ChatLogError::Storage(format!("Failed to create {}: {e}", parent.display()))
                    })?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| ChatLogError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| ChatLogError::Storage(format!("Failed to open SQLite: {e}")))?;

        let log = Self { pool };
        log.run_migrations().await?;
        info!("SQLite chat log initialized at {path}");
        Ok(log)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, ChatLogError> {
        let log = Self { pool };
        log.run_migrations().await?;
        Ok(log)
    }

    async fn run_migrations(&self) -> Result<(), ChatLogError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chats (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                role       TEXT NOT NULL,
                message    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ChatLogError::MigrationFailed(format!("chats table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<ChatLogEntry, ChatLogError> {
        let role: String = row
            .try_get("role")
            .map_err(|e| ChatLogError::QueryFailed(format!("role column: {e}")))?;
        let message: String = row
            .try_get("message")
            .map_err(|e| ChatLogError::QueryFailed(format!("message column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| ChatLogError::QueryFailed(format!("created_at column: {e}")))?;

        let role = Role::from_str(&role).map_err(ChatLogError::QueryFailed)?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ChatLogError::QueryFailed(format!("created_at '{created_at_str}': {e}")))?;

        Ok(ChatLogEntry {
            role,
            message,
            created_at,
        })
    }
}

#[async_trait]
impl ChatLog for SqliteChatLog {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, role: Role, message: &str) -> Result<(), ChatLogError> {
        sqlx::query("INSERT INTO chats (role, message, created_at) VALUES (?1, ?2, ?3)")
            .bind(role.as_str())
            .bind(message)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| ChatLogError::Storage(format!("INSERT failed: {e}")))?;

        debug!(role = %role, len = message.len(), "Appended chat line");
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatLogEntry>, ChatLogError> {
        let rows = sqlx::query(
            "SELECT role, message, created_at FROM chats ORDER BY id DESC LIMIT ?1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatLogError::QueryFailed(format!("recent: {e}")))?;

        let mut entries = rows
            .iter()
            .map(Self::row_to_entry)
            .collect::<Result<Vec<_>, _>>()?;
        entries.reverse();
        Ok(entries)
    }

    async fn count(&self) -> Result<usize, ChatLogError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chats")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ChatLogError::QueryFailed(format!("count: {e}")))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| ChatLogError::QueryFailed(format!("count column: {e}")))?;
        Ok(n as usize)
    }

    async fn clear(&self) -> Result<(), ChatLogError> {
        sqlx::query("DELETE FROM chats")
            .execute(&self.pool)
            .await
            .map_err(|e| ChatLogError::Storage(format!("DELETE failed: {e}")))?;
        Ok(())
    }
}
