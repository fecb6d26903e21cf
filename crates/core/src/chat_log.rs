//! Chat log trait — the append-only conversation record.
//!
//! Each successful coaching turn appends the user message followed by the
//! assistant reply. The history view reads back the most recent rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::ChatLogError;
use crate::message::Role;

/// A single logged chat line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    /// Who said it
    pub role: Role,

    /// The text
    pub message: String,

    /// When it was appended
    pub created_at: DateTime<Utc>,
}

/// The core ChatLog trait.
///
/// Implementations: SQLite, in-memory (for testing), none (no-op).
#[async_trait]
pub trait ChatLog: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory", "none").
    fn name(&self) -> &str;

    /// Append one line to the log.
    async fn append(&self, role: Role, message: &str) -> std::result::Result<(), ChatLogError>;

    /// The most recent `limit` lines, ordered oldest → newest.
    async fn recent(&self, limit: usize) -> std::result::Result<Vec<ChatLogEntry>, ChatLogError>;

    /// Total number of logged lines.
    async fn count(&self) -> std::result::Result<usize, ChatLogError>;

    /// Remove every line.
    async fn clear(&self) -> std::result::Result<(), ChatLogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_history_shape() {
        let entry = ChatLogEntry {
            role: Role::User,
            message: "I feel unmotivated".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["message"], "I feel unmotivated");
        assert!(json["created_at"].is_string());
    }
}
