//! In-memory chat log — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use nextyou_core::chat_log::{ChatLog, ChatLogEntry};
use nextyou_core::error::ChatLogError;
use nextyou_core::message::Role;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A chat log that keeps every line in a Vec.
pub struct InMemoryChatLog {
    entries: Arc<RwLock<Vec<ChatLogEntry>>>,
}

impl InMemoryChatLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryChatLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatLog for InMemoryChatLog {
    fn name(&self) -> &str { "in_memory" }

    async fn append(&self, role: Role, message: &str) -> Result<(), ChatLogError> {
        self.entries.write().await.push(ChatLogEntry {
            role,
            message: message.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatLogEntry>, ChatLogError> {
        let entries = self.entries.read().await;
        let start = entries.len().saturating_sub(limit);
        Ok(entries[start..].to_vec())
    }

    async fn count(&self) -> Result<usize, ChatLogError> {
        Ok(self.entries.read().await.len())
    }

    async fn clear(&self) -> Result<(), ChatLogError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
