//! No-op chat log — disables persistence entirely.

use async_trait::async_trait;
use nextyou_core::chat_log::{ChatLog, ChatLogEntry};
use nextyou_core::error::ChatLogError;
use nextyou_core::message::Role;

/// A chat log that stores nothing.
pub struct NoopChatLog;

#[async_trait]
impl ChatLog for NoopChatLog {
    fn name(&self) -> &str { "none" }

    async fn append(&self, _role: Role, _message: &str) -> Result<(), ChatLogError> {
        Ok(())
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<ChatLogEntry>, ChatLogError> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<usize, ChatLogError> {
        Ok(0)
    }

    async fn clear(&self) -> Result<(), ChatLogError> {
        Ok(())
    }
}
