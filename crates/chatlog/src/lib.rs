//! Chat log implementations for NextYou.

pub mod noop;
pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use noop::NoopChatLog;
pub use in_memory::InMemoryChatLog;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteChatLog;

use std::sync::Arc;
use nextyou_config::ChatLogConfig;
use nextyou_core::ChatLog;
use nextyou_core::error::ChatLogError;

/// Open the chat log selected by `[chat_log] backend`.
pub async fn open_from_config(config: &ChatLogConfig) -> Result<Arc<dyn ChatLog>, ChatLogError> {
    match config.backend.as_str() {
        "none" => Ok(Arc::new(NoopChatLog)),
        "in_memory" => Ok(Arc::new(InMemoryChatLog::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config.resolved_path();
            Ok(Arc::new(SqliteChatLog::new(&path).await?))
        }
        other => Err(ChatLogError::Storage(format!(
            "chat log backend '{other}' is not available in this build"
        ))),
    }
}
