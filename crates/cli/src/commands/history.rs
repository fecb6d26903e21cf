//! `nextyou history` — Print recent chat log rows.

use nextyou_config::{AppConfig, MAX_HISTORY_LIMIT};
use nextyou_core::ChatLog;

pub async fn run(limit: Option<usize>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let chat_log = nextyou_chatlog::open_from_config(&config.chat_log).await?;

    let limit = limit
        .unwrap_or(config.chat_log.history_limit)
        .clamp(1, MAX_HISTORY_LIMIT);
    let entries = chat_log.recent(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No chat history yet.");
        return Ok(());
    }

    for entry in &entries {
        println!(
            "[{}] {:>9}: {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.role.as_str(),
            entry.message
        );
    }

    Ok(())
}
