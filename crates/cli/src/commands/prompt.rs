//! `nextyou prompt` — Show the system prompt a turn would send.

use std::sync::Arc;
use nextyou_chatlog::NoopChatLog;
use nextyou_coach::PreviewResult;
use nextyou_config::AppConfig;

use super::{TurnArgs, build_pipeline};

pub async fn run(turn: TurnArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let request = turn.into_request()?;
    let pipeline = build_pipeline(&config, Arc::new(NoopChatLog))?;

    match pipeline.preview(request) {
        PreviewResult::Composed(prompt) => println!("{prompt}"),
        PreviewResult::Blocked { keyword, reply } => {
            println!("🚫 Blocked (matched \"{keyword}\"); the model would not be called.");
            println!("   Reply: {reply}");
        }
    }

    Ok(())
}
