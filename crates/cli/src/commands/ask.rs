//! `nextyou ask` — Run one coaching turn from the terminal.

use nextyou_coach::{CoachPipeline, TurnOutcome};
use nextyou_config::AppConfig;

use super::{TurnArgs, build_pipeline};

pub async fn run(turn: TurnArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let request = turn.into_request()?;
    let chat_log = nextyou_chatlog::open_from_config(&config.chat_log).await?;
    let pipeline = build_pipeline(&config, chat_log)?;

    if missing_api_key(&config, &pipeline, &request.user_message) {
        print_missing_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let reply = pipeline.handle(request).await;
    println!("{}", reply.reply);

    match reply.outcome {
        TurnOutcome::UpstreamFailure => {
            Err("The model call failed. Run `nextyou doctor` to check the provider.".into())
        }
        TurnOutcome::Answered | TurnOutcome::Blocked => Ok(()),
    }
}

/// True when the turn would reach a keyed provider without a key.
/// A blocked message never reaches the model, so it needs none.
fn missing_api_key(config: &AppConfig, pipeline: &CoachPipeline, message: &str) -> bool {
    nextyou_providers::requires_api_key(config)
        && !config.has_api_key()
        && !pipeline.filter().screen(message).is_blocked()
}

fn print_missing_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    GROQ_API_KEY=gsk_...      (default provider)");
    eprintln!("    OPENAI_API_KEY=sk-...     (with NEXTYOU_PROVIDER=openai)");
    eprintln!("    NEXTYOU_API_KEY=...       (generic)");
    eprintln!();
    eprintln!("  Or use a local server: NEXTYOU_PROVIDER=ollama");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use nextyou_chatlog::NoopChatLog;

    fn keyless(provider: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.api_key = None;
        config.providers.clear();
        config.default_provider = provider.into();
        config
    }

    #[test]
    fn keyed_provider_without_key_is_refused() {
        let config = keyless("groq");
        let pipeline = build_pipeline(&config, Arc::new(NoopChatLog)).unwrap();
        assert!(missing_api_key(&config, &pipeline, "I feel unmotivated"));
    }

    #[test]
    fn blocked_message_needs_no_key() {
        let config = keyless("groq");
        let pipeline = build_pipeline(&config, Arc::new(NoopChatLog)).unwrap();
        assert!(!missing_api_key(&config, &pipeline, "my knee injury hurts"));
    }

    #[test]
    fn local_provider_needs_no_key() {
        let config = keyless("ollama");
        let pipeline = build_pipeline(&config, Arc::new(NoopChatLog)).unwrap();
        assert!(!missing_api_key(&config, &pipeline, "I feel unmotivated"));
    }
}
