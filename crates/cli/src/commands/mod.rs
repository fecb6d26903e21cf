pub mod ask;
pub mod doctor;
pub mod history;
pub mod onboard;
pub mod prompt;
pub mod serve;

use clap::Args;
use nextyou_core::coaching::{LifestyleSnapshot, PersonalityMode, PromptRequest};
use nextyou_core::error::RequestError;

/// The inputs of one coaching turn, as command-line flags.
#[derive(Debug, Clone, Args)]
pub struct TurnArgs {
    /// The user message
    pub message: String,

    /// Coaching tone: encouragement_seeker, creative_explorer or goal_finisher
    #[arg(short, long, default_value = "encouragement_seeker")]
    pub personality: String,

    /// Days the user has been using the app
    #[arg(short, long, default_value_t = 0)]
    pub days: u32,

    /// Steps today
    #[arg(long, default_value_t = 0.0)]
    pub steps: f64,

    /// Exercise minutes today
    #[arg(long, default_value_t = 0.0)]
    pub exercise_minutes: f64,

    /// Sleep hours last night
    #[arg(long, default_value_t = 0.0)]
    pub sleep_hours: f64,
}

impl TurnArgs {
    pub fn into_request(self) -> Result<PromptRequest, RequestError> {
        let personality: PersonalityMode = self.personality.parse()?;
        let lifestyle = LifestyleSnapshot::new(self.steps, self.exercise_minutes, self.sleep_hours)?;
        Ok(PromptRequest::new(personality, self.days, lifestyle, self.message))
    }
}

/// Build a pipeline for the configured default provider.
pub fn build_pipeline(
    config: &nextyou_config::AppConfig,
    chat_log: std::sync::Arc<dyn nextyou_core::ChatLog>,
) -> Result<nextyou_coach::CoachPipeline, Box<dyn std::error::Error>> {
    let router = nextyou_providers::build_from_config(config);
    let provider = router
        .default()
        .ok_or_else(|| format!("Provider '{}' is not available", config.default_provider))?;
    Ok(nextyou_coach::CoachPipeline::from_config(config, provider, chat_log)?)
}
