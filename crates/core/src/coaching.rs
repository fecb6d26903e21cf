//! Coaching value objects — the inputs and output of prompt composition.
//!
//! Everything here is plain data. Validation happens at construction
//! (`LifestyleSnapshot::new`, `PersonalityMode::from_str`) so a
//! `PromptRequest` that exists is always composable.

use serde::{Deserialize, Serialize};
use crate::error::RequestError;

/// Selectable coaching tone applied to every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonalityMode {
    #[serde(alias = "encouragement_seeker")]
    EncouragementSeeker,
    #[serde(alias = "creative_explorer")]
    CreativeExplorer,
    #[serde(alias = "goal_finisher")]
    GoalFinisher,
}

impl PersonalityMode {
    pub const ALL: [PersonalityMode; 3] = [
        PersonalityMode::EncouragementSeeker,
        PersonalityMode::CreativeExplorer,
        PersonalityMode::GoalFinisher,
    ];

    /// Wire name, e.g. `ENCOURAGEMENT_SEEKER`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityMode::EncouragementSeeker => "ENCOURAGEMENT_SEEKER",
            PersonalityMode::CreativeExplorer => "CREATIVE_EXPLORER",
            PersonalityMode::GoalFinisher => "GOAL_FINISHER",
        }
    }

}

impl std::fmt::Display for PersonalityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PersonalityMode {
    type Err = RequestError;

    /// Accepts any casing, with `_` or `-` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        PersonalityMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| RequestError::UnknownPersonality(s.to_string()))
    }
}

/// Bucketed tenure of the user in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageStage {
    /// 0–3 days
    New,
    /// 4–8 days
    Active,
    /// 9+ days
    Experienced,
}

impl UsageStage {
    pub const NEW_MAX_DAYS: u32 = 3;
    pub const ACTIVE_MAX_DAYS: u32 = 8;

    pub fn from_days(days_using_app: u32) -> Self {
        if days_using_app <= Self::NEW_MAX_DAYS {
            UsageStage::New
        } else if days_using_app <= Self::ACTIVE_MAX_DAYS {
            UsageStage::Active
        } else {
            UsageStage::Experienced
        }
    }
}

/// Caller-supplied daily activity and sleep figures.
///
/// Values are never clamped or converted; they are rendered as given.
/// Deserializing goes through the same check as [`LifestyleSnapshot::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LifestyleFields")]
pub struct LifestyleSnapshot {
    steps: f64,
    exercise_minutes: f64,
    sleep_hours: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifestyleFields {
    steps: f64,
    exercise_minutes: f64,
    sleep_hours: f64,
}

impl TryFrom<LifestyleFields> for LifestyleSnapshot {
    type Error = RequestError;

    fn try_from(fields: LifestyleFields) -> Result<Self, Self::Error> {
        Self::new(fields.steps, fields.exercise_minutes, fields.sleep_hours)
    }
}

impl LifestyleSnapshot {
    /// Build a snapshot, rejecting negative (or NaN) metrics.
    pub fn new(steps: f64, exercise_minutes: f64, sleep_hours: f64) -> Result<Self, RequestError> {
        check_metric("steps", steps)?;
        check_metric("exerciseMinutes", exercise_minutes)?;
        check_metric("sleepHours", sleep_hours)?;
        Ok(Self {
            steps,
            exercise_minutes,
            sleep_hours,
        })
    }

    pub fn steps(&self) -> f64 {
        self.steps
    }

    pub fn exercise_minutes(&self) -> f64 {
        self.exercise_minutes
    }

    pub fn sleep_hours(&self) -> f64 {
        self.sleep_hours
    }
}

fn check_metric(field: &'static str, value: f64) -> Result<(), RequestError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(RequestError::InvalidMetric { field, value })
    }
}

/// One entry of the fixed FAQ reference set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// The question text up to its first space, lower-cased.
    pub fn first_word(&self) -> String {
        self.question
            .split(' ')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// Everything the composer needs for a single turn.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub personality: PersonalityMode,
    pub days_using_app: u32,
    pub lifestyle: LifestyleSnapshot,
    pub user_message: String,
    pub faq_context: Vec<FaqEntry>,
}

impl PromptRequest {
    pub fn new(
        personality: PersonalityMode,
        days_using_app: u32,
        lifestyle: LifestyleSnapshot,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            personality,
            days_using_app,
            lifestyle,
            user_message: user_message.into(),
            faq_context: Vec::new(),
        }
    }

    /// Attach FAQ reference entries.
    pub fn with_faq_context(mut self, faq_context: Vec<FaqEntry>) -> Self {
        self.faq_context = faq_context;
        self
    }

    pub fn usage_stage(&self) -> UsageStage {
        UsageStage::from_days(self.days_using_app)
    }
}

/// The single system instruction sent to the model for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComposedPrompt(String);

impl ComposedPrompt {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
