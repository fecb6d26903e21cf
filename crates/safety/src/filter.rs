//! Denylist filter — screens a raw user message before any prompt is built.
//!
//! Matching is a lower-cased substring test, so "Injury", "injuries" and
//! "pain" inside "painful" all block.

use nextyou_config::SafetyConfig;
use serde::Serialize;

/// Topic keywords that short-circuit a turn.
pub const DEFAULT_BLOCKED_KEYWORDS: &[&str] = &[
    "injury",
    "fracture",
    "pain",
    "diabetes",
    "disease",
    "medicine",
    "medication",
    "supplement",
];

/// Reply returned instead of calling the model.
pub const REFUSAL_MESSAGE: &str = "I can’t help with medical, injury-related, or medication advice. Please consult a certified healthcare professional.";

/// Result of screening one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScreenOutcome {
    Allowed,
    Blocked {
        /// The first denylisted keyword found
        keyword: String,
        /// The fixed refusal to send back
        reply: String,
    },
}

impl ScreenOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, ScreenOutcome::Blocked { .. })
    }
}

/// Case-insensitive keyword denylist.
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    keywords: Vec<String>,
    refusal: String,
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_KEYWORDS.iter().copied(), REFUSAL_MESSAGE)
    }
}

impl SafetyFilter {
    /// Build a filter. Keywords are trimmed and lower-cased; blank ones are dropped.
    pub fn new<I, S>(keywords: I, refusal: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            keywords,
            refusal: refusal.into(),
        }
    }

    /// Build from the `[safety]` config section, falling back to the built-ins.
    pub fn from_config(config: &SafetyConfig) -> Self {
        let refusal = config
            .refusal_message
            .clone()
            .unwrap_or_else(|| REFUSAL_MESSAGE.to_string());

        match &config.blocked_keywords {
            Some(keywords) => Self::new(keywords, refusal),
            None => Self::new(DEFAULT_BLOCKED_KEYWORDS.iter().copied(), refusal),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn refusal(&self) -> &str {
        &self.refusal
    }

    /// Screen a raw message. Any keyword occurrence blocks.
    pub fn screen(&self, message: &str) -> ScreenOutcome {
        let lower = message.to_lowercase();
        match self.keywords.iter().find(|k| lower.contains(k.as_str())) {
            Some(keyword) => ScreenOutcome::Blocked {
                keyword: keyword.clone(),
                reply: self.refusal.clone(),
            },
            None => ScreenOutcome::Allowed,
        }
    }
}
