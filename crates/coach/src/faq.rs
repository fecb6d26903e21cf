//! FAQ matcher — picks reference Q/A pairs to hand to the composer.
//!
//! The match rule is a crude first-word test: an entry is relevant when the
//! lower-cased message contains the entry's first question word. It is not
//! semantic search and should not become one; the behaviour users see
//! depends on this exact rule.

use nextyou_config::FaqConfig;
use nextyou_core::coaching::FaqEntry;
use nextyou_core::error::Error;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Upper bound on entries returned by [`find_relevant`].
pub const MAX_FAQ_MATCHES: usize = 3;

/// Return up to [`MAX_FAQ_MATCHES`] entries whose first question word
/// appears in `message`, in catalog order.
pub fn find_relevant(message: &str, catalog: &[FaqEntry]) -> Vec<FaqEntry> {
    let lower = message.to_lowercase();
    catalog
        .iter()
        .filter(|entry| lower.contains(entry.first_word().as_str()))
        .take(MAX_FAQ_MATCHES)
        .cloned()
        .collect()
}

/// An ordered set of FAQ entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FaqCatalog {
    #[serde(default)]
    entries: Vec<FaqEntry>,
}

impl FaqCatalog {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    /// The ten built-in fitness entries.
    pub fn builtin() -> Self {
        let entries = BUILTIN_ENTRIES
            .iter()
            .map(|(q, a)| FaqEntry::new(*q, *a))
            .collect();
        Self { entries }
    }

    /// Parse a catalog from TOML (`[[entries]]` tables with `question` and `answer`).
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Config {
            message: format!("Invalid FAQ catalog: {e}"),
        })
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read FAQ catalog {}: {e}", path.display()),
        })?;
        let catalog = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), entries = catalog.len(), "Loaded FAQ catalog");
        Ok(catalog)
    }

    /// The catalog named by `[faq] catalog_path`, or the built-in one.
    pub fn from_config(config: &FaqConfig) -> Result<Self, Error> {
        match &config.catalog_path {
            Some(path) => Self::load(Path::new(path)),
            None => Ok(Self::builtin()),
        }
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_relevant(&self, message: &str) -> Vec<FaqEntry> {
        find_relevant(message, &self.entries)
    }
}

impl Default for FaqCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    (
        "How many days a week should a beginner work out?",
        "Beginners should aim for 3–4 workout days per week with rest days in between.",
    ),
    (
        "What is a good warm-up before exercise?",
        "A good warm-up includes light cardio like walking or jogging, followed by dynamic stretches.",
    ),
    (
        "How long should workouts be?",
        "30–45 minutes is sufficient for most people, especially beginners.",
    ),
    (
        "How can I stay consistent with workouts?",
        "Set small goals, schedule workouts, and focus on habit-building rather than intensity.",
    ),
    (
        "Is walking enough exercise?",
        "Yes, walking is a great low-impact exercise, especially when done consistently.",
    ),
    (
        "How much sleep is important for fitness?",
        "7–9 hours of sleep is ideal for recovery, energy, and motivation.",
    ),
    (
        "Should I work out when feeling tired?",
        "Light movement is okay, but rest is better if fatigue is extreme.",
    ),
    (
        "How do I build a workout habit?",
        "Start small, attach workouts to existing routines, and track progress.",
    ),
    (
        "What exercises are good for beginners?",
        "Bodyweight exercises like squats, push-ups, and walking are great for beginners.",
    ),
    (
        "How long does it take to see results?",
        "Most people notice small changes within 2–4 weeks of consistent effort.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_ten_entries() {
        let catalog = FaqCatalog::builtin();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.entries()[0].question.starts_with("How many days"));
    }

    #[test]
    fn how_questions_are_capped_at_three_in_order() {
        let catalog = FaqCatalog::builtin();
        let matches = catalog.find_relevant("how do I start?");
        assert_eq!(matches.len(), MAX_FAQ_MATCHES);
        assert_eq!(matches[0].question, "How many days a week should a beginner work out?");
        assert_eq!(matches[1].question, "How long should workouts be?");
        assert_eq!(matches[2].question, "How can I stay consistent with workouts?");
    }

    #[test]
    fn every_match_contains_its_first_word() {
        let catalog = FaqCatalog::builtin();
        for message in ["What should I eat", "is it ok", "SHOULD i rest", "whatever"] {
            let lower = message.to_lowercase();
            for entry in catalog.find_relevant(message) {
                assert!(lower.contains(&entry.first_word()));
            }
        }
    }

    #[test]
    fn first_word_matches_as_substring() {
        let catalog = FaqCatalog::builtin();
        // "this" contains "is"
        let matches = catalog.find_relevant("this");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].question, "Is walking enough exercise?");
    }

    #[test]
    fn no_match_returns_empty() {
        let catalog = FaqCatalog::builtin();
        assert!(catalog.find_relevant("I feel unmotivated").is_empty());
        assert!(catalog.find_relevant("").is_empty());
    }

    #[test]
    fn matcher_is_pure() {
        let catalog = FaqCatalog::builtin();
        let first = catalog.find_relevant("What should I do");
        let second = catalog.find_relevant("What should I do");
        assert_eq!(first, second);
    }

    #[test]
    fn load_catalog_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.toml");
        std::fs::write(
            &path,
            r#"
[[entries]]
question = "Can I train every day?"
answer = "Alternate hard and easy days."
"#,
        )
        .unwrap();

        let catalog = FaqCatalog::from_config(&FaqConfig {
            enabled: true,
            catalog_path: Some(path.to_string_lossy().into_owned()),
        })
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find_relevant("can you help").len(), 1);
    }

    #[test]
    fn missing_catalog_file_is_config_error() {
        let err = FaqCatalog::load(Path::new("/nonexistent/faq.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = FaqCatalog::from_toml_str("[[entries]]\nquestion = 1").unwrap_err();
        assert!(err.to_string().contains("Invalid FAQ catalog"));
    }
}
