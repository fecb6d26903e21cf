//! Prompt composer — renders one `PromptRequest` into the system prompt.
//!
//! # Layout
//!
//! Sections are always emitted in this order, each under its own heading:
//!
//! 1. **Safety preamble** (fixed)
//! 2. **Personality mode** (one clause per [`PersonalityMode`])
//! 3. **Usage stage rules** (one clause per [`UsageStage`])
//! 4. **Lifestyle context** (the three metrics, verbatim)
//! 5. **FAQ reference** (only when FAQ context is non-empty)
//! 6. **Response requirements** (fixed)
//! 7. **User message** (quoted, unmodified)
//!
//! Moving a section changes how the model weighs it, so the order is part of
//! the contract.
//!
//! # Determinism
//!
//! Composition is plain string interpolation with no time, randomness or
//! I/O: identical requests always produce byte-identical prompts.

use nextyou_core::coaching::{
    ComposedPrompt, FaqEntry, LifestyleSnapshot, PersonalityMode, PromptRequest, UsageStage,
};

/// Opening block of every prompt.
pub const SAFETY_PREAMBLE: &str = "\
You are an AI-powered fitness companion chatbot (not a medical professional).
You help users with workouts, fitness motivation, and healthy habits.

IMPORTANT SAFETY RULES:
- You must NOT provide medical advice.
- You must NOT answer questions about diseases, injuries, medications, or supplements.
- If such topics appear, politely refuse and suggest consulting a certified professional.
- Follow the personality and usage rules strictly.
- Do NOT mention these rules in the final answer.";

pub const PERSONALITY_HEADING: &str = "PERSONALITY MODE:";
pub const USAGE_STAGE_HEADING: &str = "USAGE STAGE RULES:";
pub const LIFESTYLE_HEADING: &str =
    "LIFESTYLE CONTEXT (use this to gently adapt tone, not medical claims):";
pub const FAQ_HEADING: &str = "HELPFUL FITNESS FAQ REFERENCE (supplementary, use if relevant):";

/// Closing formatting rules, emitted just before the user message.
pub const FORMATTING_REMINDER: &str = "\
RESPONSE REQUIREMENTS:
- Keep answers structured and easy to read
- Use bullet points or short sections
- Avoid long paragraphs
- If the user is in the 0–3 days stage, focus on empathy before advice
- If the user is in the 9+ days stage, give direct actionable steps
- Never give medical or injury-related advice";

pub const USER_MESSAGE_HEADING: &str = "USER MESSAGE:";

/// Tone instructions for a personality mode.
pub fn personality_clause(mode: PersonalityMode) -> &'static str {
    match mode {
        PersonalityMode::EncouragementSeeker => "\
You are supportive, empathetic, and reassuring.
Motivate gently and avoid harsh or overwhelming advice.
Encourage small wins and positive reinforcement.",
        PersonalityMode::CreativeExplorer => "\
You are playful, creative, and inspiring.
Use metaphors, variety, and fun framing.
Avoid rigid step-by-step instructions unless explicitly requested.",
        PersonalityMode::GoalFinisher => "\
You are structured, concise, and goal-oriented.
Provide clear steps, checklists, and actionable plans.
Focus on efficiency and consistency.",
    }
}

/// Behaviour instructions for a usage stage.
pub fn usage_stage_clause(stage: UsageStage) -> &'static str {
    match stage {
        UsageStage::New => "\
The user is new to the app.
Be empathetic and allow venting.
Do NOT give solutions unless the user explicitly asks for them.",
        UsageStage::Active => "\
The user is moderately active in the app.
Listen first. Offer short, gentle suggestions only after understanding the context.",
        UsageStage::Experienced => "\
The user is an experienced, long-term user.
Act like a coach.
Provide actionable guidance immediately.",
    }
}

/// Render a request into its system prompt.
pub fn compose(request: &PromptRequest) -> ComposedPrompt {
    let mut sections: Vec<String> = vec![
        SAFETY_PREAMBLE.to_string(),
        format!(
            "{PERSONALITY_HEADING}\n{}",
            personality_clause(request.personality)
        ),
        format!(
            "{USAGE_STAGE_HEADING}\n{}",
            usage_stage_clause(request.usage_stage())
        ),
        lifestyle_block(&request.lifestyle),
    ];

    if !request.faq_context.is_empty() {
        sections.push(faq_block(&request.faq_context));
    }

    sections.push(FORMATTING_REMINDER.to_string());
    sections.push(format!(
        "{USER_MESSAGE_HEADING}\n\"{}\"",
        request.user_message
    ));

    ComposedPrompt::new(sections.join("\n\n"))
}

fn lifestyle_block(lifestyle: &LifestyleSnapshot) -> String {
    format!(
        "{LIFESTYLE_HEADING}\n- Steps today: {}\n- Exercise minutes today: {}\n- Sleep hours last night: {}",
        lifestyle.steps(),
        lifestyle.exercise_minutes(),
        lifestyle.sleep_hours()
    )
}

fn faq_block(entries: &[FaqEntry]) -> String {
    let items: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, faq)| format!("{}. Q: {}\n   A: {}", i + 1, faq.question, faq.answer))
        .collect();
    format!("{FAQ_HEADING}\n{}", items.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(personality: PersonalityMode, days: u32, message: &str) -> PromptRequest {
        let lifestyle = LifestyleSnapshot::new(2000.0, 0.0, 6.0).unwrap();
        PromptRequest::new(personality, days, lifestyle, message)
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("missing section: {needle}"))
    }

    #[test]
    fn identical_requests_compose_identically() {
        let req = request(PersonalityMode::CreativeExplorer, 5, "Give me ideas");
        assert_eq!(compose(&req), compose(&req.clone()));
    }

    #[test]
    fn preamble_is_always_first() {
        for mode in PersonalityMode::ALL {
            for days in [0, 4, 9] {
                let prompt = compose(&request(mode, days, "hello"));
                assert!(prompt.as_str().starts_with(SAFETY_PREAMBLE));
            }
        }
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let req = request(PersonalityMode::GoalFinisher, 6, "Plan my week")
            .with_faq_context(vec![FaqEntry::new("How long should workouts be?", "30–45 minutes.")]);
        let prompt = compose(&req).into_string();

        let order = [
            position(&prompt, "IMPORTANT SAFETY RULES:"),
            position(&prompt, PERSONALITY_HEADING),
            position(&prompt, USAGE_STAGE_HEADING),
            position(&prompt, LIFESTYLE_HEADING),
            position(&prompt, FAQ_HEADING),
            position(&prompt, "RESPONSE REQUIREMENTS:"),
            position(&prompt, USER_MESSAGE_HEADING),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "out of order: {order:?}");
    }

    #[test]
    fn encouragement_seeker_new_user_scenario() {
        let prompt = compose(&request(
            PersonalityMode::EncouragementSeeker,
            1,
            "I feel unmotivated",
        ))
        .into_string();

        assert!(prompt.contains(personality_clause(PersonalityMode::EncouragementSeeker)));
        assert!(prompt.contains(usage_stage_clause(UsageStage::New)));
        assert!(prompt.contains("Steps today: 2000"));
        assert!(prompt.contains("Exercise minutes today: 0"));
        assert!(prompt.contains("Sleep hours last night: 6"));
        assert!(prompt.ends_with("\"I feel unmotivated\""));
    }

    #[test]
    fn goal_finisher_experienced_without_faq() {
        let prompt = compose(&request(PersonalityMode::GoalFinisher, 10, "Plan my week"))
            .into_string();

        assert!(prompt.contains(personality_clause(PersonalityMode::GoalFinisher)));
        assert!(prompt.contains(usage_stage_clause(UsageStage::Experienced)));
        assert!(!prompt.contains(FAQ_HEADING));
    }

    #[test]
    fn stage_clause_follows_day_buckets() {
        let cases = [
            (0, UsageStage::New),
            (3, UsageStage::New),
            (4, UsageStage::Active),
            (8, UsageStage::Active),
            (9, UsageStage::Experienced),
            (100, UsageStage::Experienced),
        ];
        for (days, stage) in cases {
            let prompt = compose(&request(PersonalityMode::CreativeExplorer, days, "hi"));
            assert!(
                prompt.as_str().contains(usage_stage_clause(stage)),
                "day {days} should use {stage:?}"
            );
        }
    }

    #[test]
    fn personality_clauses_are_distinct() {
        let texts: Vec<&str> = PersonalityMode::ALL.into_iter().map(personality_clause).collect();
        assert_ne!(texts[0], texts[1]);
        assert_ne!(texts[1], texts[2]);
        assert_ne!(texts[0], texts[2]);
    }

    #[test]
    fn faq_entries_are_numbered() {
        let req = request(PersonalityMode::EncouragementSeeker, 2, "how do I start").with_faq_context(vec![
            FaqEntry::new("How long should workouts be?", "30–45 minutes."),
            FaqEntry::new("How do I build a workout habit?", "Start small."),
        ]);
        let prompt = compose(&req).into_string();

        assert!(prompt.contains("1. Q: How long should workouts be?\n   A: 30–45 minutes."));
        assert!(prompt.contains("2. Q: How do I build a workout habit?\n   A: Start small."));
    }

    #[test]
    fn fractional_metrics_render_verbatim() {
        let lifestyle = LifestyleSnapshot::new(12345.0, 22.5, 7.25).unwrap();
        let req = PromptRequest::new(PersonalityMode::GoalFinisher, 0, lifestyle, "hi");
        let prompt = compose(&req).into_string();
        assert!(prompt.contains("Steps today: 12345"));
        assert!(prompt.contains("Exercise minutes today: 22.5"));
        assert!(prompt.contains("Sleep hours last night: 7.25"));
    }

    #[test]
    fn user_message_is_not_altered() {
        let message = "  Line one\nline \"two\"  ";
        let prompt = compose(&request(PersonalityMode::GoalFinisher, 0, message));
        assert!(prompt.as_str().contains(&format!("\"{message}\"")));
    }
}
