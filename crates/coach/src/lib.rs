//! The coaching turn — everything between an inbound message and the reply.
//!
//! A turn runs in a fixed order:
//!
//! 1. **Screen** the raw message against the safety denylist
//! 2. **Enrich** with matching FAQ entries (optional stage)
//! 3. **Compose** the single system prompt
//! 4. **Call** the configured provider
//! 5. **Log** the user message and the reply
//!
//! Steps 1–3 are pure and synchronous; only 4 and 5 suspend.

pub mod faq;
pub mod pipeline;
pub mod prompt;

pub use faq::{FaqCatalog, MAX_FAQ_MATCHES, find_relevant};
pub use pipeline::{CoachPipeline, CoachReply, GENERIC_ERROR_REPLY, PreviewResult, TurnOutcome};
pub use prompt::compose;
