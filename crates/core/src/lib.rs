//! # NextYou Core
//!
//! Domain types, traits, and error definitions for the NextYou fitness coach.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators of a coaching turn (the language model and
//! the chat log) are defined as traits here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod chat_log;
pub mod coaching;

// Re-export key types at crate root for ergonomics
pub use error::{ChatLogError, Error, ProviderError, RequestError, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use chat_log::{ChatLog, ChatLogEntry};
pub use coaching::{
    ComposedPrompt, FaqEntry, LifestyleSnapshot, PersonalityMode, PromptRequest, UsageStage,
};
