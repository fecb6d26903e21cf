//! LLM Provider implementations for NextYou.
//!
//! All providers implement the `nextyou_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config, default_model_for, requires_api_key};
