//! The coaching turn: screen → enrich → compose → call → log.

use std::sync::Arc;
use nextyou_config::AppConfig;
use nextyou_core::chat_log::ChatLog;
use nextyou_core::coaching::{ComposedPrompt, PromptRequest};
use nextyou_core::error::Error;
use nextyou_core::message::{Message, Role};
use nextyou_core::provider::{Provider, ProviderRequest};
use nextyou_safety::{AuditEvent, AuditLogger, AuditOutcome, SafetyFilter, ScreenOutcome};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::faq::FaqCatalog;
use crate::prompt::compose;

/// Reply sent when the model call fails.
pub const GENERIC_ERROR_REPLY: &str = "Something went wrong while generating the response.";

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The model answered
    Answered,
    /// The safety filter refused the message
    Blocked,
    /// The model call failed; the generic apology was returned
    UpstreamFailure,
}

/// The result of one coaching turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachReply {
    pub reply: String,
    pub outcome: TurnOutcome,
}

/// What a turn would send, without sending it.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewResult {
    Blocked { keyword: String, reply: String },
    Composed(ComposedPrompt),
}

/// Runs coaching turns against one provider.
pub struct CoachPipeline {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Pre-call denylist
    filter: SafetyFilter,

    /// FAQ enrichment stage; `None` disables it
    faq: Option<FaqCatalog>,

    /// Where answered turns are recorded
    chat_log: Option<Arc<dyn ChatLog>>,

    /// Blocked and failed turns
    audit: Arc<AuditLogger>,
}

impl CoachPipeline {
    /// Create a pipeline with the default filter and the built-in FAQ catalog.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            filter: SafetyFilter::default(),
            faq: Some(FaqCatalog::builtin()),
            chat_log: None,
            audit: Arc::new(AuditLogger::tracing()),
        }
    }

    /// Build a pipeline from the loaded configuration.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        chat_log: Arc<dyn ChatLog>,
    ) -> Result<Self, Error> {
        let faq = if config.faq.enabled {
            Some(FaqCatalog::from_config(&config.faq)?)
        } else {
            None
        };

        Ok(Self::new(provider, nextyou_providers::default_model_for(config))
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_filter(SafetyFilter::from_config(&config.safety))
            .with_faq(faq)
            .with_chat_log(chat_log))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_filter(mut self, filter: SafetyFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the FAQ catalog, or `None` to turn the enrichment stage off.
    pub fn with_faq(mut self, faq: Option<FaqCatalog>) -> Self {
        self.faq = faq;
        self
    }

    pub fn with_chat_log(mut self, chat_log: Arc<dyn ChatLog>) -> Self {
        self.chat_log = Some(chat_log);
        self
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn faq_enabled(&self) -> bool {
        self.faq.is_some()
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn filter(&self) -> &SafetyFilter {
        &self.filter
    }

    /// Run one turn. Every failure mode is folded into the reply.
    pub async fn handle(&self, request: PromptRequest) -> CoachReply {
        if let Some(refusal) = self.screen_message(&request.user_message) {
            return refusal;
        }

        let request = self.enrich(request);
        let prompt = compose(&request);
        debug!(
            personality = %request.personality,
            stage = ?request.usage_stage(),
            faq_entries = request.faq_context.len(),
            prompt_len = prompt.as_str().len(),
            "Composed prompt"
        );

        let provider_request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(prompt.into_string())],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = match self.provider.complete(provider_request).await {
            Ok(response) => response,
            Err(e) => {
                error!(provider = self.provider.name(), "Model call failed: {e}");
                self.audit.log(
                    AuditEvent::UpstreamFailure {
                        provider: self.provider.name().to_string(),
                    },
                    AuditOutcome::Failure,
                    Some(e.to_string()),
                );
                return CoachReply {
                    reply: GENERIC_ERROR_REPLY.to_string(),
                    outcome: TurnOutcome::UpstreamFailure,
                };
            }
        };

        let reply = response.message.content;
        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model usage"
            );
        }

        self.record(&request.user_message, &reply).await;
        info!(provider = self.provider.name(), reply_len = reply.len(), "Turn answered");

        CoachReply {
            reply,
            outcome: TurnOutcome::Answered,
        }
    }

    /// Screen and compose without calling the model.
    ///
    /// A dry run: blocks are reported but never audited.
    pub fn preview(&self, request: PromptRequest) -> PreviewResult {
        match self.filter.screen(&request.user_message) {
            ScreenOutcome::Blocked { keyword, reply } => PreviewResult::Blocked { keyword, reply },
            ScreenOutcome::Allowed => PreviewResult::Composed(compose(&self.enrich(request))),
        }
    }

    /// Run the denylist on a raw message, before any other input is looked at.
    ///
    /// Returns the refusal turn when the message is blocked. Blocks are never
    /// written to the chat log, only warned and audited.
    pub fn screen_message(&self, message: &str) -> Option<CoachReply> {
        match self.filter.screen(message) {
            ScreenOutcome::Allowed => None,
            ScreenOutcome::Blocked { keyword, reply } => {
                warn!(keyword = %keyword, "Message blocked by safety filter");
                self.audit.log(
                    AuditEvent::MessageBlocked { keyword },
                    AuditOutcome::Denied,
                    None,
                );
                Some(CoachReply {
                    reply,
                    outcome: TurnOutcome::Blocked,
                })
            }
        }
    }

    /// Apply the FAQ stage. Caller-supplied context wins over catalog matches.
    fn enrich(&self, mut request: PromptRequest) -> PromptRequest {
        match &self.faq {
            Some(catalog) if request.faq_context.is_empty() => {
                request.faq_context = catalog.find_relevant(&request.user_message);
            }
            Some(_) => {}
            None => request.faq_context.clear(),
        }
        request
    }

    async fn record(&self, user_message: &str, reply: &str) {
        let Some(log) = &self.chat_log else {
            return;
        };

        if let Err(e) = log.append(Role::User, user_message).await {
            warn!(backend = log.name(), "Failed to log user message: {e}");
            return;
        }
        if let Err(e) = log.append(Role::Assistant, reply).await {
            warn!(backend = log.name(), "Failed to log assistant reply: {e}");
        }
    }
}
