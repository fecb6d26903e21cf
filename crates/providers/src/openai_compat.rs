//! OpenAI-compatible provider implementation.
//!
//! Works with: Groq, OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any
//! endpoint exposing `/chat/completions`.
//!
//! Supports:
//! - Chat completions (non-streaming)
//! - Model listing and health checks

use async_trait::async_trait;
use nextyou_core::error::ProviderError;
use nextyou_core::message::{Message, Role};
use nextyou_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_client(DEFAULT_TIMEOUT),
        }
    }

    /// Replace the HTTP client with one using the given request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Create a Groq provider (convenience constructor).
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new("groq", "https://api.groq.com/openai/v1", api_key)
    }

    /// Create an Ollama provider (convenience constructor).
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
        )
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: Some(m.content.clone()),
            })
            .collect()
    }

    fn map_send_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

#[async_trait]
impl nextyou_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        parse_completion(api_response)
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let models = body["data"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|m| m["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Ok(response.status().is_success())
    }
}

/// Turn a decoded completion body into a `ProviderResponse`.
///
/// A body without choices, or whose first choice has no text, is treated as
/// malformed rather than as an empty reply.
fn parse_completion(api_response: ApiResponse) -> std::result::Result<ProviderResponse, ProviderError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ApiError {
            status_code: 200,
            message: "No choices in response".into(),
        })?;

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ProviderError::ApiError {
            status_code: 200,
            message: "Empty message content in response".into(),
        })?;

    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        role: Role::Assistant,
        content,
        timestamp: chrono::Utc::now(),
    };

    let usage = api_response.usage.map(|u| Usage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(ProviderResponse {
        message,
        usage,
        model: api_response.model,
    })
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextyou_core::Provider;

    #[test]
    fn groq_constructor() {
        let provider = OpenAiCompatProvider::groq("gsk-test");
        assert_eq!(provider.name(), "groq");
        assert!(provider.base_url.contains("api.groq.com"));
    }

    #[test]
    fn ollama_constructor() {
        let provider = OpenAiCompatProvider::ollama(None);
        assert_eq!(provider.name(), "ollama");
        assert!(provider.base_url.contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let provider = OpenAiCompatProvider::new("custom", "http://localhost:8000/v1/", "");
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn single_system_message_conversion() {
        let messages = vec![Message::system("You are an AI fitness companion")];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 1);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(
            api_messages[0].content.as_deref(),
            Some("You are an AI fitness companion")
        );
    }

    #[test]
    fn parse_completion_body() {
        let data = r#"{
            "model": "llama-3.1-8b-instant",
            "choices": [{"message": {"role": "assistant", "content": "- Take a short walk"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
        }"#;
        let api: ApiResponse = serde_json::from_str(data).unwrap();
        let response = parse_completion(api).unwrap();
        assert_eq!(response.message.content, "- Take a short walk");
        assert_eq!(response.message.role, Role::Assistant);
        assert_eq!(response.model, "llama-3.1-8b-instant");
        assert_eq!(response.usage.unwrap().total_tokens, 128);
    }

    #[test]
    fn parse_completion_without_choices_is_error() {
        let api: ApiResponse = serde_json::from_str(r#"{"model":"m","choices":[]}"#).unwrap();
        let err = parse_completion(api).unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status_code: 200, .. }));
    }

    /// Serve canned upstream answers on a random local port.
    ///
    /// `/{status}/chat/completions` answers with that status; `/ok/...`
    /// answers 200 with a real completion; `/slow/...` never answers in time.
    async fn stub_upstream() -> String {
        use axum::extract::Path;
        use axum::http::StatusCode;
        use axum::routing::{get, post};

        let app = axum::Router::new()
            .route(
                "/ok/chat/completions",
                post(|| async {
                    axum::Json(serde_json::json!({
                        "model": "llama-3.1-8b-instant",
                        "choices": [{"message": {"role": "assistant", "content": "- Walk 10 minutes"}}]
                    }))
                }),
            )
            .route(
                "/ok/models",
                get(|| async {
                    axum::Json(serde_json::json!({
                        "data": [{"id": "llama-3.1-8b-instant"}, {"id": "llama3-70b"}]
                    }))
                }),
            )
            .route(
                "/slow/chat/completions",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    StatusCode::OK
                }),
            )
            .route(
                "/{status}/chat/completions",
                post(|Path(status): Path<u16>| async move {
                    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::IM_A_TEAPOT);
                    (status, "upstream says no")
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "llama-3.1-8b-instant".into(),
            messages: vec![Message::system("You are an AI fitness companion")],
            temperature: 0.7,
            max_tokens: Some(64),
        }
    }

    async fn complete_against(base: &str, route: &str) -> std::result::Result<ProviderResponse, ProviderError> {
        OpenAiCompatProvider::new("stub", format!("{base}/{route}"), "key")
            .with_timeout(Duration::from_millis(300))
            .complete(request())
            .await
    }

    #[tokio::test]
    async fn upstream_status_codes_map_to_provider_errors() {
        let base = stub_upstream().await;

        let err = complete_against(&base, "429").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));

        let err = complete_against(&base, "401").await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));

        let err = complete_against(&base, "403").await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));

        match complete_against(&base, "500").await.unwrap_err() {
            ProviderError::ApiError { status_code, message } => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "upstream says no");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_completion_is_parsed() {
        let base = stub_upstream().await;

        let response = complete_against(&base, "ok").await.unwrap();
        assert_eq!(response.message.content, "- Walk 10 minutes");
        assert_eq!(response.model, "llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let base = stub_upstream().await;

        let err = complete_against(&base, "slow").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test]
    async fn models_are_listed() {
        let base = stub_upstream().await;
        let provider = OpenAiCompatProvider::new("stub", format!("{base}/ok"), "key");

        let models = provider.list_models().await.unwrap();
        assert_eq!(models, vec!["llama-3.1-8b-instant", "llama3-70b"]);
        assert!(provider.health_check().await.unwrap());

        let missing = OpenAiCompatProvider::new("stub", format!("{base}/500"), "key");
        assert!(missing.list_models().await.unwrap().is_empty());
    }

    #[test]
    fn parse_completion_with_null_content_is_error() {
        let data = r#"{"model":"m","choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let api: ApiResponse = serde_json::from_str(data).unwrap();
        assert!(parse_completion(api).is_err());
    }
}
