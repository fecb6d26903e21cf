//! HTTP API gateway for the NextYou coach.
//!
//! Exposes the chat endpoint used by the mobile app, the recent-history
//! view, and a health check.
//!
//! Built on Axum.

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Query};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

use nextyou_coach::{CoachPipeline, TurnOutcome};
use nextyou_config::{AppConfig, GatewayConfig, MAX_HISTORY_LIMIT};
use nextyou_core::chat_log::ChatLog;
use nextyou_core::coaching::{FaqEntry, LifestyleSnapshot, PersonalityMode, PromptRequest};
use nextyou_core::error::{Error, RequestError};

/// Body returned by `/history` when the chat log cannot be read.
pub const HISTORY_ERROR: &str = "Failed to fetch chat history";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: Arc<CoachPipeline>,
    pub chat_log: Arc<dyn ChatLog>,
    /// Rows returned by `/history` when no `limit` is given
    pub history_limit: usize,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Request body size limit
/// - CORS from `gateway.allowed_origins`
/// - HTTP trace logging
pub fn build_router(state: SharedState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/history", get(history_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors_layer(&config.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    if allowed_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let router = nextyou_providers::build_from_config(&config);
    let provider = router.default().ok_or_else(|| Error::Config {
        message: format!("Provider '{}' is not available", config.default_provider),
    })?;
    let chat_log = nextyou_chatlog::open_from_config(&config.chat_log).await?;
    let pipeline = CoachPipeline::from_config(&config, provider, chat_log.clone())?;

    let state = Arc::new(GatewayState {
        pipeline: Arc::new(pipeline),
        chat_log,
        history_limit: config.chat_log.history_limit,
    });
    let app = build_router(state, &config.gateway);

    info!(
        addr = %addr,
        provider = %config.default_provider,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Request bodies ---

/// Inbound `/chat` payload, as sent by the app.
///
/// Every field is optional at the serde level so a missing one surfaces as a
/// `RequestError::MissingField` naming it, not a generic parse failure.
/// `daysUsingApp` is any non-negative number; fractions are floored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub message: Option<String>,
    pub personality: Option<String>,
    pub days_using_app: Option<f64>,
    pub lifestyle: Option<LifestyleBody>,
    pub faq_context: Option<Vec<FaqEntry>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleBody {
    pub steps: Option<f64>,
    pub exercise_minutes: Option<f64>,
    pub sleep_hours: Option<f64>,
}

impl ChatRequestBody {
    /// Validate into a composable request.
    pub fn into_prompt_request(self) -> Result<PromptRequest, RequestError> {
        let message = self.message.ok_or(RequestError::MissingField("message"))?;
        let personality: PersonalityMode = self
            .personality
            .ok_or(RequestError::MissingField("personality"))?
            .parse()?;

        let days = self
            .days_using_app
            .ok_or(RequestError::MissingField("daysUsingApp"))?;
        if !(days >= 0.0 && days.is_finite()) {
            return Err(RequestError::InvalidDays(days));
        }
        // Float-to-int casts saturate, so huge tenures land in the top bucket.
        let days = days.floor() as u32;

        let lifestyle = self.lifestyle.ok_or(RequestError::MissingField("lifestyle"))?;
        let lifestyle = LifestyleSnapshot::new(
            lifestyle.steps.ok_or(RequestError::MissingField("lifestyle.steps"))?,
            lifestyle
                .exercise_minutes
                .ok_or(RequestError::MissingField("lifestyle.exerciseMinutes"))?,
            lifestyle
                .sleep_hours
                .ok_or(RequestError::MissingField("lifestyle.sleepHours"))?,
        )?;

        Ok(PromptRequest::new(personality, days, lifestyle, message)
            .with_faq_context(self.faq_context.unwrap_or_default()))
    }
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            let e = RequestError::InvalidBody(rejection.body_text());
            warn!(error = %e, "Rejected chat request");
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
        }
    };

    // The denylist sees the message before any other field is validated.
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        if let Some(refusal) = state.pipeline.screen_message(message) {
            return Json(ChatResponse { reply: refusal.reply }).into_response();
        }
    }

    let request = serde_json::from_value::<ChatRequestBody>(body)
        .map_err(|e| RequestError::InvalidBody(e.to_string()))
        .and_then(ChatRequestBody::into_prompt_request);
    let request = match request {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected chat request");
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
        }
    };

    info!(
        personality = %request.personality,
        days_using_app = request.days_using_app,
        message_len = request.user_message.len(),
        "Chat request received"
    );

    let reply = state.pipeline.handle(request).await;
    let status = match reply.outcome {
        TurnOutcome::Answered | TurnOutcome::Blocked => StatusCode::OK,
        TurnOutcome::UpstreamFailure => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ChatResponse { reply: reply.reply })).into_response()
}

async fn history_handler(
    State(state): State<SharedState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(state.history_limit)
        .clamp(1, MAX_HISTORY_LIMIT);

    match state.chat_log.recent(limit).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read chat history");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, HISTORY_ERROR)
        }
    }
}
