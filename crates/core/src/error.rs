//! Error types for the NextYou domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all NextYou operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Chat log errors ---
    #[error("Chat log error: {0}")]
    ChatLog(#[from] ChatLogError),

    // --- Inbound request errors ---
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ChatLogError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// A malformed inbound coaching request.
///
/// Raised while turning a transport payload into a `PromptRequest`, never
/// by the composer itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unknown personality `{0}` (expected ENCOURAGEMENT_SEEKER, CREATIVE_EXPLORER or GOAL_FINISHER)")]
    UnknownPersonality(String),

    #[error("`{field}` must be a non-negative number, got {value}")]
    InvalidMetric { field: &'static str, value: f64 },

    #[error("`daysUsingApp` must be a non-negative number, got {0}")]
    InvalidDays(f64),

    #[error("malformed body: {0}")]
    InvalidBody(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn request_error_names_the_field() {
        let err = Error::Request(RequestError::MissingField("lifestyle"));
        assert!(err.to_string().contains("lifestyle"));

        let err = RequestError::InvalidMetric {
            field: "sleepHours",
            value: -2.0,
        };
        assert!(err.to_string().contains("sleepHours"));
        assert!(err.to_string().contains("-2"));
    }
}
