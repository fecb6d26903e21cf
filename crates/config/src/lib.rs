//! Configuration loading, validation, and management for NextYou.
//!
//! Loads configuration from `~/.nextyou/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.nextyou/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// HTTP timeout for model calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Chat log configuration
    #[serde(default)]
    pub chat_log: ChatLogConfig,

    /// Safety filter configuration
    #[serde(default)]
    pub safety: SafetyConfig,

    /// FAQ enrichment configuration
    #[serde(default)]
    pub faq: FaqConfig,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_request_timeout_secs() -> u64 {
    60
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("providers", &self.providers)
            .field("gateway", &self.gateway)
            .field("chat_log", &self.chat_log)
            .field("safety", &self.safety)
            .field("faq", &self.faq)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS. `["*"]` allows any origin (the mobile app
    /// calls from arbitrary device origins).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLogConfig {
    /// "sqlite", "in_memory" or "none"
    #[serde(default = "default_chat_log_backend")]
    pub backend: String,

    /// SQLite database path; defaults to `~/.nextyou/chat.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Rows returned by the history view when no limit is given
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_chat_log_backend() -> String {
    "sqlite".into()
}
fn default_history_limit() -> usize {
    10
}

/// Upper bound for any history query.
pub const MAX_HISTORY_LIMIT: usize = 100;

impl Default for ChatLogConfig {
    fn default() -> Self {
        Self {
            backend: default_chat_log_backend(),
            path: None,
            history_limit: default_history_limit(),
        }
    }
}

impl ChatLogConfig {
    /// The SQLite path to open, falling back to the config directory.
    pub fn resolved_path(&self) -> String {
        self.path.clone().unwrap_or_else(|| {
            AppConfig::config_dir()
                .join("chat.db")
                .to_string_lossy()
                .into_owned()
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Replaces the built-in denylist when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_keywords: Option<Vec<String>>,

    /// Replaces the built-in refusal text when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqConfig {
    /// Whether the server looks up FAQ context when the caller sent none
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TOML file with `[[entries]]` tables; the built-in catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            catalog_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.nextyou/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `NEXTYOU_API_KEY` (highest priority)
    /// - `GROQ_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("NEXTYOU_API_KEY")
                .ok()
                .or_else(|| std::env::var("GROQ_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("NEXTYOU_PROVIDER") {
            self.default_provider = provider;
        }

        if let Ok(model) = std::env::var("NEXTYOU_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".nextyou")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.chat_log.history_limit == 0 || self.chat_log.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "chat_log.history_limit must be between 1 and {MAX_HISTORY_LIMIT}"
            )));
        }

        if !matches!(self.chat_log.backend.as_str(), "sqlite" | "in_memory" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "unknown chat_log.backend '{}' (expected sqlite, in_memory or none)",
                self.chat_log.backend
            )));
        }

        if let Some(keywords) = &self.safety.blocked_keywords {
            if keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigError::ValidationError(
                    "safety.blocked_keywords must contain at least one non-blank keyword".into(),
                ));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            providers: HashMap::new(),
            gateway: GatewayConfig::default(),
            chat_log: ChatLogConfig::default(),
            safety: SafetyConfig::default(),
            faq: FaqConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "groq");
        assert_eq!(config.default_model, "llama-3.1-8b-instant");
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.chat_log.history_limit, 10);
        assert!(config.faq.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.chat_log.backend, config.chat_log.backend);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_chat_log_backend_rejected() {
        let mut config = AppConfig::default();
        config.chat_log.backend = "mongodb".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn history_limit_bounds() {
        let mut config = AppConfig::default();
        config.chat_log.history_limit = 0;
        assert!(config.validate().is_err());
        config.chat_log.history_limit = MAX_HISTORY_LIMIT + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_keyword_list_rejected() {
        let mut config = AppConfig::default();
        config.safety.blocked_keywords = Some(vec!["  ".into()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.default_provider, "groq");
    }

    #[test]
    fn load_from_file_with_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "llama-3.3-70b-versatile"

[gateway]
port = 8080

[chat_log]
backend = "in_memory"
history_limit = 20

[safety]
blocked_keywords = ["injury", "steroid"]

[faq]
enabled = false
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "llama-3.3-70b-versatile");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.chat_log.backend, "in_memory");
        assert_eq!(config.chat_log.history_limit, 20);
        assert_eq!(
            config.safety.blocked_keywords,
            Some(vec!["injury".to_string(), "steroid".to_string()])
        );
        assert!(!config.faq.enabled);
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_temperature = \"hot\"").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let config = AppConfig {
            api_key: Some("gsk_secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("groq"));
        assert!(toml_str.contains("3000"));
    }

    #[test]
    fn chat_log_path_defaults_to_config_dir() {
        let config = ChatLogConfig::default();
        assert!(config.resolved_path().ends_with("chat.db"));
    }
}
