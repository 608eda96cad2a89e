//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The loaded [`Config`] is handed to the server state explicitly; nothing reads
//! it through a global.

use lib_utils::{get_env, get_env_or, get_env_parse_or};

/// Default OpenAI-compatible chat completions endpoint used by the AI proxy.
pub const DEFAULT_AI_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model requested from the completion provider.
pub const DEFAULT_AI_MODEL: &str = "openai/gpt-oss-20b:free";

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// JWT token validity period in hours
    ///
    /// Valid range: 1-720 hours (1 hour to 30 days)
    pub jwt_expiration_hours: i64,

    /// Push undelivered messages to a user as soon as their connection is attached.
    pub flush_backlog_on_connect: bool,

    /// Number of other users offered when a user has no conversations yet (0 disables).
    pub discovery_limit: i64,

    /// Completion provider settings for the AI proxy route.
    pub ai: AiConfig,
}

/// Settings for the AI-completion proxy.
#[derive(Clone, Debug)]
pub struct AiConfig {
    pub api_url: String,
    /// Absent key disables the proxy (requests get 502).
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_AI_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_AI_MODEL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = get_env_or("DATABASE_URL", "sqlite:data/chat.db");

        let jwt_secret = get_env("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set in environment")?;

        let jwt_expiration_hours = get_env_parse_or("JWT_EXPIRATION_HOURS", 24i64)
            .map_err(|_| "JWT_EXPIRATION_HOURS must be a valid number".to_string())?;

        let flush_backlog_on_connect = get_env_parse_or("CHAT_FLUSH_BACKLOG", true)
            .map_err(|_| "CHAT_FLUSH_BACKLOG must be true or false".to_string())?;

        let discovery_limit = get_env_parse_or("CHAT_DISCOVERY_LIMIT", 10i64)
            .map_err(|_| "CHAT_DISCOVERY_LIMIT must be a valid number".to_string())?;

        let ai = AiConfig {
            api_url: get_env_or("AI_API_URL", DEFAULT_AI_API_URL),
            api_key: get_env("AI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: get_env_or("AI_MODEL", DEFAULT_AI_MODEL),
            timeout_secs: get_env_parse_or("AI_TIMEOUT_SECS", 30u64)
                .map_err(|_| "AI_TIMEOUT_SECS must be a valid number".to_string())?,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            flush_backlog_on_connect,
            discovery_limit,
            ai,
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err("JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string());
        }

        if self.discovery_limit < 0 {
            return Err("CHAT_DISCOVERY_LIMIT must not be negative".to_string());
        }

        if self.ai.timeout_secs == 0 {
            return Err("AI_TIMEOUT_SECS must be at least 1".to_string());
        }

        Ok(())
    }
}
