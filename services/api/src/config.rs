//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

const DEFAULT_EXTRA_ORIGINS: &str = "https://styloai-b4r2.vercel.app";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    pub ai_timeout: Duration,
    /// Origins allowed by CORS; the frontend URL comes first.
    pub allowed_origins: Vec<String>,
    /// Accept `mock-token-<uid>` bearer tokens. Never enable in production.
    pub allow_mock_tokens: bool,
    pub firebase_api_key: Option<String>,
    pub chat_history_limit: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server and Database Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:8000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- AI Gateway Settings ---
        let openrouter_api_key = lookup("OPENROUTER_API_KEY").filter(|k| !k.trim().is_empty());
        let openrouter_model = var_or("OPENROUTER_MODEL", "openai/gpt-3.5-turbo");
        let openrouter_base_url = var_or("OPENROUTER_BASE_URL", "https://openrouter.ai/api/v1");
        let timeout_str = var_or("AI_TIMEOUT_SECS", "30");
        let ai_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue("AI_TIMEOUT_SECS".to_string(), e.to_string()))?;

        // --- CORS and Auth Settings ---
        let mut allowed_origins = vec![var_or("FRONTEND_URL", "http://localhost:3000")];
        allowed_origins.extend(
            var_or("CORS_EXTRA_ORIGINS", DEFAULT_EXTRA_ORIGINS)
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string),
        );

        let allow_mock_tokens = var_or("ALLOW_MOCK_TOKENS", "false").trim().eq_ignore_ascii_case("true");
        let firebase_api_key = lookup("FIREBASE_API_KEY").filter(|k| !k.trim().is_empty());

        let history_str = var_or("CHAT_HISTORY_LIMIT", "10");
        let chat_history_limit = history_str.parse::<usize>().map_err(|e| {
            ConfigError::InvalidValue("CHAT_HISTORY_LIMIT".to_string(), e.to_string())
        })?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openrouter_api_key,
            openrouter_model,
            openrouter_base_url,
            ai_timeout,
            allowed_origins,
            allow_mock_tokens,
            firebase_api_key,
            chat_history_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/stylo")]).unwrap();
        assert_eq!(config.bind_address.port(), 8000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.openrouter_model, "openai/gpt-3.5-turbo");
        assert_eq!(config.ai_timeout, Duration::from_secs(30));
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000".to_string(), DEFAULT_EXTRA_ORIGINS.to_string()]
        );
        assert!(!config.allow_mock_tokens);
        assert!(config.openrouter_api_key.is_none());
        assert_eq!(config.chat_history_limit, 10);
    }

    #[test]
    fn missing_database_url_is_reported() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "DATABASE_URL"));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = load(&[("DATABASE_URL", "x"), ("AI_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "AI_TIMEOUT_SECS"));

        let err = load(&[("DATABASE_URL", "x"), ("BIND_ADDRESS", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "BIND_ADDRESS"));
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            ("DATABASE_URL", "x"),
            ("ALLOW_MOCK_TOKENS", "TRUE"),
            ("FRONTEND_URL", "https://app.example"),
            ("CORS_EXTRA_ORIGINS", " https://a.example, ,https://b.example "),
            ("OPENROUTER_API_KEY", "sk-or"),
            ("CHAT_HISTORY_LIMIT", "4"),
        ])
        .unwrap();
        assert!(config.allow_mock_tokens);
        assert_eq!(
            config.allowed_origins,
            vec!["https://app.example", "https://a.example", "https://b.example"]
        );
        assert_eq!(config.openrouter_api_key.as_deref(), Some("sk-or"));
        assert_eq!(config.chat_history_limit, 4);
    }
}
