//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which structured-output backend the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisProvider {
    Gemini,
    OpenAi,
}

impl AnalysisProvider {
    fn default_model(&self) -> &'static str {
        match self {
            AnalysisProvider::Gemini => "gemini-3-flash-preview",
            AnalysisProvider::OpenAi => "gpt-4o-mini",
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub provider: AnalysisProvider,
    /// The credential for `provider`. Guaranteed present once loading succeeds.
    pub api_key: String,
    pub analysis_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
    pub refresh_on_start: bool,
    pub allowed_origin: String,
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

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin =
            lookup("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        let refresh_on_start = match lookup("REFRESH_ON_START") {
            None => true,
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "REFRESH_ON_START".to_string(),
                    format!("'{}' is not a boolean", value),
                )
            })?,
        };

        // --- Analysis Backend Settings ---
        let provider = match lookup("ANALYSIS_PROVIDER")
            .unwrap_or_else(|| "gemini".to_string())
            .to_lowercase()
            .as_str()
        {
            "gemini" => AnalysisProvider::Gemini,
            "openai" => AnalysisProvider::OpenAi,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ANALYSIS_PROVIDER".to_string(),
                    format!("'{}' is not one of: gemini, openai", other),
                ))
            }
        };

        // The credential is a hard precondition: without it no analysis can run.
        let api_key = match provider {
            AnalysisProvider::Gemini => non_blank(lookup("GEMINI_API_KEY"))
                .or_else(|| non_blank(lookup("API_KEY")))
                .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?,
            AnalysisProvider::OpenAi => non_blank(lookup("OPENAI_API_KEY"))
                .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?,
        };

        let analysis_model =
            lookup("ANALYSIS_MODEL").unwrap_or_else(|| provider.default_model().to_string());
        let gemini_base_url = lookup("GEMINI_BASE_URL")
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());

        let timeout_str = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "60".to_string());
        let request_timeout = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "REQUEST_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        Ok(Self {
            bind_address,
            log_level,
            provider,
            api_key,
            analysis_model,
            gemini_base_url,
            request_timeout,
            refresh_on_start,
            allowed_origin,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_gemini_with_flash_model() {
        let config = load(&[("GEMINI_API_KEY", "secret")]).unwrap();

        assert_eq!(config.provider, AnalysisProvider::Gemini);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.analysis_model, "gemini-3-flash-preview");
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.refresh_on_start);
    }

    #[test]
    fn missing_credential_is_fatal() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "GEMINI_API_KEY"));

        let err = load(&[("ANALYSIS_PROVIDER", "openai"), ("GEMINI_API_KEY", "x")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "OPENAI_API_KEY"));

        let err = load(&[("GEMINI_API_KEY", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
    }

    #[test]
    fn legacy_api_key_variable_is_accepted() {
        let config = load(&[("API_KEY", "legacy")]).unwrap();
        assert_eq!(config.api_key, "legacy");
    }

    #[test]
    fn blank_gemini_key_falls_back_to_legacy_variable() {
        let config = load(&[("GEMINI_API_KEY", ""), ("API_KEY", "real")]).unwrap();
        assert_eq!(config.api_key, "real");
    }

    #[test]
    fn openai_provider_uses_its_own_defaults() {
        let config = load(&[("ANALYSIS_PROVIDER", "OpenAI"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.provider, AnalysisProvider::OpenAi);
        assert_eq!(config.analysis_model, "gpt-4o-mini");
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = load(&[("GEMINI_API_KEY", "k"), ("REQUEST_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "REQUEST_TIMEOUT_SECS"));

        let err = load(&[("GEMINI_API_KEY", "k"), ("ANALYSIS_PROVIDER", "llama")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "ANALYSIS_PROVIDER"));

        let err = load(&[("GEMINI_API_KEY", "k"), ("REFRESH_ON_START", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "REFRESH_ON_START"));
    }
}
