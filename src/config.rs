//! # Configuration Module
//!
//! This module defines configuration structures for the growth engine,
//! including the data directory, the AI provider selection and the recovery
//! settings used around AI calls. Values come from the environment (and an
//! optional `.env` file loaded by the binary).

use anyhow::{bail, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;

// Environment variable names
pub const DATA_DIR_ENV: &str = "GROWTH_DATA_DIR";
pub const AI_PROVIDER_ENV: &str = "GROWTH_AI_PROVIDER";
pub const AI_MODEL_ENV: &str = "GROWTH_AI_MODEL";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_DATA_DIR: &str = ".";

/// Recovery configuration for error handling around AI calls
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single AI call in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000,  // 1 second
            max_retry_delay_ms: 10000,  // 10 seconds
            operation_timeout_secs: 30, // 30 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Which AI service backs transcription and workout parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenAi,
}

impl AiProvider {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "gemini" | "google" => Ok(AiProvider::Gemini),
            "openai" | "open_ai" | "whisper" => Ok(AiProvider::OpenAi),
            other => bail!("Unknown AI provider '{other}' (expected 'gemini' or 'openai')"),
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            AiProvider::Gemini => GEMINI_API_KEY_ENV,
            AiProvider::OpenAi => OPENAI_API_KEY_ENV,
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiProvider::Gemini => write!(f, "gemini"),
            AiProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// AI backend settings
#[derive(Clone, Default)]
pub struct AiConfig {
    pub provider: AiProvider,
    /// `None` when the key is not configured; backends refuse to call out without it
    pub api_key: Option<String>,
    /// Overrides the provider's default model
    pub model: Option<String>,
    pub recovery: RecoveryConfig,
}

// Keep the API key out of debug logs
impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("recovery", &self.recovery)
            .finish()
    }
}

/// Configuration structure for the whole application
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the CSV tables
    pub data_dir: PathBuf,
    pub ai: AiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            ai: AiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = non_empty(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let provider = match non_empty(AI_PROVIDER_ENV) {
            Some(value) => AiProvider::parse(&value)?,
            None => AiProvider::default(),
        };

        Ok(Self {
            data_dir,
            ai: AiConfig {
                provider,
                api_key: non_empty(provider.api_key_env()),
                model: non_empty(AI_MODEL_ENV),
                recovery: RecoveryConfig::default(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.ai.provider, AiProvider::Gemini);
        assert!(config.ai.api_key.is_none());
        assert!(config.ai.model.is_none());
    }

    #[test]
    fn test_provider_selects_key() {
        let config = AppConfig::from_lookup(lookup(&[
            (AI_PROVIDER_ENV, "OpenAI"),
            (GEMINI_API_KEY_ENV, "gemini-key"),
            (OPENAI_API_KEY_ENV, "openai-key"),
            (DATA_DIR_ENV, "/tmp/growth"),
        ]))
        .unwrap();
        assert_eq!(config.ai.provider, AiProvider::OpenAi);
        assert_eq!(config.ai.api_key.as_deref(), Some("openai-key"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/growth"));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = AppConfig::from_lookup(lookup(&[(GEMINI_API_KEY_ENV, "  ")])).unwrap();
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn test_unknown_provider() {
        assert!(AppConfig::from_lookup(lookup(&[(AI_PROVIDER_ENV, "clippy")])).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AiConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_recovery_defaults_are_reasonable() {
        let recovery = RecoveryConfig::default();
        assert!(recovery.max_retries <= 10);
        assert!(recovery.base_retry_delay_ms >= 100);
        assert!(recovery.base_retry_delay_ms <= recovery.max_retry_delay_ms);
        assert!(recovery.circuit_breaker_threshold > 0);
    }
}
