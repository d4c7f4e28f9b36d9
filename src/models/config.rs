//! Configuration module
//!
//! Loaded once at start-up and shared read-only (behind `Arc`) for the
//! lifetime of the process. API keys are never logged.

use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    is_placeholder_key, DEFAULT_EXPLORER_API_URL, DEFAULT_EXPLORER_TIMEOUT_SECS,
    DEFAULT_GENERATION_BASE_URL, DEFAULT_GENERATION_MODEL, DEFAULT_GENERATION_TIMEOUT_SECS,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, ENV_ETHERSCAN_API_KEY, ENV_EXPLORER_API_URL,
    ENV_EXPLORER_TIMEOUT_SECS, ENV_OPENAI_API_KEY, ENV_OPENAI_BASE_URL, ENV_OPENAI_MAX_TOKENS,
    ENV_OPENAI_MODEL, ENV_OPENAI_TEMPERATURE, ENV_OPENAI_TIMEOUT_SECS,
};

/// Block explorer settings
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Etherscan-compatible API endpoint
    pub api_url: String,
    /// API key; `None` degrades to unauthenticated (rate-limited) requests
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_EXPLORER_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_EXPLORER_TIMEOUT_SECS),
        }
    }
}

/// Text generation backend settings
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// OpenAI-compatible API root (without `/chat/completions`)
    pub base_url: String,
    /// Bearer token; required to build the HTTP generator
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_GENERATION_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        }
    }
}

/// Process-wide configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub explorer: ExplorerConfig,
    pub generation: GenerationConfig,
}

impl AppConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    /// `from_env` delegates here; tests pass a map instead of mutating the environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explorer_key = api_key(&lookup, ENV_ETHERSCAN_API_KEY);
        if explorer_key.is_none() {
            warn!(
                "⚠️ {} not set. Explorer lookups may be rate limited or refused",
                ENV_ETHERSCAN_API_KEY
            );
        } else {
            info!("🔑 {} configured (key hidden)", ENV_ETHERSCAN_API_KEY);
        }

        let generation_key = api_key(&lookup, ENV_OPENAI_API_KEY);
        if generation_key.is_some() {
            info!("🔑 {} configured (key hidden)", ENV_OPENAI_API_KEY);
        }

        let explorer = ExplorerConfig {
            api_url: lookup(ENV_EXPLORER_API_URL)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EXPLORER_API_URL.to_string()),
            api_key: explorer_key,
            timeout: Duration::from_secs(parse_or(
                &lookup,
                ENV_EXPLORER_TIMEOUT_SECS,
                DEFAULT_EXPLORER_TIMEOUT_SECS,
            )?),
        };

        let temperature: f32 = parse_or(&lookup, ENV_OPENAI_TEMPERATURE, DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::invalid_config(
                ENV_OPENAI_TEMPERATURE,
                &temperature.to_string(),
            ));
        }

        let max_tokens: u32 = parse_or(&lookup, ENV_OPENAI_MAX_TOKENS, DEFAULT_MAX_TOKENS)?;
        if max_tokens == 0 {
            return Err(AppError::invalid_config(ENV_OPENAI_MAX_TOKENS, "0"));
        }

        let generation = GenerationConfig {
            base_url: lookup(ENV_OPENAI_BASE_URL)
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GENERATION_BASE_URL.to_string()),
            api_key: generation_key,
            model: lookup(ENV_OPENAI_MODEL)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
            max_tokens,
            temperature,
            timeout: Duration::from_secs(parse_or(
                &lookup,
                ENV_OPENAI_TIMEOUT_SECS,
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )?),
        };

        Ok(Self {
            explorer,
            generation,
        })
    }
}

fn api_key<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|k| !is_placeholder_key(k))
        .map(|k| k.trim().to_string())
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_config(name, &raw)),
        _ => Ok(default),
    }
}
