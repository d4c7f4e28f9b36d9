//! Constants Module - Single Source of Truth
//!
//! Endpoints, environment variable names and tuning defaults used across
//! the application. Other modules import from here instead of hardcoding.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "ContractLens";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = concat!("ContractLens/", env!("CARGO_PKG_VERSION"));

// ============================================
// EXPLORER CONSTANTS
// ============================================

/// Etherscan-compatible API for Sepolia
pub const DEFAULT_EXPLORER_API_URL: &str = "https://api-sepolia.etherscan.io/api";

/// Default timeout for explorer requests (seconds)
pub const DEFAULT_EXPLORER_TIMEOUT_SECS: u64 = 10;

/// Envelope status that signals success
pub const EXPLORER_STATUS_OK: &str = "1";

/// Explorer query values
pub const EXPLORER_MODULE_CONTRACT: &str = "contract";
pub const EXPLORER_ACTION_GET_ABI: &str = "getabi";
pub const EXPLORER_ACTION_GET_SOURCE: &str = "getsourcecode";

// ============================================
// GENERATION BACKEND CONSTANTS
// ============================================

/// OpenAI-compatible API root
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

/// Upper bound on generated tokens
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Low temperature: analysis should be repeatable
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Generation calls are slow; allow a full minute
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

// ============================================
// RETRY CONSTANTS
// ============================================

/// Single retry on transient network failures
pub const MAX_TRANSIENT_RETRIES: u32 = 1;

/// Base delay before the retry (milliseconds)
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Jitter added on top of the base delay (percent)
pub const RETRY_JITTER_PERCENT: u64 = 20;

// ============================================
// ENVIRONMENT VARIABLES
// ============================================

pub const ENV_ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";
pub const ENV_EXPLORER_API_URL: &str = "EXPLORER_API_URL";
pub const ENV_EXPLORER_TIMEOUT_SECS: &str = "EXPLORER_TIMEOUT_SECS";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_OPENAI_MAX_TOKENS: &str = "OPENAI_MAX_TOKENS";
pub const ENV_OPENAI_TEMPERATURE: &str = "OPENAI_TEMPERATURE";
pub const ENV_OPENAI_TIMEOUT_SECS: &str = "OPENAI_TIMEOUT_SECS";

/// Placeholder values that count as "not configured"
pub const PLACEHOLDER_API_KEYS: [&str; 3] = ["YOUR_API_KEY", "your_api_key", "changeme"];

/// Returns true when a configured key is empty or a template placeholder
pub fn is_placeholder_key(key: &str) -> bool {
    let trimmed = key.trim();
    trimmed.is_empty() || PLACEHOLDER_API_KEYS.contains(&trimmed)
}

// ============================================
// PROMPT CONSTANTS
// ============================================

/// Header marker emitted before every file of a flattened multi-file source
pub const FILE_MARKER_PREFIX: &str = "// File: ";

/// Separator between flattened files
pub const FILE_BLOCK_SEPARATOR: &str = "\n\n";

/// Number of fingerprint hex characters shown in logs
pub const FINGERPRINT_LOG_PREFIX_LEN: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_keys() {
        assert!(is_placeholder_key(""));
        assert!(is_placeholder_key("   "));
        assert!(is_placeholder_key("YOUR_API_KEY"));
        assert!(!is_placeholder_key("ABCDEF123456"));
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.ends_with(APP_VERSION));
    }
}
