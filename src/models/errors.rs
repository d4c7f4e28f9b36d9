//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so log lines and CLI output
//! can be matched to a cause without reading a backtrace.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ADDRESS_xxx / SOURCE_xxx: input errors
//! - EXPLORER_xxx: block explorer errors (absorbed, never terminal)
//! - GENERATION_xxx: text generation backend errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Input Errors
    // ============================================
    /// Address failed format or checksum validation (no network call made)
    InvalidAddress,
    /// Neither ABI nor usable source could be resolved
    NoDataFound,
    /// Source payload was not in the expected shape
    MalformedSource,

    // ============================================
    // External Service Errors
    // ============================================
    /// Block explorer unreachable or returned an error envelope
    ExplorerUnavailable,
    /// Generation backend failed or returned nothing usable
    GenerationFailed,
    /// External service timeout
    ExternalTimeout,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Missing API key
    ConfigMissingApiKey,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAddress => "ADDRESS_INVALID",
            Self::NoDataFound => "SOURCE_NO_DATA_FOUND",
            Self::MalformedSource => "SOURCE_MALFORMED",

            Self::ExplorerUnavailable => "EXPLORER_UNAVAILABLE",
            Self::GenerationFailed => "GENERATION_FAILED",
            Self::ExternalTimeout => "EXTERNAL_TIMEOUT",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigMissingApiKey => "CFG_MISSING_API_KEY",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Address rejected before any network call
    pub fn invalid_address(address: &str) -> Self {
        Self::new(
            ErrorCode::InvalidAddress,
            format!(
                "'{}' is not a valid contract address (expected 0x followed by 40 hex characters with a valid checksum)",
                address
            ),
        )
    }

    /// Nothing to analyze
    pub fn no_data_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoDataFound, msg)
    }

    /// Explorer failure (absorbed by callers)
    pub fn explorer_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExplorerUnavailable, msg)
    }

    /// Generation backend failure
    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::GenerationFailed, msg)
    }

    /// Missing API key
    pub fn missing_api_key(key_name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingApiKey,
            format!("Missing API key: {}", key_name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(key_name: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: '{}'", key_name, value),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;
