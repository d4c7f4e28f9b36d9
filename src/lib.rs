//! Contract Lens Library
//!
//! Explains deployed smart contracts in plain English:
//! - Resolves verified source and ABI from an Etherscan-compatible explorer
//! - Flattens Standard JSON Input (including double-encoded payloads)
//! - Falls back to an ABI-only analysis when source is unavailable
//! - Appends fixed safety guardrails to every generation prompt

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    normalize, normalize_source, parse_source, AnalysisRequestBuilder, ContractAnalyzer,
    ExplanationGenerator, GeneratedExplanation, SourceShape, validate_input, GUARDRAIL_CLAUSE,
    GUARDRAIL_DELIMITER, SYSTEM_PROMPT,
};
pub use models::{
    AnalysisPrompt, AnalysisResult, AnalysisState, AppConfig, AppError, AppResult,
    ContractInput, ErrorCode, ExplorerArtifact, ExplorerConfig, GenerationConfig,
    NormalizedSource, PromptTemplate, SourceFile,
};
pub use providers::{ChatMessage, ChatRole, ContractSource, ExplorerClient, OpenAiClient, TextGenerator};
pub use utils::{checksum_address, fingerprint, is_valid_address};
