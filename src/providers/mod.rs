//! Providers Module - External Data Sources
//!
//! Data paths: block explorer (ABI + source) and the text generation backend.
//! The orchestrator only sees the two traits below, so either side can be
//! swapped for an in-memory fake in tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::models::errors::AppResult;

pub mod explorer;
pub mod http;
pub mod openai;

pub use explorer::*;
pub use openai::{ChatMessage, ChatRole, OpenAiClient};

/// Resolves contract artifacts for an address.
/// Failures are absorbed: implementations return `None` and log the reason.
#[async_trait]
pub trait ContractSource: Send + Sync {
    async fn fetch_abi(&self, address: &str) -> Option<Value>;
    async fn fetch_source_code(&self, address: &str) -> Option<String>;
}

/// Single chat-style completion call
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String>;
}
