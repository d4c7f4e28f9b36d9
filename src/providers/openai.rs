//! Chat Completion Client (OpenAI-compatible API)
//!
//! Request:  `POST {base_url}/chat/completions`
//!           `{model, messages: [{role, content}], max_tokens, temperature}`
//! Response: `choices[0].message.content`
//!
//! Any non-2xx status, unreadable body or missing content is a
//! `GenerationFailed` error. Nothing is turned into an empty string.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{build_client, send_with_retry};
use super::TextGenerator;
use crate::models::config::GenerationConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::ENV_OPENAI_API_KEY;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// HTTP client for an OpenAI-compatible chat completion endpoint
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiClient {
    /// Requires an API key; a missing key is reported before any request is made
    pub fn new(config: &GenerationConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::missing_api_key(ENV_OPENAI_API_KEY))?;

        Ok(Self {
            client: build_client(config.timeout)?,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            "🤖 Generation request: model={} max_tokens={} temperature={}",
            self.model, self.max_tokens, self.temperature
        );

        let response = send_with_retry("generation", || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&payload)
        })
        .await
        .map_err(|e| {
            let reason = if e.is_timeout() {
                "generation backend timed out"
            } else if e.is_connect() {
                "generation backend unreachable"
            } else {
                "generation request failed"
            };
            AppError::with_source(ErrorCode::GenerationFailed, reason, e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::with_source(
                ErrorCode::GenerationFailed,
                "failed to read generation response",
                e,
            )
        })?;

        if !status.is_success() {
            return Err(AppError::generation_failed(describe_http_failure(status, &body)));
        }

        extract_content(&body)
    }
}

/// Pull `choices[0].message.content` out of a response body
fn extract_content(body: &str) -> AppResult<String> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        AppError::with_source(
            ErrorCode::GenerationFailed,
            "malformed generation response",
            e,
        )
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| AppError::generation_failed("generation response contained no message content"))
}

fn describe_http_failure(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication rejected",
        StatusCode::TOO_MANY_REQUESTS => "quota or rate limit exceeded",
        s if s.is_server_error() => "backend error",
        _ => "request rejected",
    };

    format!("{} (HTTP {}): {}", kind, status.as_u16(), detail)
}
