//! Block Explorer Client (Etherscan-compatible API)
//!
//! ✅ USED FOR:
//! - Verified ABI (`module=contract&action=getabi`)
//! - Verified source code (`module=contract&action=getsourcecode`)
//!
//! Envelope: `{"status": "1"|"0", "message": "...", "result": ...}`.
//! Only `status == "1"` is success. Every failure (network, timeout, error
//! envelope, malformed JSON, missing key) comes back as `None` with a
//! warning: the orchestrator has a fallback for either field missing.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::http::{build_client, send_with_retry};
use super::ContractSource;
use crate::models::config::ExplorerConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    EXPLORER_ACTION_GET_ABI, EXPLORER_ACTION_GET_SOURCE, EXPLORER_MODULE_CONTRACT,
    EXPLORER_STATUS_OK,
};

/// Response envelope shared by all explorer actions
#[derive(Debug, Deserialize)]
pub struct ExplorerEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Value,
}

impl ExplorerEnvelope {
    fn is_ok(&self) -> bool {
        self.status == EXPLORER_STATUS_OK
    }

    /// Error text: `result` carries the reason on failure, `message` is usually just "NOTOK"
    fn error_reason(&self) -> String {
        match &self.result {
            Value::String(reason) if !reason.is_empty() => reason.clone(),
            _ => self
                .message
                .clone()
                .unwrap_or_else(|| format!("status {}", self.status)),
        }
    }
}

/// One entry of the `getsourcecode` result array
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceCodeEntry {
    #[serde(default)]
    pub source_code: String,
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub compiler_version: Option<String>,
}

/// Explorer API client
pub struct ExplorerClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl ExplorerClient {
    pub fn new(config: &ExplorerConfig) -> AppResult<Self> {
        if config.api_key.is_none() {
            warn!("⚠️ Explorer API key not set. Some features may be limited.");
        }

        Ok(Self {
            client: build_client(config.timeout)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Fetch the verified ABI. `None` on any failure.
    pub async fn fetch_abi(&self, address: &str) -> Option<Value> {
        let result = match self.query(EXPLORER_ACTION_GET_ABI, address).await {
            Ok(envelope) => parse_abi(envelope),
            Err(e) => Err(e),
        };

        match result {
            Ok(abi) => {
                let entries = abi.as_array().map(Vec::len).unwrap_or(0);
                info!("📜 Explorer: ABI for {} ({} entries)", address, entries);
                Some(abi)
            }
            Err(e) => {
                warn!("⚠️ Error fetching ABI for {}: {}", address, e);
                None
            }
        }
    }

    /// Fetch the verified `SourceCode` payload as-is. `None` on any failure
    /// or when the contract is not verified (empty source).
    pub async fn fetch_source_code(&self, address: &str) -> Option<String> {
        let result = match self.query(EXPLORER_ACTION_GET_SOURCE, address).await {
            Ok(envelope) => parse_source_code(envelope),
            Err(e) => Err(e),
        };

        match result {
            Ok(entry) => {
                info!(
                    "📜 Explorer: source for {} ({}, {}, {} bytes)",
                    address,
                    entry.contract_name.as_deref().unwrap_or("unnamed"),
                    entry.compiler_version.as_deref().unwrap_or("unknown compiler"),
                    entry.source_code.len()
                );
                Some(entry.source_code)
            }
            Err(e) => {
                warn!("⚠️ Error fetching source code for {}: {}", address, e);
                None
            }
        }
    }

    /// Issue one GET and decode the envelope
    async fn query(&self, action: &str, address: &str) -> AppResult<ExplorerEnvelope> {
        debug!("🔍 Explorer: {} {}", action, address);

        let mut params: Vec<(&str, &str)> = vec![
            ("module", EXPLORER_MODULE_CONTRACT),
            ("action", action),
            ("address", address),
        ];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("apikey", key));
        }

        let response = send_with_retry("explorer", || {
            self.client.get(&self.api_url).query(&params)
        })
        .await
        .map_err(|e| {
            let code = if e.is_timeout() {
                ErrorCode::ExternalTimeout
            } else {
                ErrorCode::ExplorerUnavailable
            };
            AppError::with_source(code, "Explorer request failed", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::explorer_unavailable(format!(
                "Explorer HTTP error: {}",
                status
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::with_source(
                ErrorCode::ExplorerUnavailable,
                "Failed to read explorer response",
                e,
            )
        })?;

        parse_envelope(&body)
    }
}

#[async_trait]
impl ContractSource for ExplorerClient {
    async fn fetch_abi(&self, address: &str) -> Option<Value> {
        ExplorerClient::fetch_abi(self, address).await
    }

    async fn fetch_source_code(&self, address: &str) -> Option<String> {
        ExplorerClient::fetch_source_code(self, address).await
    }
}

/// Decode the raw response body into an envelope
pub fn parse_envelope(body: &str) -> AppResult<ExplorerEnvelope> {
    serde_json::from_str(body).map_err(|e| {
        AppError::with_source(
            ErrorCode::ExplorerUnavailable,
            "Malformed explorer envelope",
            e,
        )
    })
}

/// `getabi`: result is a JSON-encoded ABI string
pub fn parse_abi(envelope: ExplorerEnvelope) -> AppResult<Value> {
    if !envelope.is_ok() {
        return Err(AppError::explorer_unavailable(envelope.error_reason()));
    }

    match envelope.result {
        Value::String(encoded) => serde_json::from_str(&encoded).map_err(|e| {
            AppError::with_source(ErrorCode::ExplorerUnavailable, "ABI is not valid JSON", e)
        }),
        // Some explorer forks return the ABI already decoded
        value @ Value::Array(_) => Ok(value),
        other => Err(AppError::explorer_unavailable(format!(
            "Unexpected ABI result type: {}",
            json_type(&other)
        ))),
    }
}

/// `getsourcecode`: result is an array whose first element carries `SourceCode`
pub fn parse_source_code(envelope: ExplorerEnvelope) -> AppResult<SourceCodeEntry> {
    if !envelope.is_ok() {
        return Err(AppError::explorer_unavailable(envelope.error_reason()));
    }

    let first = envelope
        .result
        .as_array()
        .and_then(|entries| entries.first())
        .cloned()
        .ok_or_else(|| AppError::explorer_unavailable("Empty source code result"))?;

    let entry: SourceCodeEntry = serde_json::from_value(first).map_err(|e| {
        AppError::with_source(
            ErrorCode::ExplorerUnavailable,
            "Malformed source code entry",
            e,
        )
    })?;

    if entry.source_code.trim().is_empty() {
        return Err(AppError::explorer_unavailable(
            "Contract source code not verified",
        ));
    }

    Ok(entry)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
