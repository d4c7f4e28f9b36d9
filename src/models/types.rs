//! Type definitions for the contract analysis pipeline
//! All request-scoped data structures; nothing here outlives one `analyze` call.

use serde::Serialize;
use std::path::Path;

use crate::models::errors::{AppError, ErrorCode};
use crate::utils::constants::{FILE_BLOCK_SEPARATOR, FILE_MARKER_PREFIX};

/// What the caller wants analyzed. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractInput {
    /// On-chain contract address (resolved through the explorer)
    Address(String),
    /// Source text pasted by the user (flat Solidity or a Standard JSON blob)
    RawSource(String),
    /// Uploaded file contents
    UploadedFile { bytes: Vec<u8>, filename: String },
}

impl ContractInput {
    /// Read a file from disk into an `UploadedFile` input
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::UploadedFile { bytes, filename })
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ContractInput::Address(_) => "address",
            ContractInput::RawSource(_) => "raw_source",
            ContractInput::UploadedFile { .. } => "uploaded_file",
        }
    }
}

/// Raw data resolved from the block explorer. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplorerArtifact {
    /// Decoded ABI JSON (usually an array of fragments)
    pub abi: Option<serde_json::Value>,
    /// `SourceCode` field exactly as the explorer returned it
    pub source_raw: Option<String>,
}

impl ExplorerArtifact {
    /// Both lookups came back empty
    pub fn is_empty(&self) -> bool {
        self.abi.is_none() && self.source_raw.is_none()
    }
}

/// A single file of a normalized source bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as keyed in the Standard JSON `sources` map; `None` for flat input
    pub path: Option<String>,
    pub content: String,
}

/// Ordered sequence of source files.
///
/// `flatten` is deterministic: the same files in the same order always
/// produce byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSource {
    pub files: Vec<SourceFile>,
}

impl NormalizedSource {
    /// Single unnamed file, emitted without a header marker
    pub fn flat(content: impl Into<String>) -> Self {
        Self {
            files: vec![SourceFile {
                path: None,
                content: content.into(),
            }],
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// True when there is no non-whitespace content to analyze
    pub fn is_blank(&self) -> bool {
        self.files.iter().all(|f| f.content.trim().is_empty())
    }

    /// Join files into one blob with `// File: <path>` headers
    pub fn flatten(&self) -> String {
        self.files
            .iter()
            .map(|file| match &file.path {
                Some(path) => format!("{}{}\n{}", FILE_MARKER_PREFIX, path, file.content),
                None => file.content.clone(),
            })
            .collect::<Vec<_>>()
            .join(FILE_BLOCK_SEPARATOR)
    }
}

/// Which prompt template a request was routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PromptTemplate {
    /// Verified source available
    FullSource,
    /// Interface only
    AbiOnly,
}

impl PromptTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptTemplate::FullSource => "FULL_SOURCE",
            PromptTemplate::AbiOnly => "ABI_ONLY",
        }
    }
}

/// Prompt ready for the generation backend. `body` always ends with the guardrail section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    pub template: PromptTemplate,
    pub body: String,
}

/// Orchestrator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisState {
    Start,
    Resolving,
    Normalizing,
    Building,
    Generating,
    Done,
    Failed,
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Start => "START",
            AnalysisState::Resolving => "RESOLVING",
            AnalysisState::Normalizing => "NORMALIZING",
            AnalysisState::Building => "BUILDING",
            AnalysisState::Generating => "GENERATING",
            AnalysisState::Done => "DONE",
            AnalysisState::Failed => "FAILED",
        }
    }
}

/// Final outcome handed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Done {
        explanation: String,
        template: PromptTemplate,
        fingerprint: String,
    },
    Failed {
        error: ErrorCode,
        message: String,
        /// State the pipeline was in when it failed
        failed_at: AnalysisState,
    },
}

impl AnalysisResult {
    pub fn failed(err: AppError, failed_at: AnalysisState) -> Self {
        AnalysisResult::Failed {
            error: err.code,
            message: err.message,
            failed_at,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, AnalysisResult::Done { .. })
    }

    pub fn state(&self) -> AnalysisState {
        match self {
            AnalysisResult::Done { .. } => AnalysisState::Done,
            AnalysisResult::Failed { .. } => AnalysisState::Failed,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            AnalysisResult::Done { .. } => None,
            AnalysisResult::Failed { error, .. } => Some(*error),
        }
    }

    /// Text to show the user: the explanation, or an actionable failure line
    pub fn render(&self) -> String {
        match self {
            AnalysisResult::Done { explanation, .. } => explanation.clone(),
            AnalysisResult::Failed { error, message, .. } => {
                format!("❌ [{}] {}", error.as_str(), message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_with_headers() {
        let source = NormalizedSource {
            files: vec![
                SourceFile {
                    path: Some("contracts/A.sol".to_string()),
                    content: "contract A {}".to_string(),
                },
                SourceFile {
                    path: Some("contracts/B.sol".to_string()),
                    content: "contract B {}".to_string(),
                },
            ],
        };

        assert_eq!(
            source.flatten(),
            "// File: contracts/A.sol\ncontract A {}\n\n// File: contracts/B.sol\ncontract B {}"
        );
        assert_eq!(source.flatten(), source.flatten());
    }

    #[test]
    fn test_flat_source_has_no_marker() {
        let source = NormalizedSource::flat("pragma solidity ^0.8.0;");
        assert_eq!(source.flatten(), "pragma solidity ^0.8.0;");
        assert!(!source.is_blank());
    }

    #[test]
    fn test_empty_bundle_is_blank() {
        let source = NormalizedSource::default();
        assert!(source.is_blank());
        assert_eq!(source.flatten(), "");
    }

    #[test]
    fn test_from_path_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Token.sol");
        std::fs::write(&path, "contract Token {}").unwrap();

        let input = ContractInput::from_path(&path).unwrap();
        assert_eq!(
            input,
            ContractInput::UploadedFile {
                bytes: b"contract Token {}".to_vec(),
                filename: "Token.sol".to_string(),
            }
        );
        assert_eq!(input.kind(), "uploaded_file");
    }

    #[test]
    fn test_failed_result_renders_code() {
        let result = AnalysisResult::failed(
            AppError::no_data_found("nothing here"),
            AnalysisState::Resolving,
        );
        assert_eq!(result.state(), AnalysisState::Failed);
        assert_eq!(result.error_code(), Some(ErrorCode::NoDataFound));
        assert!(result.render().contains("SOURCE_NO_DATA_FOUND"));
        assert!(result.render().contains("nothing here"));
    }
}
