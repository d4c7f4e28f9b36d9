//! Contract Analysis Orchestrator
//!
//! Entry point: `ContractAnalyzer::analyze(ContractInput) -> AnalysisResult`.
//!
//! State machine: Start → Resolving → Normalizing → Building → Generating → Done | Failed
//!
//! Routing:
//! - Address: validate (no network on reject) → fetch ABI + source concurrently
//!   → source usable? FullSource : ABI? AbiOnly : NoDataFound
//! - RawSource / UploadedFile: skip the explorer, normalize, FullSource
//!
//! Explorer failures degrade to absent fields. Only address rejection,
//! missing data and generator failure end a request.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::core::generator::ExplanationGenerator;
use crate::core::normalizer::{parse_source, SourceShape};
use crate::core::prompt::AnalysisRequestBuilder;
use crate::models::config::AppConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{
    AnalysisPrompt, AnalysisResult, AnalysisState, ContractInput, ExplorerArtifact,
    NormalizedSource,
};
use crate::providers::{ContractSource, ExplorerClient, OpenAiClient, TextGenerator};
use crate::utils::address::{checksum_address, is_valid_address};

/// Stateless across requests; safe to share behind `Arc` and call concurrently.
#[derive(Clone)]
pub struct ContractAnalyzer {
    source: Arc<dyn ContractSource>,
    generator: ExplanationGenerator,
}

impl ContractAnalyzer {
    pub fn new(source: Arc<dyn ContractSource>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            source,
            generator: ExplanationGenerator::new(generator),
        }
    }

    /// Wire the HTTP explorer and generation clients from configuration
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let explorer = ExplorerClient::new(&config.explorer)?;
        let backend = OpenAiClient::new(&config.generation)?;
        info!(
            "🔧 Analyzer ready (explorer: {}, model: {})",
            config.explorer.api_url,
            backend.model()
        );
        Ok(Self::new(Arc::new(explorer), Arc::new(backend)))
    }

    /// Analyze one contract. Never panics; every failure is a `Failed` result.
    pub async fn analyze(&self, input: ContractInput) -> AnalysisResult {
        let request_id = Uuid::new_v4();
        let span = info_span!("analyze", %request_id, kind = input.kind());

        async move {
            let start = Instant::now();
            let mut run = Run::default();
            let result = match self.dispatch(input, &mut run).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        "❌ Analysis failed in {} [{}]: {}",
                        run.state.as_str(),
                        e.code_str(),
                        e.message
                    );
                    AnalysisResult::failed(e, run.state)
                }
            };
            info!(
                "🏁 {} in {}ms",
                result.state().as_str(),
                start.elapsed().as_millis()
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, input: ContractInput, run: &mut Run) -> AppResult<AnalysisResult> {
        match input {
            ContractInput::Address(address) => self.analyze_address(address.trim(), run).await,
            ContractInput::RawSource(text) => self.analyze_text(&text, run).await,
            ContractInput::UploadedFile { bytes, filename } => {
                let text = decode_upload(&bytes, &filename);
                self.analyze_text(&text, run).await
            }
        }
    }

    async fn analyze_address(&self, address: &str, run: &mut Run) -> AppResult<AnalysisResult> {
        validate_input_address(address)?;
        let checksummed = checksum_address(address).unwrap_or_else(|| address.to_string());
        info!("🔍 Analyzing contract at address: {}", checksummed);

        run.advance(AnalysisState::Resolving);
        let artifact = self.resolve(address).await;
        if artifact.is_empty() {
            return Err(AppError::no_data_found(format!(
                "Could not fetch contract source code or ABI for {}. Check the address, that the contract is verified, and your API keys.",
                checksummed
            )));
        }

        run.advance(AnalysisState::Normalizing);
        let flattened = artifact
            .source_raw
            .as_deref()
            .map(|raw| normalize_logged(raw).flatten());
        if flattened.as_deref().is_some_and(|s| s.trim().is_empty()) {
            info!("📭 Source resolved but empty after normalization; falling back to ABI");
        }

        run.advance(AnalysisState::Building);
        let prompt = AnalysisRequestBuilder::new()
            .with_source(flattened.as_deref())
            .with_abi(artifact.abi.as_ref())
            .with_address(Some(checksummed.as_str()))
            .build()?;

        self.generate(prompt, run).await
    }

    async fn analyze_text(&self, text: &str, run: &mut Run) -> AppResult<AnalysisResult> {
        run.advance(AnalysisState::Normalizing);
        let flattened = normalize_logged(text).flatten();

        run.advance(AnalysisState::Building);
        let prompt = AnalysisRequestBuilder::new()
            .with_source(Some(flattened.as_str()))
            .build()?;

        self.generate(prompt, run).await
    }

    async fn generate(
        &self,
        prompt: AnalysisPrompt,
        run: &mut Run,
    ) -> AppResult<AnalysisResult> {
        run.advance(AnalysisState::Generating);
        let generated = self.generator.generate(&prompt).await?;

        run.advance(AnalysisState::Done);
        Ok(AnalysisResult::Done {
            explanation: generated.text,
            template: prompt.template,
            fingerprint: generated.fingerprint,
        })
    }

    /// Fetch ABI and source concurrently. Each side fails independently.
    async fn resolve(&self, address: &str) -> ExplorerArtifact {
        let (abi, source_raw) = tokio::join!(
            self.source.fetch_abi(address),
            self.source.fetch_source_code(address)
        );

        info!(
            "📦 Resolved artifact: abi={} source={}",
            if abi.is_some() { "yes" } else { "no" },
            if source_raw.is_some() { "yes" } else { "no" }
        );

        ExplorerArtifact { abi, source_raw }
    }
}

/// Reject a malformed address before any client is built or request sent.
/// Source inputs always pass.
pub fn validate_input(input: &ContractInput) -> AppResult<()> {
    match input {
        ContractInput::Address(address) => validate_input_address(address.trim()),
        ContractInput::RawSource(_) | ContractInput::UploadedFile { .. } => Ok(()),
    }
}

fn validate_input_address(address: &str) -> AppResult<()> {
    if is_valid_address(address) {
        Ok(())
    } else {
        Err(AppError::invalid_address(address))
    }
}

/// Tracks the state reached, so failures can report where they happened
#[derive(Debug)]
struct Run {
    state: AnalysisState,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            state: AnalysisState::Start,
        }
    }
}

impl Run {
    fn advance(&mut self, next: AnalysisState) {
        debug!("state {} → {}", self.state.as_str(), next.as_str());
        self.state = next;
    }
}

fn normalize_logged(raw: &str) -> NormalizedSource {
    match parse_source(raw) {
        SourceShape::StandardJson(source) => {
            info!("🗂️ Standard JSON input with {} file(s)", source.file_count());
            source
        }
        SourceShape::Malformed => {
            warn!(
                "⚠️ [{}] Source looks like JSON but does not parse; analyzing as plain text",
                ErrorCode::MalformedSource.as_str()
            );
            NormalizedSource::flat(raw)
        }
        shape => {
            debug!("Source shape: {}", shape.as_str());
            NormalizedSource::flat(raw)
        }
    }
}

fn decode_upload(bytes: &[u8], filename: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(
                "⚠️ [{}] {} is not valid UTF-8 ({}); replacing invalid bytes",
                ErrorCode::MalformedSource.as_str(),
                filename,
                e
            );
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_upload_lossy() {
        assert_eq!(decode_upload(b"contract A {}", "A.sol"), "contract A {}");
        let decoded = decode_upload(&[b'c', 0xff, b'd'], "bad.sol");
        assert!(decoded.starts_with('c'));
        assert!(decoded.ends_with('d'));
    }

    #[test]
    fn test_normalize_logged_shapes() {
        assert_eq!(normalize_logged("contract A {}").flatten(), "contract A {}");
        assert_eq!(normalize_logged("{ broken").flatten(), "{ broken");
        let standard = r#"{"sources":{"A.sol":{"content":"contract A {}"}}}"#;
        assert_eq!(
            normalize_logged(standard).flatten(),
            "// File: A.sol\ncontract A {}"
        );
    }

    #[test]
    fn test_validate_input() {
        let ok = ContractInput::Address(" 0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2 ".to_string());
        assert!(validate_input(&ok).is_ok());

        let bad = ContractInput::Address("0x123".to_string());
        assert_eq!(validate_input(&bad).unwrap_err().code, ErrorCode::InvalidAddress);

        assert!(validate_input(&ContractInput::RawSource(String::new())).is_ok());
    }

    #[test]
    fn test_run_tracks_state() {
        let mut run = Run::default();
        assert_eq!(run.state, AnalysisState::Start);
        run.advance(AnalysisState::Resolving);
        assert_eq!(run.state, AnalysisState::Resolving);
    }
}
