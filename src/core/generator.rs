//! Explanation Generator
//!
//! Fingerprints the prompt for audit logs, dispatches one completion and
//! normalizes every failure to `GenerationFailed`. An empty response is a
//! failure, never an empty explanation.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::prompt::SYSTEM_PROMPT;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::AnalysisPrompt;
use crate::providers::{ChatMessage, TextGenerator};
use crate::utils::fingerprint::{fingerprint, short_fingerprint};

/// Generated text plus the fingerprint of the prompt it answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedExplanation {
    pub text: String,
    pub fingerprint: String,
}

/// Wraps a generation backend
#[derive(Clone)]
pub struct ExplanationGenerator {
    backend: Arc<dyn TextGenerator>,
}

impl ExplanationGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    pub async fn generate(&self, prompt: &AnalysisPrompt) -> AppResult<GeneratedExplanation> {
        let fingerprint = fingerprint(&prompt.body);
        info!(
            "🧾 Generating explanation for input hash: {}... (template: {})",
            short_fingerprint(&fingerprint),
            prompt.template.as_str()
        );

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt.body.clone()),
        ];

        let start = Instant::now();
        let raw = self.backend.complete(&messages).await.map_err(|e| {
            warn!(
                "❌ Generation failed for {}: {}",
                short_fingerprint(&fingerprint),
                e
            );
            match e.code {
                ErrorCode::GenerationFailed => e,
                _ => AppError::generation_failed(e.message),
            }
        })?;

        let text = raw.trim();
        if text.is_empty() {
            warn!(
                "❌ Generation returned empty text for {}",
                short_fingerprint(&fingerprint)
            );
            return Err(AppError::generation_failed(
                "generation backend returned an empty response",
            ));
        }

        info!(
            "✅ Explanation ready for {} ({} chars, {}ms)",
            short_fingerprint(&fingerprint),
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(GeneratedExplanation {
            text: text.to_string(),
            fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::PromptTemplate;
    use crate::providers::ChatRole;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedBackend {
        reply: Result<String, (ErrorCode, String)>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedBackend {
        fn new(reply: Result<&str, (ErrorCode, &str)>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(String::from).map_err(|(c, m)| (c, m.to_string())),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedBackend {
        async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err((code, msg)) => Err(AppError::new(*code, msg.clone())),
            }
        }
    }

    fn prompt() -> AnalysisPrompt {
        AnalysisPrompt {
            template: PromptTemplate::FullSource,
            body: "Analyze contract A {}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_success() {
        let backend = ScriptedBackend::new(Ok("  ## Purpose\nHolds funds.\n"));
        let generator = ExplanationGenerator::new(backend.clone());

        let out = generator.generate(&prompt()).await.unwrap();
        assert_eq!(out.text, "## Purpose\nHolds funds.");
        assert_eq!(out.fingerprint, fingerprint("Analyze contract A {}"));

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].role, ChatRole::System);
        assert_eq!(seen[0][0].content, SYSTEM_PROMPT);
        assert_eq!(seen[0][1].role, ChatRole::User);
        assert_eq!(seen[0][1].content, "Analyze contract A {}");
    }

    #[tokio::test]
    async fn test_empty_response_is_failure() {
        let generator = ExplanationGenerator::new(ScriptedBackend::new(Ok("   \n")));
        let err = generator.generate(&prompt()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::GenerationFailed);
    }

    #[tokio::test]
    async fn test_backend_errors_become_generation_failed() {
        let generator = ExplanationGenerator::new(ScriptedBackend::new(Err((
            ErrorCode::ExternalTimeout,
            "Request timeout",
        ))));
        let err = generator.generate(&prompt()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::GenerationFailed);
        assert_eq!(err.message, "Request timeout");
    }
}
