//! Analysis Client
//!
//! Turns a (name, contract address) pair into one grounded generation call
//! and post-processes the reply: placeholder text when the model produced
//! none, citations filtered to complete web chunks and deduplicated by uri.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AnalysisError, Result};
use crate::model::AnalysisResult;
use crate::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::provider::{GenerationProvider, GenerationRequest, GenerationResponse, Tool};
use crate::sources::dedupe;

/// Markdown used when the service returns no text.
pub const EMPTY_GENERATION_PLACEHOLDER: &str = "Analysis failed to generate text.";

/// Default hosted model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Analyzer configuration
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Model identifier passed to the provider
    pub model: String,

    /// Upper bound on one generation call
    pub timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Sends analysis prompts through a [`GenerationProvider`]
pub struct NarrativeAnalyzer {
    provider: Arc<dyn GenerationProvider>,
    config: AnalyzerConfig,
}

impl NarrativeAnalyzer {
    pub fn new(provider: Arc<dyn GenerationProvider>, config: AnalyzerConfig) -> Self {
        Self { provider, config }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn GenerationProvider>) -> Self {
        Self::new(provider, AnalyzerConfig::default())
    }

    /// Build the generation request for one asset
    pub fn build_request(&self, name: &str, contract_address: &str) -> GenerationRequest {
        GenerationRequest::new(&self.config.model, build_prompt(name, contract_address))
            .with_system_instruction(SYSTEM_INSTRUCTION)
            .with_tool(Tool::GoogleSearch)
    }

    /// Analyze one asset.
    ///
    /// Callers are expected to have checked that both inputs are non-empty.
    pub async fn analyze(&self, name: &str, contract_address: &str) -> Result<AnalysisResult> {
        let request = self.build_request(name, contract_address);
        tracing::debug!(%name, %contract_address, model = %request.model, "Requesting analysis");

        let response =
            match tokio::time::timeout(self.config.timeout, self.provider.generate(&request)).await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    tracing::error!(%name, %contract_address, error = %e, "Generation failed");
                    return Err(e);
                }
                Err(_) => {
                    let e = AnalysisError::Timeout(self.config.timeout);
                    tracing::error!(%name, %contract_address, error = %e, "Generation failed");
                    return Err(e);
                }
            };

        let result = Self::into_result(&response);
        tracing::info!(
            %name,
            %contract_address,
            sources = result.sources.len(),
            "Analysis complete"
        );
        Ok(result)
    }

    /// Convert a provider response into the report shown to the user
    pub fn into_result(response: &GenerationResponse) -> AnalysisResult {
        let markdown = match response.text() {
            Some(text) => text.to_string(),
            None => {
                tracing::warn!("Generation returned no text, using placeholder");
                EMPTY_GENERATION_PLACEHOLDER.to_string()
            }
        };

        let candidates = response
            .first_grounding_chunks()
            .iter()
            .filter_map(|chunk| chunk.web_source())
            .collect();

        AnalysisResult {
            markdown,
            sources: dedupe(candidates),
        }
    }

    /// Get the provider
    pub fn provider(&self) -> &Arc<dyn GenerationProvider> {
        &self.provider
    }

    /// Get configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

/// Builder for analyzer configuration
#[derive(Default)]
pub struct AnalyzerBuilder {
    provider: Option<Arc<dyn GenerationProvider>>,
    config: AnalyzerConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<NarrativeAnalyzer> {
        let provider = self
            .provider
            .ok_or_else(|| AnalysisError::Config("Provider is required".into()))?;

        if self.config.model.trim().is_empty() {
            return Err(AnalysisError::Config("Model identifier is empty".into()));
        }

        Ok(NarrativeAnalyzer::new(provider, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use crate::model::GroundingSource;
    use crate::provider::{Candidate, GroundingChunk, GroundingMetadata, WebChunk};

    fn response(text: Option<&str>, chunks: Vec<GroundingChunk>) -> GenerationResponse {
        GenerationResponse {
            text: text.map(str::to_string),
            candidates: vec![Candidate {
                grounding_metadata: Some(GroundingMetadata { grounding_chunks: chunks }),
            }],
        }
    }

    fn analyzer(provider: MockProvider) -> (Arc<MockProvider>, NarrativeAnalyzer) {
        let provider = Arc::new(provider);
        let analyzer = NarrativeAnalyzer::with_defaults(provider.clone());
        (provider, analyzer)
    }

    #[tokio::test]
    async fn test_end_to_end_dedupes_sources() {
        let (provider, analyzer) = analyzer(MockProvider::responding(response(
            Some("## 🧬 核心叙事\n..."),
            vec![
                GroundingChunk::web("https://x.com/a", "A"),
                GroundingChunk::web("https://x.com/a", "A2"),
            ],
        )));

        let result = analyzer.analyze("PEPE", "0xDEADBEEF").await.unwrap();
        assert_eq!(result.markdown, "## 🧬 核心叙事\n...");
        assert_eq!(result.sources, vec![GroundingSource::new("https://x.com/a", "A2")]);

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, DEFAULT_MODEL);
        assert_eq!(request.tools, vec![Tool::GoogleSearch]);
        assert_eq!(request.system_instruction.as_deref(), Some(SYSTEM_INSTRUCTION));
        assert!(request.prompt.contains("0xDEADBEEF"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_text_uses_placeholder() {
        for text in [None, Some("")] {
            let (_, analyzer) = analyzer(MockProvider::responding(response(text, Vec::new())));
            let result = analyzer.analyze("PEPE", "0xabc").await.unwrap();
            assert_eq!(result.markdown, EMPTY_GENERATION_PLACEHOLDER);
            assert!(result.sources.is_empty());
        }
    }

    #[test]
    fn test_incomplete_chunks_are_dropped() {
        let no_title = GroundingChunk {
            web: Some(WebChunk { uri: Some("https://x.com/b".into()), title: None }),
        };
        let no_web = GroundingChunk { web: None };
        let result = NarrativeAnalyzer::into_result(&response(
            Some("M"),
            vec![no_title, no_web, GroundingChunk::web("https://x.com/c", "C")],
        ));
        assert_eq!(result.sources, vec![GroundingSource::new("https://x.com/c", "C")]);
    }

    #[test]
    fn test_no_candidates_means_no_sources() {
        let result = NarrativeAnalyzer::into_result(&GenerationResponse {
            text: Some("M".into()),
            candidates: Vec::new(),
        });
        assert_eq!(result, AnalysisResult { markdown: "M".into(), sources: Vec::new() });
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let (provider, analyzer) = analyzer(MockProvider::failing("quota exceeded"));
        let err = analyzer.analyze("PEPE", "0xabc").await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout() {
        let provider = Arc::new(
            MockProvider::responding(response(Some("late"), Vec::new()))
                .with_delay(Duration::from_millis(200)),
        );
        let analyzer = AnalyzerBuilder::new()
            .provider(provider)
            .timeout(Duration::from_millis(10))
            .build()
            .unwrap();

        let err = analyzer.analyze("PEPE", "0xabc").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout(_)));
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(matches!(AnalyzerBuilder::new().build(), Err(AnalysisError::Config(_))));
    }
}
