//! Generation Provider Strategy
//!
//! Defines the interface to a hosted text-generation service with search
//! grounding. The analyzer works exclusively through [`GenerationProvider`],
//! so the Gemini backend can be swapped for a scripted fake in tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use narrative_core::provider::{GenerationProvider, GenerationRequest};
//!
//! let provider = GeminiProvider::from_env()?;
//! let response = provider.generate(&request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::GroundingSource;

/// Capabilities the service may use while generating
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Live web search with citation metadata
    GoogleSearch,
}

/// One generation call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,

    /// System instruction, sent separately from the user turn
    #[serde(default)]
    pub system_instruction: Option<String>,

    /// User prompt
    pub prompt: String,

    /// Enabled tools
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            prompt: prompt.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
        self
    }
}

/// Generated text plus per-candidate metadata.
///
/// Every field the service may omit is an `Option` or defaults to empty,
/// so consumers never probe raw JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    /// Generated text, absent when the service produced none
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerationResponse {
    /// Generated text if present and non-empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Grounding chunks of the first candidate (empty when absent)
    pub fn first_grounding_chunks(&self) -> &[GroundingChunk] {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GroundingChunk {
    pub fn web(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            web: Some(WebChunk {
                uri: Some(uri.into()),
                title: Some(title.into()),
            }),
        }
    }

    /// Citation for this chunk, only when both uri and title are non-empty
    pub fn web_source(&self) -> Option<GroundingSource> {
        let web = self.web.as_ref()?;
        let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
        let title = web.title.as_deref().filter(|t| !t.is_empty())?;
        Some(GroundingSource::new(uri, title))
    }
}

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "Gemini")
    pub name: String,

    /// Default model
    pub model: String,

    /// Whether search grounding is supported
    pub supports_search: bool,
}

/// Strategy trait for generation backends
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Get provider information and capabilities
    fn info(&self) -> ProviderInfo;

    /// Check if the provider is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Run one non-streaming generation
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_with_missing_fields() {
        let resp: GenerationResponse = serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert_eq!(resp.text(), None);
        assert!(resp.first_grounding_chunks().is_empty());

        let resp: GenerationResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.first_grounding_chunks().is_empty());
    }

    #[test]
    fn test_only_first_candidate_is_read() {
        let resp: GenerationResponse = serde_json::from_str(
            r#"{
                "text": "report",
                "candidates": [
                    {"groundingMetadata": {"groundingChunks": [{"web": {"uri": "https://a", "title": "A"}}]}},
                    {"groundingMetadata": {"groundingChunks": [{"web": {"uri": "https://b", "title": "B"}}]}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(resp.text(), Some("report"));
        assert_eq!(resp.first_grounding_chunks(), &[GroundingChunk::web("https://a", "A")]);
    }

    #[test]
    fn test_web_source_requires_uri_and_title() {
        assert!(GroundingChunk::default().web_source().is_none());
        let no_title = GroundingChunk {
            web: Some(WebChunk { uri: Some("https://a".into()), title: None }),
        };
        assert!(no_title.web_source().is_none());
        let empty_uri = GroundingChunk::web("", "A");
        assert!(empty_uri.web_source().is_none());
        assert_eq!(
            GroundingChunk::web("https://a", "A").web_source(),
            Some(GroundingSource::new("https://a", "A"))
        );
    }

    #[test]
    fn test_with_tool_is_idempotent() {
        let req = GenerationRequest::new("m", "p")
            .with_tool(Tool::GoogleSearch)
            .with_tool(Tool::GoogleSearch);
        assert_eq!(req.tools, vec![Tool::GoogleSearch]);
    }
}
