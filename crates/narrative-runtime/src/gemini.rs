//! Gemini Generation Provider
//!
//! Implementation of `GenerationProvider` for Google's Generative Language
//! API (`models/{model}:generateContent`) with Google Search grounding.

use std::time::Duration;

use async_trait::async_trait;
use narrative_core::{
    analyzer::DEFAULT_MODEL,
    error::{AnalysisError, Result},
    provider::{
        Candidate, GenerationProvider, GenerationRequest, GenerationResponse, GroundingMetadata,
        ProviderInfo, Tool,
    },
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`
    pub api_key: String,

    /// Default model identifier
    pub model: String,

    /// API root, without the version segment
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 120,
        }
    }

    /// Read `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_MODEL`,
    /// `GEMINI_BASE_URL` and `GEMINI_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::Config("GEMINI_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        config.timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(config.timeout_secs);

        Ok(config)
    }
}

/// Gemini generation provider
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from configuration
    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AnalysisError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn model_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Convert a generation request to the wire format
    fn build_body(request: &GenerationRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent::text(Some("user"), &request.prompt)],
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(|s| GeminiContent::text(None, s)),
            tools: request
                .tools
                .iter()
                .map(|tool| match tool {
                    Tool::GoogleSearch => GeminiTool {
                        google_search: GoogleSearch {},
                    },
                })
                .collect(),
        }
    }

    /// Convert a wire response to the provider-neutral shape
    fn convert_response(response: GeminiResponse) -> GenerationResponse {
        let text = response.candidates.first().and_then(|c| {
            let parts: Vec<&str> = c
                .content
                .as_ref()?
                .parts
                .iter()
                .filter(|p| !p.thought.unwrap_or(false))
                .filter_map(|p| p.text.as_deref())
                .collect();
            (!parts.is_empty()).then(|| parts.concat())
        });

        if text.is_none() {
            if let Some(feedback) = &response.prompt_feedback {
                tracing::warn!(block_reason = ?feedback.block_reason, "Gemini returned no text");
            }
        }

        GenerationResponse {
            text,
            candidates: response
                .candidates
                .into_iter()
                .map(|c| Candidate {
                    grounding_metadata: c.grounding_metadata,
                })
                .collect(),
        }
    }

    /// Map a non-success HTTP status and its body to an error
    fn map_status(status: StatusCode, body: &str) -> AnalysisError {
        let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AnalysisError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => AnalysisError::RateLimited(message),
            s if s.is_server_error() => AnalysisError::ProviderUnavailable(format!("{s}: {message}")),
            _ if message.is_empty() => AnalysisError::Unknown,
            _ => AnalysisError::Provider(message),
        }
    }

    fn map_transport(&self, err: reqwest::Error) -> AnalysisError {
        if err.is_timeout() {
            AnalysisError::Timeout(Duration::from_secs(self.config.timeout_secs))
        } else if err.is_connect() {
            AnalysisError::ProviderUnavailable(err.to_string())
        } else if err.is_decode() {
            AnalysisError::MalformedResponse(err.to_string())
        } else {
            AnalysisError::Provider(err.to_string())
        }
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Gemini".into(),
            model: self.config.model.clone(),
            supports_search: true,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.model_url(&self.config.model))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => Ok(true),
            Ok(r) => {
                tracing::warn!(status = %r.status(), "Gemini health check failed");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let url = format!("{}:generateContent", self.model_url(&request.model));
        let body = Self::build_body(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            tracing::error!(%status, model = %request.model, "Gemini request failed");
            return Err(Self::map_status(status, &text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        Ok(Self::convert_response(parsed))
    }
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
                thought: None,
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use narrative_core::provider::GroundingChunk;
    use narrative_core::GroundingSource;

    use super::*;

    const GROUNDED_RESPONSE: &str = r###"{
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "## 🧬 核心叙事 (Core Narrative)\n"},
                    {"text": "青蛙文化"}
                ]
            },
            "finishReason": "STOP",
            "groundingMetadata": {
                "webSearchQueries": ["0xDEADBEEF"],
                "groundingChunks": [
                    {"web": {"uri": "https://x.com/a", "title": "A"}},
                    {"web": {"uri": "https://x.com/a", "title": "A2"}},
                    {"web": {"uri": "https://dexscreener.com/x"}}
                ]
            }
        }],
        "usageMetadata": {"promptTokenCount": 512}
    }"###;

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::new("key");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_request_body() {
        let request = GenerationRequest::new("gemini-2.5-flash", "analyze PEPE")
            .with_system_instruction("be sharp")
            .with_tool(Tool::GoogleSearch);

        let body = serde_json::to_value(GeminiProvider::build_body(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "analyze PEPE"}]}],
                "systemInstruction": {"parts": [{"text": "be sharp"}]},
                "tools": [{"googleSearch": {}}]
            })
        );
    }

    #[test]
    fn test_request_body_without_tools() {
        let body =
            serde_json::to_value(GeminiProvider::build_body(&GenerationRequest::new("m", "p")))
                .unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_convert_grounded_response() {
        let parsed: GeminiResponse = serde_json::from_str(GROUNDED_RESPONSE).unwrap();
        let response = GeminiProvider::convert_response(parsed);

        assert_eq!(response.text(), Some("## 🧬 核心叙事 (Core Narrative)\n青蛙文化"));
        let chunks = response.first_grounding_chunks();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], GroundingChunk::web("https://x.com/a", "A"));
        assert_eq!(
            chunks[0].web_source(),
            Some(GroundingSource::new("https://x.com/a", "A"))
        );
        assert!(chunks[2].web_source().is_none());
    }

    #[test]
    fn test_convert_blocked_response() {
        let parsed: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let response = GeminiProvider::convert_response(parsed);
        assert_eq!(response.text(), None);
        assert!(response.candidates.is_empty());
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            GeminiProvider::map_status(StatusCode::BAD_REQUEST, body),
            AnalysisError::Provider(m) if m == "API key not valid."
        ));
        assert!(matches!(
            GeminiProvider::map_status(StatusCode::FORBIDDEN, body),
            AnalysisError::Auth(_)
        ));
        assert!(matches!(
            GeminiProvider::map_status(StatusCode::TOO_MANY_REQUESTS, ""),
            AnalysisError::RateLimited(_)
        ));
        assert!(matches!(
            GeminiProvider::map_status(StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
            AnalysisError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            GeminiProvider::map_status(StatusCode::NOT_FOUND, ""),
            AnalysisError::Unknown
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let mut config = GeminiConfig::new("key");
        config.base_url = "http://127.0.0.1:9".into();
        let provider = GeminiProvider::from_config(config).unwrap();

        assert!(!provider.health_check().await.unwrap());
        let err = provider
            .generate(&GenerationRequest::new("gemini-2.5-flash", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ProviderUnavailable(_)));
    }
}
