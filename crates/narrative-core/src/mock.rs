//! Mock Generation Provider
//!
//! For testing and demo purposes. Replays scripted replies instead of
//! calling a hosted model.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AnalysisError, Result};
use crate::provider::{
    Candidate, GenerationProvider, GenerationRequest, GenerationResponse, GroundingChunk,
    GroundingMetadata, ProviderInfo,
};

/// One scripted reply
#[derive(Clone, Debug)]
pub enum MockReply {
    Respond(GenerationResponse),
    Fail(String),
}

/// Mock provider with scripted replies
///
/// Replies are consumed in order; once the script runs out the fallback
/// reply is repeated.
pub struct MockProvider {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockProvider {
    pub fn new(fallback: MockReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Always answer with `response`
    pub fn responding(response: GenerationResponse) -> Self {
        Self::new(MockReply::Respond(response))
    }

    /// Always fail with a provider error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockReply::Fail(message.into()))
    }

    /// Canned report used when the server runs without a real backend
    pub fn demo() -> Self {
        Self::responding(GenerationResponse {
            text: Some(DEMO_REPORT.into()),
            candidates: vec![Candidate {
                grounding_metadata: Some(GroundingMetadata {
                    grounding_chunks: vec![
                        GroundingChunk::web("https://dexscreener.com", "DexScreener"),
                        GroundingChunk::web("https://x.com", "X"),
                    ],
                }),
            }],
        })
    }

    /// Queue a reply ahead of the fallback
    pub fn then(self, reply: MockReply) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Wait this long before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_reply(&self) -> MockReply {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Mock".into(),
            model: "mock".into(),
            supports_search: true,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply() {
            MockReply::Respond(response) => Ok(response),
            MockReply::Fail(message) => Err(AnalysisError::Provider(message)),
        }
    }
}

const DEMO_REPORT: &str = "## 🧬 核心叙事 (Core Narrative)\n演示模式：未配置 Gemini API Key。\n\n\
## 🎭 文化起源 (Cultural Origin)\n-\n\n\
## 🚀 社区氛围 & 传播力 (Community & Virality)\n-\n\n\
## ⚖️ 风险与潜力 (Risk & Potential)\n-\n\n\
## 💎 叙事评分 (Narrative Score: 1-10)\n-\n";
